//! Function runtimes and runtime detection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported function runtimes.
///
/// The id strings (`python-flask`, `nodejs`, `go`) double as the scaffold
/// directory names under the configured scaffold root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Runtime {
    PythonFlask,
    Nodejs,
    Go,
}

impl Runtime {
    /// All runtimes in detection priority order.
    pub const ALL: [Runtime; 3] = [Runtime::PythonFlask, Runtime::Nodejs, Runtime::Go];

    /// Stable identifier, also the scaffold directory name.
    pub fn id(&self) -> &'static str {
        match self {
            Runtime::PythonFlask => "python-flask",
            Runtime::Nodejs => "nodejs",
            Runtime::Go => "go",
        }
    }

    /// Marker files whose presence at the top of an upload identifies
    /// this runtime.
    pub fn marker_files(&self) -> &'static [&'static str] {
        match self {
            Runtime::PythonFlask => &["requirements.txt", "app.py", "wsgi.py"],
            Runtime::Nodejs => &["package.json", "index.js", "server.js"],
            Runtime::Go => &["go.mod", "main.go"],
        }
    }

    /// Detects the runtime from a top-level file listing.
    ///
    /// Runtimes are checked in [`Runtime::ALL`] order; the first one with
    /// any marker present wins. Returns `None` when nothing matches, in
    /// which case callers fall back to the configured default runtime.
    pub fn detect<S: AsRef<str>>(files: &[S]) -> Option<Runtime> {
        Runtime::ALL.into_iter().find(|runtime| {
            runtime
                .marker_files()
                .iter()
                .any(|marker| files.iter().any(|f| f.as_ref() == *marker))
        })
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
