//! Domain models for the function builder.

pub mod function;
pub mod runtime;

pub use function::{FunctionImage, ImageRef};
pub use runtime::Runtime;
