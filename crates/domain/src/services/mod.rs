//! Domain services for the function builder.
//!
//! Services contain business logic that operates on domain models.

pub mod scaffold;

pub use scaffold::inject_scaffold;
