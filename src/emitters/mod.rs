//! The built-in emitter library.

pub mod choice;
pub mod dtrange;
pub mod fixed;
pub mod fromfields;
pub mod text;
pub mod wrappers;
