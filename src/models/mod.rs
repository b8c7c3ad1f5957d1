//! Data models

pub mod veritas;

pub use veritas::*;
