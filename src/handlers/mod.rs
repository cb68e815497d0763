//! HTTP handlers for lists and URL entries.

pub mod lists;
pub use lists::*;
