//! ListService: slug resolution and validation in front of a `ListStore`.

mod lists;
mod validation;
pub use lists::ListService;
pub use validation::RequestValidator;
