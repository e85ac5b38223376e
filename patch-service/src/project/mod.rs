// Project module
// Project definition model, YAML loading, validation and graph lookups

pub mod error;
pub mod graph;
pub mod loader;
pub mod models;
pub mod validator;

pub use error::{ParseError, ParseErrorKind, ParseResult, ValidationError};
pub use graph::ProjectGraph;
pub use loader::ProjectParser;
pub use models::*;
pub use validator::ProjectValidator;
