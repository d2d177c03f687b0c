pub mod ast;
pub(crate) mod cache;
pub mod context;
pub mod engine;
pub mod error;
pub mod filters;
mod loader;
pub(crate) mod parser;
pub(crate) mod render;
pub(crate) mod serializer;
pub mod value;

pub use engine::TemplateEngine;
pub use error::TemplateError;
pub use serializer::to_value;
pub use value::Value;
