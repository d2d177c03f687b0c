use thiserror::Error;

/// Represents errors that can occur while compiling or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("unclosed '{0}' block: reached end of template without a matching end tag")]
    UnclosedBlock(&'static str),
    #[error("mismatched end tag: expected '{expected}', found '{found}'")]
    MismatchedEndTag { expected: String, found: String },
    #[error("filter '{0}' not found")]
    UnknownFilter(String),
    #[error("filter '{name}' failed: {message}")]
    Filter { name: String, message: String },
    #[error("context error: {0}")]
    Context(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
