use std::error::Error;
use std::fmt::Debug;

use crate::core::domain::Locator;

/// Failure as reported by a native engine, in whichever shape the engine
/// chose to report it.
#[derive(Debug)]
pub enum NativeError {
    /// An exception raised out of the engine call.
    Thrown(Box<dyn Error + Send + Sync>),
    /// A result object carrying the failure, usually with a `message` field.
    Structured(serde_json::Value),
    Message(String),
}

impl NativeError {
    pub fn thrown<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        NativeError::Thrown(Box::new(err))
    }

    /// Renders the engine's own message, unwrapped from its native shape.
    pub fn render(&self) -> String {
        match self {
            NativeError::Thrown(err) => err.to_string(),
            NativeError::Structured(value) => match value {
                serde_json::Value::String(msg) => msg.clone(),
                serde_json::Value::Object(fields) => match fields.get("message") {
                    Some(serde_json::Value::String(msg)) => msg.clone(),
                    _ => value.to_string(),
                },
                _ => value.to_string(),
            },
            NativeError::Message(msg) => msg.clone(),
        }
    }
}

impl From<String> for NativeError {
    fn from(msg: String) -> Self {
        NativeError::Message(msg)
    }
}

impl From<&str> for NativeError {
    fn from(msg: &str) -> Self {
        NativeError::Message(msg.to_string())
    }
}

/// Exception value thrown by an engine, e.g. a `SyntaxError` with a position.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct EngineException {
    pub name: String,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl EngineException {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            line: None,
            column: None,
        }
    }

    pub fn at(self, line: u32, column: u32) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Could not load compiler from {locator}\n\n{detail}")]
pub struct LoadError {
    pub locator: Locator,
    /// Structural rendering of the underlying failure.
    pub detail: String,
}

impl LoadError {
    pub fn new<E: Debug + ?Sized>(locator: &Locator, err: &E) -> Self {
        Self {
            locator: locator.clone(),
            detail: format!("{:#?}", err),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Unsupported language: {tag}")]
    UnsupportedLanguage { tag: String },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Compiler loaded from {locator} does not export `{symbol}`")]
    MissingExport { locator: Locator, symbol: String },
    #[error("{msg}")]
    CompilationFailed { msg: String },
}

impl From<NativeError> for CompileError {
    fn from(err: NativeError) -> Self {
        CompileError::CompilationFailed { msg: err.render() }
    }
}
