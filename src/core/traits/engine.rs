//! Native APIs of the compiler engines, one trait per calling convention.
//!
//! An activated engine hands back an [`EngineExports`] handle listing the
//! symbols it provides. Adapters look symbols up by name instead of reaching
//! into a shared global namespace.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::errors::NativeError;

/// Engines that return the compiled text directly (Stylus).
pub trait Renderer: Send + Sync {
    fn render(&self, source: &str) -> Result<String, NativeError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackOptions {
    pub indented_syntax: bool,
}

/// Result object handed to a completion callback. A non-empty `message`
/// signals failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub status: i32,
    pub text: Option<String>,
    pub message: Option<String>,
}

pub type Completion = Box<dyn FnOnce(CallbackOutcome) + Send>;

/// Engines that report through a completion callback (sass.js).
pub trait CallbackCompiler: Send + Sync {
    fn compile(&self, source: &str, options: &CallbackOptions, done: Completion);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutput {
    pub css: String,
}

/// Engines whose render call is itself asynchronous (Less).
#[async_trait::async_trait]
pub trait AsyncRenderer: Send + Sync {
    async fn render(&self, source: &str) -> Result<RenderOutput, NativeError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsxEmit {
    React,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranspileOptions {
    pub file_name: String,
    pub source_map: bool,
    pub jsx: JsxEmit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranspileOutput {
    pub output_text: String,
    pub source_map_text: Option<String>,
}

/// Single-module transpilers (TypeScript). Diagnostics are not reported
/// through this call.
pub trait Transpiler: Send + Sync {
    fn transpile_module(&self, source: &str, options: &TranspileOptions) -> TranspileOutput;
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransformOptions {
    pub presets: Vec<String>,
    pub source_maps: bool,
    pub source_file_name: String,
    pub input_source_map: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransformOutput {
    pub code: String,
    pub map: Option<serde_json::Value>,
}

/// General-purpose JavaScript transformers (Babel).
pub trait Transformer: Send + Sync {
    fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
    ) -> Result<TransformOutput, NativeError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapMode {
    None,
    Linked,
    Embedded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptOptions {
    pub filename: String,
    pub map: MapMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptOutput {
    pub code: String,
    pub source_map: Option<String>,
}

/// Compile-to-JavaScript languages (LiveScript, CoffeeScript).
pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, source: &str, options: &ScriptOptions) -> Result<ScriptOutput, NativeError>;
}

/// CommonJS-style module lookup for engines that only expose `require`.
pub trait ModuleRequire: Send + Sync {
    fn require(&self, module: &str) -> Option<EngineExport>;
}

#[derive(Clone)]
pub enum EngineExport {
    Renderer(Arc<dyn Renderer>),
    Callback(Arc<dyn CallbackCompiler>),
    AsyncRenderer(Arc<dyn AsyncRenderer>),
    Transpiler(Arc<dyn Transpiler>),
    Transformer(Arc<dyn Transformer>),
    Script(Arc<dyn ScriptCompiler>),
    Require(Arc<dyn ModuleRequire>),
}

impl EngineExport {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineExport::Renderer(_) => "renderer",
            EngineExport::Callback(_) => "callback",
            EngineExport::AsyncRenderer(_) => "async-renderer",
            EngineExport::Transpiler(_) => "transpiler",
            EngineExport::Transformer(_) => "transformer",
            EngineExport::Script(_) => "script",
            EngineExport::Require(_) => "require",
        }
    }
}

impl fmt::Debug for EngineExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineExport::{}", self.kind())
    }
}

/// Symbols published by one activated engine.
#[derive(Clone, Debug, Default)]
pub struct EngineExports {
    symbols: HashMap<String, EngineExport>,
}

impl EngineExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, export: EngineExport) -> Self {
        self.insert(symbol, export);
        self
    }

    pub fn insert(&mut self, symbol: &str, export: EngineExport) {
        self.symbols.insert(symbol.to_string(), export);
    }

    pub fn get(&self, symbol: &str) -> Option<&EngineExport> {
        self.symbols.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }
}
