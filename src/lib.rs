//! Compiler adapters for a code playground.
//!
//! Engines are loaded at most once per locator through [`EngineLoader`];
//! [`AdapterRegistry`] maps a language tag to the adapter that drives them.

pub mod adapters;
pub mod config;
pub mod constants;
pub mod core;
pub mod native;
pub mod stubs;

pub use crate::adapters::default_registry;
pub use crate::core::{
    domain::{CompileResult, Locator, SourceFile},
    errors::{CompileError, LoadError},
    loader::EngineLoader,
    registry::AdapterRegistry,
};
