pub mod adapter;
pub mod engine;
pub mod source;
