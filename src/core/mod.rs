pub mod domain;
pub mod errors;
pub mod loader;
pub mod pipeline;
pub mod registry;
pub mod traits;
