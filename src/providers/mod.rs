//! Search provider module
//!
//! Defines the Provider trait and provides a registry for the configured
//! search providers.

mod loader;
mod registry;
mod traits;

// Provider implementations
pub mod brave;
pub mod google;

#[cfg(test)]
pub(crate) mod testing;

pub use loader::ProviderLoader;
pub use registry::ProviderRegistry;
pub use traits::*;
