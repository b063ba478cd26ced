//! Adapter interfaces for text generation.
//!
//! Adapters provide a unified interface for the external service that
//! turns a cutting prompt into a card. The card parser never talks to an
//! adapter directly; it only sees the resolved text.

pub mod fabric;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the Fabric adapter
pub use fabric::FabricAdapter;

/// Output from an adapter execution
#[derive(Debug, Clone)]
pub struct AdapterOutput {
    /// Generated text, as returned
    pub content: String,
}

impl AdapterOutput {
    pub fn new(content: String) -> Self {
        Self { content }
    }
}

/// Trait for text generation adapters
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Generate text for `input`
    ///
    /// `action` selects a generator-specific pattern; an empty action sends
    /// the input as a plain prompt.
    async fn execute(&self, action: &str, input: &str, timeout: Duration) -> Result<AdapterOutput>;
}
