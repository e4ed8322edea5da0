//! HTTP networking module
//!
//! Provides the outbound HTTP client shared by provider adapters.

mod client;

pub use client::HttpClient;
