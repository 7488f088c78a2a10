//! HTTP transport module with retry logic and error classification.

mod client;

pub use client::HttpClient;
