// verisure-api: Async Rust client for the Verisure home-security cloud API

pub mod client;
pub mod error;
pub mod gateway;
pub mod models;
pub mod transport;

pub use client::VerisureClient;
pub use error::Error;
pub use gateway::{ApiRequest, ApiResponse};
pub use transport::{DEFAULT_BASE_URL, TlsMode, TransportConfig};

// Re-exported so consumers can inspect gateway statuses without a direct reqwest dependency.
pub use reqwest::header::HeaderMap;
pub use reqwest::{Method, StatusCode};
