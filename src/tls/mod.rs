pub mod cert_verifier;
pub mod client_config;

pub use client_config::build_client_config;
