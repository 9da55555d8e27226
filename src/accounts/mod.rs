pub mod client;

pub use client::{AccountClient, GatewayError};
