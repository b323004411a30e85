//! gRPC client for the localscan engine sidecar.
//!
//! This crate provides [`EngineClient`], which talks to a locally running
//! engine over three services: the scan service, the standard
//! `grpc.health.v1` health service and a management service used to shut
//! the engine down. Every call opens its own channel and closes it when done.

#![doc(html_root_url = "https://docs.rs/localscan-client/0.3.0")]

mod client;
mod config;
pub mod api;
pub mod proto;

pub use client::{EngineClient, EngineClientBuilder};
pub use config::*;
pub use localscan_core::{LocalScanError, Result};
