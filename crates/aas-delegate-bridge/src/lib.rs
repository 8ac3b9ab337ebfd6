//! # AAS Delegate Bridge
//!
//! HTTP endpoint for AAS Operations whose execution is delegated through an
//! `invocationDelegation` qualifier.
//!
//! ## Flow
//!
//! 1. **Normalize**: extract the single scalar carried by the invocation body
//! 2. **Propagate**: `PATCH` it to the configured property's `$value` endpoint
//! 3. **Respond**: 200 on success, 400 for unusable bodies, 502 for repository
//!    failures, 500 for anything unexpected

pub mod config;
pub mod controller;
pub mod response;
pub mod server;

pub use config::{BridgeConfig, DEFAULT_MAX_BODY_BYTES};
pub use controller::{Bridge, Stage};
pub use server::{router, serve};
