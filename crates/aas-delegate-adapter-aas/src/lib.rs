//! # AAS Adapter
//!
//! Repository-side plumbing for the AAS operation delegation bridge.
//!
//! ## Encoding Rules (per AAS Part 2 HTTP/REST API)
//!
//! - **Identifiable IDs**: base64url-encoded WITHOUT padding
//! - **idShortPath**: URL-encoded (preserving `[]` for list indices)
//!
//! ## Value Propagation
//!
//! [`ValuePropagator`] replaces the value of one fixed property through its
//! `$value` sub-resource with a single `PATCH` carrying a bare JSON scalar.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod encoding;
pub mod propagator;
pub mod target;

pub use client::{AasClient, AasClientConfig, ClientError};
pub use encoding::{decode_id_base64url, encode_id_base64url, encode_idshort_path, EncodingError};
pub use propagator::{PropagationError, ValuePropagator};
pub use target::{PropertyTarget, TargetError};
