//! # AAS Delegate Core
//!
//! Payload normalization and result types for the AAS operation delegation bridge.
//!
//! This crate provides:
//! - A tagged parse of delegated Operation invocation bodies
//! - Alias-based extraction of the single scalar value carried by an invocation
//! - The invocation outcome and failure taxonomy shared by the adapter and the bridge

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod normalizer;
pub mod outcome;

pub use normalizer::{
    ExtractedValue, InvocationRequest, NormalizationError, Normalizer, NormalizerConfig,
};
pub use outcome::{InvocationError, InvocationResult, InvocationSuccess};
