//! Core types shared by every stage of a run.
//!
//! This module defines the extraction records and result table, the
//! per-document state machine ([`DocumentStatus`]), the run summary,
//! and the crate-wide error type.

mod error;
mod types;

pub use error::*;
pub use types::*;
