//! # API Shared
//!
//! Shared definitions for the CID suggestion APIs.
//!
//! Contains:
//! - Wire types (`wire` module) with the JSON field names the browser front end uses
//! - Conversions between wire types and `cid-core` domain types
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `cid` CLI.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
