//! # Backoffice Partner Connector
//!
//! Outbound-integration layer between the backoffice message queue and the
//! partner registries, with:
//! - Name-keyed processor registry populated at start-up
//! - Shared delivery lifecycle (skip / stub / disabled / build / submit / classify)
//! - Retry-classifying HTTP transport with bounded timeouts
//! - Request/response audit capture
//! - A closed outcome taxonomy the external queue maps to message dispositions
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │     External queue (owns scheduling/status)      │
//! └────────────┬─────────────────────────────────────┘
//!              │ Message { handler, context }
//! ┌────────────▼─────────────────────────────────────┐
//! │          Processor Registry (dispatch)           │
//! └────┬────────────────┬────────────────┬───────────┘
//!      │                │                │
//! ┌────▼─────┐   ┌──────▼──────┐  ┌──────▼────────┐
//! │  AGDREF  │   │     DNA     │  │    Simple     │
//! │  flows   │   │    flows    │  │  processors   │
//! └────┬─────┘   └──────┬──────┘  └───────────────┘
//!      │                │
//! ┌────▼────────────────▼────────────────────────────┐
//! │   Audit Capture + Retry-Classifying Transport    │
//! └──────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod adapter;
pub mod agdref;
pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod dna;
pub mod error;
pub mod metrics;
pub mod processor;
pub mod registry;
pub mod soap;
pub mod transport;
pub mod types;

pub use error::{DeliveryError, Disposition, Result};
pub use registry::ProcessorRegistry;
pub use types::Message;

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
