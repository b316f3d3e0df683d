//! opsdeck-store - reactive state layer for the operations dashboard
//!
//! The client-side state of a dashboard supervising a pool of redundant
//! network-controller instances:
//! - namespaced modules mirroring server-held configuration and telemetry
//! - merge-correct partial updates that never drop unrelated fields
//! - pure derived views, memoized per unique input state
//! - a time-bounded alert queue with automatic expiry
//!
//! # Example
//!
//! ```rust,ignore
//! use opsdeck_gateway::HttpGateway;
//! use opsdeck_store::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(HttpGateway::new("http://localhost:8000")?);
//! let store = Store::new(gateway);
//!
//! store.initialize().await?;
//! println!("{} controllers", store.controllers().controllers().len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod alerts;
pub mod comparison;
pub mod config;
pub mod controllers;
pub mod error;
pub mod memo;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use alerts::{AlertQueue, DEFAULT_ALERT_TTL};
pub use comparison::{
    ComparisonDataset, ComparisonModule, ControllerPerformance, SecurityAssessment, TestOverview,
    CONTROLLER_LABELS, CRITICAL_IMPACT, REPORT_FILENAME,
};
pub use config::{AlertThresholds, ConfigModule, ConfigPayload, ControllerLimits, CONFIG_SECTIONS};
pub use controllers::ControllerRoster;
pub use error::StoreError;
pub use memo::Memo;
pub use store::{Store, StoreConfig};
pub use types::{
    Alert, AlertId, AlertKind, Controller, ControllerState, Difference, Priority, Recommendation,
    Section,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the opsdeck store
    pub use crate::{
        Alert, AlertId, AlertKind, AlertQueue, Controller, ControllerState, Store, StoreConfig,
        StoreError,
    };
    pub use opsdeck_gateway::{ApiGateway, GatewayError, HttpGateway, Method};
}
