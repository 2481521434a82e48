//! `shipcheck-recon` — Sales vs warehouse shipment reconciliation engine.
//!
//! Pure engine crate: receives two pre-parsed row sets, returns a discrepancy
//! report. No CLI or IO dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod pack_sizes;
pub mod summary;

pub use config::ReconConfig;
pub use engine::{reconcile, run, ReconEngine};
pub use error::ReconError;
pub use model::{DatasetKind, OrderKey, RawRow, ReconReport};
pub use pack_sizes::PackTable;
