//! Data layer: the telemetry table and the log loader that produces it.
//!
//! ```text
//!  HWiNFO .csv log
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  decode + strict parse; trailer-header repair on drift
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  named typed columns, equal length, null-padded
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
