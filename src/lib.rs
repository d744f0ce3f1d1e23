//! Viewer for HWiNFO sensor logs.
//!
//! The data layer repairs schema-drifted CSV captures into one rectangular
//! typed table; the grouping layer classifies columns into named, overlapping
//! display groups and hands any renderer a declarative visibility plan.  The
//! egui front end in [`app`]/[`ui`] is one such renderer.

pub mod app;
pub mod color;
pub mod data;
pub mod groups;
pub mod state;
pub mod ui;
