//! Column grouping: classify table columns into named, possibly overlapping
//! display groups and produce the visibility plan a renderer consumes.
//!
//! ```text
//!   ┌────────────────┐
//!   │ ColumnSelector  │  compiled regex → ordered matching column names
//!   └────────────────┘
//!           │
//!           ▼
//!   ┌────────────────┐
//!   │ GroupRegistry   │  built-in catalogue + user groups, axis sets
//!   └────────────────┘
//!           │
//!           ▼
//!   ┌────────────────┐
//!   │ VisibilityPlan  │  per-series show/hide + axis titles and kinds
//!   └────────────────┘
//! ```

pub mod registry;
pub mod selector;
