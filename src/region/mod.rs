//! Region filtering and concentration analysis.
//!
//! The linear filters in `filter` define which businesses fall inside a
//! region; `RegionIndex` answers the same question through an R-tree, and
//! `RegionService` combines filtering with the summary and outline the map
//! displays.

pub mod analysis;
pub mod filter;
mod index;
mod service;

pub use analysis::analyze_concentration;
pub use filter::{filter_by_circle, filter_by_polygon, filter_by_region};
pub use index::RegionIndex;
pub use service::{RegionReport, RegionService};
