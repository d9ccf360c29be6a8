//! Segmenta - regional business concentration analysis
//!
//! This library provides the region engine plus the dataset import and
//! storage shared by the ingest and query binaries.

pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod models;
pub mod region;

pub use error::{RegionError, StoreError};
pub use models::{BusinessRecord, ConcentrationSummary, Position, RegionDescriptor, SizeCategory};
pub use region::{analyze_concentration, filter_by_circle, filter_by_polygon, RegionService};
