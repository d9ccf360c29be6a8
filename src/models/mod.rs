//! Core data models for the region analysis system.

pub mod business;
pub mod normalized;
pub mod region;
pub mod summary;

pub use business::{BusinessRecord, Position, SizeCategory};
pub use normalized::{LocationRow, MunicipalityRow, NormalizedTables, SectorRow, UnitRow};
pub use region::RegionDescriptor;
pub use summary::{
    CategoryCount, ConcentrationSummary, DatasetOverview, MunicipalityCount, SectorCount,
    NO_DOMINANT_CATEGORY,
};
