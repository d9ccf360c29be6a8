//! Registry import: sheet loading, size classification, normalization,
//! persistence and attribute-level views of the dataset.

pub mod attributes;
pub mod classify;
pub mod normalize;
pub mod sheets;
pub mod store;

pub use attributes::{dataset_overview, AttributeFilter};
pub use classify::{classify_size_descriptor, employee_upper_bound};
pub use normalize::normalize;
pub use sheets::{load_sheets, SheetPaths, SheetRow};
pub use store::{BusinessStore, ImportMetadata};
