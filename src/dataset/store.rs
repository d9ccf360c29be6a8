//! On-disk store for the normalized tables, backed by sled.
//!
//! Each table lives in its own tree keyed by big-endian id, so iteration
//! returns rows in id order. Values are JSON.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{BusinessRecord, NormalizedTables};

const SECTORS: &str = "sectors";
const MUNICIPALITIES: &str = "municipalities";
const LOCATIONS: &str = "locations";
const UNITS: &str = "units";
const META: &str = "meta";
const META_KEY: &[u8] = b"import";

/// Summary of the last import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMetadata {
    pub imported_at: DateTime<Utc>,
    pub sources: Vec<String>,
    pub units: usize,
    pub sectors: usize,
    pub municipalities: usize,
    pub locations: usize,
}

impl ImportMetadata {
    pub fn for_tables(tables: &NormalizedTables, sources: Vec<String>) -> Self {
        Self {
            imported_at: Utc::now(),
            sources,
            units: tables.units.len(),
            sectors: tables.sectors.len(),
            municipalities: tables.municipalities.len(),
            locations: tables.locations.len(),
        }
    }
}

#[derive(Clone)]
pub struct BusinessStore {
    db: sled::Db,
}

impl BusinessStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Opening business store at {}", path.display());
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Replace every table with `tables`.
    pub fn replace_all(
        &self,
        tables: &NormalizedTables,
        metadata: &ImportMetadata,
    ) -> Result<(), StoreError> {
        self.write_tree(SECTORS, tables.sectors.iter().map(|r| (r.id, r)))?;
        self.write_tree(MUNICIPALITIES, tables.municipalities.iter().map(|r| (r.id, r)))?;
        self.write_tree(LOCATIONS, tables.locations.iter().map(|r| (r.id, r)))?;
        self.write_tree(UNITS, tables.units.iter().map(|r| (r.id, r)))?;

        self.db
            .open_tree(META)?
            .insert(META_KEY, serde_json::to_vec(metadata)?)?;

        self.db.flush()?;
        info!("Stored {} units", tables.units.len());
        Ok(())
    }

    pub fn load_tables(&self) -> Result<NormalizedTables, StoreError> {
        Ok(NormalizedTables {
            sectors: self.read_tree(SECTORS)?,
            municipalities: self.read_tree(MUNICIPALITIES)?,
            locations: self.read_tree(LOCATIONS)?,
            units: self.read_tree(UNITS)?,
        })
    }

    /// The full joined table, in id order.
    pub fn load_records(&self) -> Result<Vec<BusinessRecord>, StoreError> {
        let records = self.load_tables()?.join();
        info!("Loaded {} business records", records.len());
        Ok(records)
    }

    pub fn metadata(&self) -> Result<Option<ImportMetadata>, StoreError> {
        match self.db.open_tree(META)?.get(META_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| StoreError::Decode { tree: META, source }),
            None => Ok(None),
        }
    }

    fn write_tree<'a, T, I>(&self, name: &'static str, rows: I) -> Result<(), StoreError>
    where
        T: Serialize + 'a,
        I: Iterator<Item = (u64, &'a T)>,
    {
        let tree = self.db.open_tree(name)?;
        tree.clear()?;

        let mut batch = sled::Batch::default();
        let mut count = 0usize;
        for (id, row) in rows {
            batch.insert(id.to_be_bytes().to_vec(), serde_json::to_vec(row)?);
            count += 1;
        }
        tree.apply_batch(batch)?;

        debug!("Wrote {} rows to '{}'", count, name);
        Ok(())
    }

    fn read_tree<T: DeserializeOwned>(&self, name: &'static str) -> Result<Vec<T>, StoreError> {
        let tree = self.db.open_tree(name)?;
        let mut rows = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let (_, value) = entry?;
            let row = serde_json::from_slice(&value)
                .map_err(|source| StoreError::Decode { tree: name, source })?;
            rows.push(row);
        }
        Ok(rows)
    }
}
