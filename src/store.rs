use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::compare::SalaryComparison;
use crate::error::{HuntError, HuntResult};
use crate::filter::FilterSet;
use crate::models::Listing;

pub const MISSING_LISTING: &str = "one of the referenced listings does not exist";

// One JSON array per file. Mutations rewrite it through temp file + rename;
// no locking, last writer wins.
#[derive(Debug, Clone)]
pub struct ListingStore {
    path: PathBuf,
}

impl ListingStore {
    // Creates parent dirs and an empty array if needed
    pub fn open(path: impl Into<PathBuf>) -> HuntResult<Self> {
        let store = Self { path: path.into() };
        store.init()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn init(&self) -> HuntResult<()> {
        std::fs::create_dir_all(self.dir()).map_err(|e| HuntError::storage(self.dir(), e))?;
        if !self.path.exists() {
            self.write(&[])?;
            debug!(path = %self.path.display(), "created empty listing store");
        }
        Ok(())
    }

    pub fn load(&self) -> HuntResult<Vec<Listing>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| HuntError::storage(&self.path, e))?;
        serde_json::from_str(&content).map_err(|source| HuntError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    // (1-based file position, listing) for every listing `keep` accepts
    pub fn load_numbered(
        &self,
        keep: impl Fn(&Listing) -> bool,
    ) -> HuntResult<Vec<(usize, Listing)>> {
        Ok(self
            .load()?
            .into_iter()
            .enumerate()
            .filter(|(_, listing)| keep(listing))
            .map(|(idx, listing)| (idx + 1, listing))
            .collect())
    }

    // Exact equality on the serialized fields.
    pub fn load_matching(&self, fields: &[(&str, Value)]) -> HuntResult<Vec<(usize, Listing)>> {
        self.load_numbered(|listing| {
            let Ok(Value::Object(record)) = serde_json::to_value(listing) else {
                return false;
            };
            fields
                .iter()
                .all(|(key, expected)| record.get(*key) == Some(expected))
        })
    }

    pub fn load_filtered(
        &self,
        filters: &FilterSet,
        today: NaiveDate,
    ) -> HuntResult<Vec<(usize, Listing)>> {
        self.load_numbered(|listing| filters.matches(listing, today))
    }

    pub fn len(&self) -> HuntResult<usize> {
        Ok(self.load()?.len())
    }

    pub fn append(&self, listing: &Listing) -> HuntResult<()> {
        self.append_all(std::slice::from_ref(listing))
    }

    pub fn append_all(&self, new: &[Listing]) -> HuntResult<()> {
        let mut listings = self.load()?;
        listings.extend_from_slice(new);
        self.write(&listings)?;
        info!(added = new.len(), total = listings.len(), "saved listings");
        Ok(())
    }

    pub fn delete_by_id(&self, id: &str) -> HuntResult<usize> {
        self.delete_by_ids(&[id.to_string()])
    }

    pub fn delete_by_ids(&self, ids: &[String]) -> HuntResult<usize> {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut listings = self.load()?;
        let before = listings.len();
        listings.retain(|l| !ids.contains(l.id.as_str()));
        let removed = before - listings.len();
        self.write(&listings)?;
        info!(removed, remaining = listings.len(), "deleted listings by id");
        Ok(removed)
    }

    // All positions resolve against one snapshot; out of range is ignored
    pub fn delete_by_positions(&self, positions: &[usize]) -> HuntResult<usize> {
        let positions: HashSet<usize> = positions.iter().copied().collect();
        let listings = self.load()?;
        let before = listings.len();
        let kept: Vec<Listing> = listings
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !positions.contains(&(idx + 1)))
            .map(|(_, l)| l)
            .collect();
        let removed = before - kept.len();
        self.write(&kept)?;
        info!(removed, remaining = kept.len(), "deleted listings by position");
        Ok(removed)
    }

    pub fn resolve_positions(&self, positions: &[usize]) -> HuntResult<Vec<Option<String>>> {
        let listings = self.load()?;
        Ok(positions
            .iter()
            .map(|&p| at_position(&listings, p).map(|l| l.id.clone()))
            .collect())
    }

    pub fn get_position(&self, position: usize) -> HuntResult<Listing> {
        let listings = self.load()?;
        at_position(&listings, position)
            .cloned()
            .ok_or_else(|| HuntError::NotFound(format!("no listing at position {}", position)))
    }

    pub fn compare_positions(&self, first: usize, second: usize) -> HuntResult<SalaryComparison> {
        let listings = self.load()?;
        match (at_position(&listings, first), at_position(&listings, second)) {
            (Some(a), Some(b)) => Ok(a.compare_salary_to(b)),
            _ => Err(HuntError::NotFound(MISSING_LISTING.to_string())),
        }
    }

    // 4-space indent, non-ASCII written literally
    pub fn write(&self, listings: &[Listing]) -> HuntResult<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        listings
            .serialize(&mut ser)
            .map_err(|e| HuntError::storage(&self.path, std::io::Error::other(e)))?;
        buf.push(b'\n');

        let mut tmp = tempfile::NamedTempFile::new_in(self.dir())
            .map_err(|e| HuntError::storage(self.dir(), e))?;
        tmp.write_all(&buf)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| HuntError::storage(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| HuntError::storage(&self.path, e.error))?;

        debug!(path = %self.path.display(), count = listings.len(), "wrote listing store");
        Ok(())
    }
}

fn at_position(listings: &[Listing], position: usize) -> Option<&Listing> {
    position.checked_sub(1).and_then(|idx| listings.get(idx))
}
