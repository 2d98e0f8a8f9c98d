//! Recipe records and the provider collaborator
//!
//! The simulation core never fetches anything: it consumes whatever ordered
//! collection of records the provider currently holds. The provider owns the
//! "is the data source failing" flag and the retry path, and degrades to
//! previously cached data instead of surfacing errors to the game.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// One recipe, immutable once ingested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Why a recipe source produced no usable data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeError {
    /// The source could not be reached
    Unavailable(String),
    /// The source answered with data that failed to parse
    Malformed(String),
}

impl fmt::Display for RecipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeError::Unavailable(msg) => write!(f, "recipe source unavailable: {msg}"),
            RecipeError::Malformed(msg) => write!(f, "recipe data malformed: {msg}"),
        }
    }
}

impl std::error::Error for RecipeError {}

/// Ordered, deduplicated recipe collection with a failing flag
///
/// Records are shared out as `Rc`s so collectibles already on the road keep
/// their captured recipe even when the collection is replaced mid-run.
#[derive(Debug, Default)]
pub struct RecipeProvider {
    records: Vec<Rc<RecipeRecord>>,
    by_id: HashMap<String, Rc<RecipeRecord>>,
    failing: bool,
}

impl RecipeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current collection, in ingestion order
    pub fn records(&self) -> &[Rc<RecipeRecord>] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Rc<RecipeRecord>> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True after the most recent retry failed
    pub fn is_failing(&self) -> bool {
        self.failing
    }

    /// Replace the collection. Order is preserved; later duplicates of an id
    /// are dropped.
    pub fn ingest(&mut self, records: Vec<RecipeRecord>) {
        self.records.clear();
        self.by_id.clear();
        for record in records {
            if self.by_id.contains_key(&record.id) {
                continue;
            }
            let record = Rc::new(record);
            self.by_id.insert(record.id.clone(), record.clone());
            self.records.push(record);
        }
        log::info!("Recipe collection now holds {} records", self.records.len());
    }

    /// Fill from cached data, but only when empty: fresh data always wins
    /// over a stale cache.
    pub fn seed(&mut self, records: Vec<RecipeRecord>) {
        if self.is_empty() && !records.is_empty() {
            log::info!("Seeding recipes from cache ({} records)", records.len());
            self.ingest(records);
        }
    }

    /// Pull fresh records from a source. On success the collection is
    /// replaced and the failing flag cleared; on failure the flag is raised
    /// and whatever the provider already holds keeps being served.
    pub fn retry<F>(&mut self, source: F) -> Result<(), RecipeError>
    where
        F: FnOnce() -> Result<Vec<RecipeRecord>, RecipeError>,
    {
        match source() {
            Ok(records) => {
                self.ingest(records);
                self.failing = false;
                Ok(())
            }
            Err(err) => {
                log::warn!("Recipe refresh failed, serving {} cached: {err}", self.len());
                self.failing = true;
                Err(err)
            }
        }
    }

    /// Plain owned copies of the current records, e.g. for the cache
    pub fn snapshot(&self) -> Vec<RecipeRecord> {
        self.records.iter().map(|r| (**r).clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> RecipeRecord {
        RecipeRecord {
            id: id.to_string(),
            name: name.to_string(),
            category: None,
            region: None,
            thumbnail: None,
            instructions: None,
        }
    }

    #[test]
    fn test_ingest_dedups_by_id_keeping_first() {
        let mut provider = RecipeProvider::new();
        provider.ingest(vec![
            record("1", "Carbonara"),
            record("2", "Paella"),
            record("1", "Carbonara (dup)"),
        ]);
        assert_eq!(provider.len(), 2);
        assert_eq!(provider.records()[0].name, "Carbonara");
        assert_eq!(provider.records()[1].name, "Paella");
        assert_eq!(provider.get("1").unwrap().name, "Carbonara");
    }

    #[test]
    fn test_retry_failure_keeps_records_and_flags() {
        let mut provider = RecipeProvider::new();
        provider.ingest(vec![record("1", "Carbonara")]);

        let result = provider.retry(|| Err(RecipeError::Unavailable("offline".into())));
        assert!(result.is_err());
        assert!(provider.is_failing());
        assert_eq!(provider.len(), 1);

        // A later success replaces the collection and clears the flag
        provider
            .retry(|| Ok(vec![record("2", "Paella"), record("3", "Goulash")]))
            .unwrap();
        assert!(!provider.is_failing());
        assert_eq!(provider.len(), 2);
        assert!(provider.get("1").is_none());
    }

    #[test]
    fn test_seed_only_fills_empty_provider() {
        let mut provider = RecipeProvider::new();
        provider.seed(vec![record("1", "Cached")]);
        assert_eq!(provider.len(), 1);

        provider.ingest(vec![record("2", "Fresh")]);
        provider.seed(vec![record("3", "Stale")]);
        assert_eq!(provider.len(), 1);
        assert_eq!(provider.records()[0].name, "Fresh");
    }

    #[test]
    fn test_replacing_collection_keeps_live_references() {
        let mut provider = RecipeProvider::new();
        provider.ingest(vec![record("1", "Carbonara")]);
        let captured = provider.records()[0].clone();

        provider.ingest(vec![record("2", "Paella")]);
        assert_eq!(captured.name, "Carbonara");
    }

    #[test]
    fn test_record_parses_with_missing_optionals() {
        let json = r#"{"id": "52772", "name": "Teriyaki Chicken Casserole"}"#;
        let record: RecipeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "52772");
        assert!(record.category.is_none());
        assert!(record.region.is_none());
    }
}
