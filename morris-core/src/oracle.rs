//! Value oracle: a read-only lookup from state code to outcome score.
//!
//! Scores lie in [-1, 1] and are always from X's point of view: positive
//! favours X, negative favours O. How the scores were produced is not the
//! concern of this crate.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::hash::BuildHasher;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::{Error, Result, StateCode};

/// Read-only score lookup.
pub trait Oracle {
    /// Score of the encoded state, or None if the oracle does not cover it.
    fn score(&self, code: StateCode) -> Option<f64>;
}

impl<T: Oracle + ?Sized> Oracle for &T {
    fn score(&self, code: StateCode) -> Option<f64> {
        (**self).score(code)
    }
}

impl<T: Oracle + ?Sized> Oracle for Box<T> {
    fn score(&self, code: StateCode) -> Option<f64> {
        (**self).score(code)
    }
}

impl<S: BuildHasher> Oracle for HashMap<StateCode, f64, S> {
    fn score(&self, code: StateCode) -> Option<f64> {
        self.get(&code).copied()
    }
}

/// Oracle backed by a function.
pub struct FnOracle<F>(pub F);

impl<F: Fn(StateCode) -> Option<f64>> Oracle for FnOracle<F> {
    fn score(&self, code: StateCode) -> Option<f64> {
        (self.0)(code)
    }
}

/// In-memory score table.
///
/// The JSON form is an object mapping decimal state codes to scores:
/// `{"1000000": 0.0, "1000001": 0.25, ...}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreTable {
    scores: HashMap<StateCode, f64>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            scores: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, code: StateCode, score: f64) -> Option<f64> {
        self.scores.insert(code, score)
    }

    pub fn get(&self, code: StateCode) -> Option<f64> {
        self.scores.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (StateCode, f64)> + '_ {
        self.scores.iter().map(|(&code, &score)| (code, score))
    }

    /// Entries sorted by code.
    pub fn sorted_entries(&self) -> Vec<(StateCode, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|&(code, _)| code);
        entries
    }

    /// Parse a JSON score table.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, f64> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Read a JSON score table.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: HashMap<String, f64> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: HashMap<String, f64>) -> Result<Self> {
        let mut table = Self::with_capacity(raw.len());
        for (key, score) in raw {
            let code = key
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::InvalidTableKey { key: key.clone() })?;
            table.insert(StateCode(code), score);
        }
        Ok(table)
    }

    /// Load a JSON score table from disk.
    pub fn load_json(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open score table {}", path.display()),
            source,
        })?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Write the table as JSON with keys in ascending code order.
    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<()> {
        let sorted: BTreeMap<u32, f64> = self
            .iter()
            .map(|(code, score)| (code.value(), score))
            .collect();
        serde_json::to_writer_pretty(writer, &sorted)?;
        Ok(())
    }

    /// Save the table as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create score table {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.to_json_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl Oracle for ScoreTable {
    fn score(&self, code: StateCode) -> Option<f64> {
        self.get(code)
    }
}

impl FromIterator<(StateCode, f64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (StateCode, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

impl Extend<(StateCode, f64)> for ScoreTable {
    fn extend<I: IntoIterator<Item = (StateCode, f64)>>(&mut self, iter: I) {
        self.scores.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let table = ScoreTable::from_json_str(r#"{"1000000": 0.0, "1000005": -0.5}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.score(StateCode(1_000_000)), Some(0.0));
        assert_eq!(table.score(StateCode(1_000_005)), Some(-0.5));
        assert_eq!(table.score(StateCode(7)), None);
    }

    #[test]
    fn test_parse_json_rejects_bad_key() {
        let err = ScoreTable::from_json_str(r#"{"abc": 1.0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTableKey { ref key } if key == "abc"));
        assert!(matches!(
            ScoreTable::from_json_str("[1, 2]"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let table: ScoreTable = [
            (StateCode(1_000_000), 0.0),
            (StateCode(5), 0.25),
            (StateCode(1_000_321), -1.0),
        ]
        .into_iter()
        .collect();

        let mut buf = Vec::new();
        table.to_json_writer(&mut buf).unwrap();
        let loaded = ScoreTable::from_json_reader(buf.as_slice()).unwrap();
        assert_eq!(loaded, table);

        // Keys come out in numeric order.
        let text = String::from_utf8(buf).unwrap();
        assert!(text.find("\"5\"").unwrap() < text.find("\"1000000\"").unwrap());
    }

    #[test]
    fn test_save_load_file() {
        let path = std::env::temp_dir().join("morris_core_test_scores.json");
        let table: ScoreTable = [(StateCode(12), 0.5)].into_iter().collect();
        table.save_json(&path).unwrap();
        let loaded = ScoreTable::load_json(&path).unwrap();
        assert_eq!(loaded.get(StateCode(12)), Some(0.5));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("morris_core_no_such_table.json");
        assert!(matches!(ScoreTable::load_json(&path), Err(Error::Io { .. })));
    }

    #[test]
    fn test_oracle_impls() {
        let mut map = HashMap::new();
        map.insert(StateCode(3), 0.75);
        assert_eq!(map.score(StateCode(3)), Some(0.75));
        assert_eq!((&map).score(StateCode(4)), None);

        let boxed: Box<dyn Oracle> = Box::new(FnOracle(|code: StateCode| {
            Some(code.value() as f64 / 10.0)
        }));
        assert_eq!(boxed.score(StateCode(5)), Some(0.5));
    }
}
