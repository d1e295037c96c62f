use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::constants::{DEFAULT_SUPERVISOR_TYPOS, RESOLVING_MARKER};

/// Known misspelled supervisor name -> canonical spelling.
///
/// Loaded once before any parsing starts and only read afterwards, so one table can be
/// shared by any number of normalizers and threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationTable {
    entries: HashMap<String, String>,
}

impl NormalizationTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_string(), v.into().trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && k != v)
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(
            Arc::new(NormalizationTable::new(DEFAULT_SUPERVISOR_TYPOS.iter().copied())),
            RESOLVING_MARKER,
        )
    }
}

/// Corrects known supervisor misspellings and strips the trailing "is resolving" annotation.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    table: Arc<NormalizationTable>,
    marker: String,
}

impl NameNormalizer {
    /// Chains in the table (`a -> b`, `b -> c`) are collapsed up front so that
    /// normalizing an already normalized name never changes it again.
    pub fn new(table: Arc<NormalizationTable>, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        let resolved = Self::resolve_chains(&table, &marker);
        Self {
            table: Arc::new(resolved),
            marker,
        }
    }

    pub fn normalize(&self, raw_name: &str) -> String {
        let name = strip_marker(raw_name, &self.marker);
        match self.table.get(name) {
            Some(canonical) => canonical.to_string(),
            None => name.to_string(),
        }
    }

    pub fn table(&self) -> &NormalizationTable {
        &self.table
    }

    fn resolve_chains(table: &NormalizationTable, marker: &str) -> NormalizationTable {
        let mut resolved = HashMap::with_capacity(table.len());
        for (from, to) in &table.entries {
            let mut current = strip_marker(to, marker).to_string();
            let mut hops = 0;
            while let Some(next) = table.get(&current) {
                hops += 1;
                if hops > table.len() {
                    warn!(name = %from, "cycle in supervisor normalization table, entry ignored");
                    current = from.clone();
                    break;
                }
                current = strip_marker(next, marker).to_string();
            }
            if &current != from {
                resolved.insert(from.clone(), current);
            }
        }
        NormalizationTable { entries: resolved }
    }
}

/// Cut `name` at the first occurrence of `marker`. A name that would become empty is kept whole.
fn strip_marker<'a>(name: &'a str, marker: &str) -> &'a str {
    let name = name.trim();
    if marker.is_empty() {
        return name;
    }
    match name.find(marker) {
        Some(i) if !name[..i].trim().is_empty() => name[..i].trim(),
        _ => name,
    }
}
