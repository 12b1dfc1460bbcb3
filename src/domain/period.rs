//! Period labels and their store prefixes.

use std::fmt;

/// Human-facing name of a historical window, e.g. "5 years (1980-1984)".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodLabel(String);

impl PeriodLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodEntry {
    pub label: PeriodLabel,
    pub prefix: String,
}

/// Ordered, fixed mapping from period label to the store prefix holding its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCatalog {
    entries: Vec<PeriodEntry>,
}

impl PeriodCatalog {
    /// Later duplicates of a label are dropped.
    pub fn new(entries: Vec<PeriodEntry>) -> Self {
        let mut unique: Vec<PeriodEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !unique.iter().any(|e| e.label == entry.label) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    pub fn entries(&self) -> &[PeriodEntry] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &PeriodLabel> {
        self.entries.iter().map(|e| &e.label)
    }

    pub fn prefix_for(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label.as_str() == label)
            .map(|e| e.prefix.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub const DEFAULT_LISTING_PREFIX: &str = "aapl_versions_export/";

impl Default for PeriodCatalog {
    fn default() -> Self {
        let builtin = [
            ("1 year (1980)", "ver_0"),
            ("5 years (1980-1984)", "ver_1"),
            ("10 years (1980-1989)", "ver_2"),
            ("20 years (1980-1999)", "ver_3"),
            ("All (1980-2024)", "ver_4"),
        ];
        Self::new(
            builtin
                .iter()
                .map(|(label, version)| PeriodEntry {
                    label: PeriodLabel::new(*label),
                    prefix: format!("{DEFAULT_LISTING_PREFIX}{version}.parquet/"),
                })
                .collect(),
        )
    }
}
