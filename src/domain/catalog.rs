//! Catalog resolver: maps each period to a concrete data file in the store listing.
//!
//! A period resolves to the lexicographically first listing key that starts with
//! the period's prefix and ends with the data-file extension. Periods stored as
//! several parts are not concatenated; only the first part is used.

use crate::domain::error::PricedashError;
use crate::domain::period::{PeriodCatalog, PeriodLabel};

pub const DEFAULT_EXTENSION: &str = ".parquet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Available(String),
    Unavailable,
}

impl Resolution {
    pub fn key(&self) -> Option<&str> {
        match self {
            Resolution::Available(key) => Some(key),
            Resolution::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub label: PeriodLabel,
    pub resolution: Resolution,
    /// Matching parts beyond the canonical one.
    pub ignored_parts: usize,
}

impl ResolvedPeriod {
    /// The resolved key, or `CatalogEmpty` so the caller never loads a default.
    pub fn require_key(&self) -> Result<&str, PricedashError> {
        self.resolution
            .key()
            .ok_or_else(|| PricedashError::CatalogEmpty {
                period: self.label.to_string(),
            })
    }
}

pub fn resolve_prefix(listing: &[String], prefix: &str, extension: &str) -> (Resolution, usize) {
    let mut matches = listing
        .iter()
        .filter(|key| key.starts_with(prefix) && key.ends_with(extension));

    let Some(first) = matches.next() else {
        return (Resolution::Unavailable, 0);
    };

    let mut canonical = first;
    let mut count = 1;
    for key in matches {
        if key < canonical {
            canonical = key;
        }
        count += 1;
    }

    (Resolution::Available(canonical.clone()), count - 1)
}

pub fn resolve_catalog(
    listing: &[String],
    periods: &PeriodCatalog,
    extension: &str,
) -> Vec<ResolvedPeriod> {
    periods
        .entries()
        .iter()
        .map(|entry| {
            let (resolution, ignored_parts) = resolve_prefix(listing, &entry.prefix, extension);
            if ignored_parts > 0 {
                tracing::warn!(
                    period = %entry.label,
                    ignored_parts,
                    "period is stored in multiple parts; only the first part is loaded"
                );
            }
            ResolvedPeriod {
                label: entry.label.clone(),
                resolution,
                ignored_parts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::period::PeriodEntry;

    fn listing(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn catalog() -> PeriodCatalog {
        PeriodCatalog::new(vec![
            PeriodEntry {
                label: PeriodLabel::new("1 year"),
                prefix: "prices/ver_0.parquet/".into(),
            },
            PeriodEntry {
                label: PeriodLabel::new("5 years"),
                prefix: "prices/ver_1.parquet/".into(),
            },
        ])
    }

    #[test]
    fn resolves_matching_part() {
        let keys = listing(&[
            "prices/ver_0.parquet/part-00000-a.snappy.parquet",
            "prices/ver_1.parquet/part-00000-b.snappy.parquet",
        ]);
        let resolved = resolve_catalog(&keys, &catalog(), DEFAULT_EXTENSION);

        assert_eq!(resolved.len(), 2);
        assert_eq!(
            resolved[0].resolution,
            Resolution::Available("prices/ver_0.parquet/part-00000-a.snappy.parquet".into())
        );
        assert_eq!(
            resolved[1].resolution.key(),
            Some("prices/ver_1.parquet/part-00000-b.snappy.parquet")
        );
    }

    #[test]
    fn missing_prefix_is_unavailable() {
        let keys = listing(&["prices/ver_0.parquet/part-00000-a.parquet"]);
        let resolved = resolve_catalog(&keys, &catalog(), DEFAULT_EXTENSION);

        assert_eq!(resolved[1].resolution, Resolution::Unavailable);
        assert!(matches!(
            resolved[1].require_key(),
            Err(PricedashError::CatalogEmpty { ref period }) if period == "5 years"
        ));
    }

    #[test]
    fn empty_listing_is_all_unavailable() {
        let resolved = resolve_catalog(&[], &catalog(), DEFAULT_EXTENSION);
        assert!(resolved.iter().all(|r| r.resolution == Resolution::Unavailable));
    }

    #[test]
    fn wrong_extension_does_not_match() {
        let keys = listing(&[
            "prices/ver_0.parquet/_SUCCESS",
            "prices/ver_0.parquet/part-00000-a.crc",
        ]);
        let (resolution, _) = resolve_prefix(&keys, "prices/ver_0.parquet/", DEFAULT_EXTENSION);
        assert_eq!(resolution, Resolution::Unavailable);
    }

    #[test]
    fn multiple_parts_pick_lexicographic_first() {
        let keys = listing(&[
            "prices/ver_0.parquet/part-00002.parquet",
            "prices/ver_0.parquet/part-00000.parquet",
            "prices/ver_0.parquet/part-00001.parquet",
        ]);
        let (resolution, ignored) =
            resolve_prefix(&keys, "prices/ver_0.parquet/", DEFAULT_EXTENSION);

        assert_eq!(
            resolution.key(),
            Some("prices/ver_0.parquet/part-00000.parquet")
        );
        assert_eq!(ignored, 2);
    }

    #[test]
    fn prefix_must_match_at_start() {
        let keys = listing(&["archive/prices/ver_0.parquet/part-0.parquet"]);
        let (resolution, _) = resolve_prefix(&keys, "prices/ver_0.parquet/", DEFAULT_EXTENSION);
        assert_eq!(resolution, Resolution::Unavailable);
    }
}
