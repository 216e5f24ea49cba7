//! Regimen lookup by dispensed drug combination

use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::models::RegimenCombination;

/// Label of a drug combination that matches no known regimen
pub const UNKNOWN_REGIMEN: &str = "Unknown";

/// Sorted, deduplicated set of drug ids
pub type DrugSet = SmallVec<[i64; 4]>;

/// Normalise drug ids into a [`DrugSet`]
#[must_use]
pub fn drug_set<I: IntoIterator<Item = i64>>(drug_ids: I) -> DrugSet {
    let mut set: DrugSet = drug_ids.into_iter().collect();
    set.sort_unstable();
    set.dedup();
    set
}

/// Drug combination → regimen name table
#[derive(Debug, Clone, Default)]
pub struct RegimenCatalog {
    regimens: FxHashMap<DrugSet, String>,
}

impl RegimenCatalog {
    /// Build the table. When two regimens share a combination the
    /// alphabetically first name is kept.
    #[must_use]
    pub fn new(combinations: &[RegimenCombination]) -> Self {
        let mut regimens: FxHashMap<DrugSet, String> = FxHashMap::default();
        for combination in combinations {
            let key = drug_set(combination.drug_ids.iter().copied());
            match regimens.get_mut(&key) {
                Some(existing) if combination.regimen_name < *existing => {
                    debug!(
                        "Regimen {} replaces {existing} for drug set {key:?}",
                        combination.regimen_name
                    );
                    existing.clone_from(&combination.regimen_name);
                }
                Some(_) => {}
                None => {
                    regimens.insert(key, combination.regimen_name.clone());
                }
            }
        }
        Self { regimens }
    }

    /// Regimen name of a drug combination, [`UNKNOWN_REGIMEN`] when unmatched
    #[must_use]
    pub fn name_for(&self, drugs: &DrugSet) -> &str {
        self.regimens
            .get(drugs)
            .map_or(UNKNOWN_REGIMEN, String::as_str)
    }

    /// Number of known combinations
    #[must_use]
    pub fn len(&self) -> usize {
        self.regimens.len()
    }

    /// Whether no combination is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regimens.is_empty()
    }
}
