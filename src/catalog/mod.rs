//! Concept catalog
//!
//! Domain vocabulary (specimen types, the viral load concept, maternal status
//! questions, ...) is resolved once per run from name→id rows into a table
//! keyed by [`ConceptCategory`]. Evaluation code only ever asks the catalog
//! about ids and categories; it never compares concept names per patient.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{CohortError, Result};
use crate::models::ConceptId;

/// A concept name row as stored in the clinical data store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptName {
    /// Concept identifier
    pub concept_id: ConceptId,
    /// One of the concept's names
    pub name: String,
}

impl ConceptName {
    /// Create a new concept name row
    pub fn new(concept_id: ConceptId, name: impl Into<String>) -> Self {
        Self {
            concept_id,
            name: name.into(),
        }
    }
}

/// Categories of concepts the reports depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConceptCategory {
    /// Specimen types of a viral load order
    VlSpecimen,
    /// The viral load measurement
    HivViralLoad,
    /// Reason-for-test question attached to an order
    ReasonForTest,
    /// Pregnancy status question
    Pregnant,
    /// Breastfeeding status question
    Breastfeeding,
    /// The "Yes" answer
    Yes,
    /// Body weight
    Weight,
    /// Type-of-patient question
    TypeOfPatient,
    /// "External consultation" answer to the type-of-patient question
    ExternalConsultation,
}

impl ConceptCategory {
    /// Every category, in a fixed order
    pub const ALL: [Self; 9] = [
        Self::VlSpecimen,
        Self::HivViralLoad,
        Self::ReasonForTest,
        Self::Pregnant,
        Self::Breastfeeding,
        Self::Yes,
        Self::Weight,
        Self::TypeOfPatient,
        Self::ExternalConsultation,
    ];

    /// Concept names that belong to this category
    #[must_use]
    pub const fn names(self) -> &'static [&'static str] {
        match self {
            Self::VlSpecimen => &[
                "Blood",
                "DBS (Free drop to DBS card)",
                "DBS (Using capillary tube)",
                "Plasma",
                "50:50 Normal Plasma",
            ],
            Self::HivViralLoad => &["HIV viral load"],
            Self::ReasonForTest => &["Reason for test"],
            Self::Pregnant => &["Is patient pregnant?", "patient pregnant"],
            Self::Breastfeeding => &["Breast feeding?", "Breast feeding", "Breastfeeding"],
            Self::Yes => &["Yes"],
            Self::Weight => &["Weight (kg)"],
            Self::TypeOfPatient => &["Type of patient"],
            Self::ExternalConsultation => &["External consultation"],
        }
    }

    /// Whether a report cannot be built without this category
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(
            self,
            Self::VlSpecimen | Self::HivViralLoad | Self::Pregnant | Self::Breastfeeding | Self::Yes
        )
    }
}

/// Read-only concept lookup table for one report run
#[derive(Debug, Clone, Default)]
pub struct ConceptCatalog {
    categories: FxHashMap<ConceptId, ConceptCategory>,
    ids: FxHashMap<ConceptCategory, Vec<ConceptId>>,
    names: FxHashMap<ConceptId, String>,
}

impl ConceptCatalog {
    /// Build the catalog from concept name rows.
    ///
    /// Names match case-insensitively. Fails when a required category has no
    /// concept at all.
    pub fn build(rows: &[ConceptName]) -> Result<Self> {
        let lookup: FxHashMap<String, ConceptCategory> = ConceptCategory::ALL
            .iter()
            .flat_map(|category| {
                category
                    .names()
                    .iter()
                    .map(move |name| (name.to_lowercase(), *category))
            })
            .collect();

        let mut catalog = Self::default();
        let mut seen: FxHashSet<(ConceptCategory, ConceptId)> = FxHashSet::default();

        for row in rows {
            catalog
                .names
                .entry(row.concept_id)
                .or_insert_with(|| row.name.clone());

            let Some(category) = lookup.get(&row.name.trim().to_lowercase()).copied() else {
                continue;
            };

            match catalog.categories.get(&row.concept_id) {
                Some(existing) if *existing != category => {
                    log::warn!(
                        "Concept {} named '{}' already resolved as {:?}, ignoring {:?}",
                        row.concept_id,
                        row.name,
                        existing,
                        category
                    );
                    continue;
                }
                _ => {
                    catalog.categories.insert(row.concept_id, category);
                }
            }

            if seen.insert((category, row.concept_id)) {
                catalog.ids.entry(category).or_default().push(row.concept_id);
            }
        }

        for ids in catalog.ids.values_mut() {
            ids.sort_unstable();
        }

        let missing: Vec<String> = ConceptCategory::ALL
            .iter()
            .filter(|category| category.is_required() && catalog.ids(**category).is_empty())
            .map(|category| format!("{category:?}"))
            .collect();
        if !missing.is_empty() {
            return Err(CohortError::configuration(format!(
                "concept catalog is missing required categories: {}",
                missing.join(", ")
            )));
        }

        log::debug!(
            "Concept catalog resolved {} concepts into {} categories",
            catalog.categories.len(),
            catalog.ids.len()
        );
        Ok(catalog)
    }

    /// Category of a concept, if tracked
    #[must_use]
    pub fn category_of(&self, concept_id: ConceptId) -> Option<ConceptCategory> {
        self.categories.get(&concept_id).copied()
    }

    /// Whether the concept belongs to the category
    #[must_use]
    pub fn is(&self, concept_id: ConceptId, category: ConceptCategory) -> bool {
        self.category_of(concept_id) == Some(category)
    }

    /// All concept ids of a category, sorted ascending
    #[must_use]
    pub fn ids(&self, category: ConceptCategory) -> &[ConceptId] {
        self.ids.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Display name of any concept that appeared in the source rows
    #[must_use]
    pub fn name_of(&self, concept_id: ConceptId) -> Option<&str> {
        self.names.get(&concept_id).map(String::as_str)
    }
}
