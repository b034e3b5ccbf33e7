//! Built-in plant reference catalog.
//!
//! A curated set of well-known plants with localized names and care sheets,
//! embedded at compile time from `config/plant_catalog.json`. Searching is a
//! plain case-insensitive substring match; the catalog is small.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::preferences::Language;

const EMBEDDED_CATALOG: &str = include_str!("../config/plant_catalog.json");

/// One value per supported language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Localized<T> {
    pub en: T,
    pub hi: T,
    pub bn: T,
}

impl<T> Localized<T> {
    pub fn get(&self, lang: Language) -> &T {
        match lang {
            Language::En => &self.en,
            Language::Hi => &self.hi,
            Language::Bn => &self.bn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareSheet {
    pub watering: Localized<String>,
    pub light: Localized<String>,
    pub temperature: Localized<String>,
    pub humidity: Localized<String>,
    pub soil: Localized<String>,
    pub fertilizer: Localized<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    pub height: String,
    pub spread: String,
    pub bloom_time: String,
    pub hardiness: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPlant {
    pub id: String,
    pub scientific_name: String,
    pub common_names: Localized<Vec<String>>,
    pub family: String,
    pub category: String,
    pub description: Localized<String>,
    pub care: CareSheet,
    pub characteristics: Characteristics,
    pub facts: Localized<Vec<String>>,
    pub benefits: Localized<Vec<String>>,
    pub toxicity: Localized<String>,
    pub propagation: Localized<String>,
    pub common_problems: Localized<Vec<String>>,
    pub image_url: String,
    pub difficulty: Difficulty,
    pub air_purifying: bool,
    pub pet_friendly: bool,
    pub origin: String,
}

impl CatalogPlant {
    /// First common name in `lang`, or the scientific name.
    pub fn display_name(&self, lang: Language) -> &str {
        self.common_names
            .get(lang)
            .first()
            .map(String::as_str)
            .unwrap_or(self.scientific_name.as_str())
    }

    /// Matches a lowercased search term against scientific name, common
    /// names in `lang`, family and category.
    fn matches(&self, term: &str, lang: Language) -> bool {
        self.scientific_name.to_lowercase().contains(term)
            || self
                .common_names
                .get(lang)
                .iter()
                .any(|name| name.to_lowercase().contains(term))
            || self.family.to_lowercase().contains(term)
            || self.category.to_lowercase().contains(term)
    }
}

pub struct PlantCatalog {
    plants: Vec<CatalogPlant>,
}

impl PlantCatalog {
    /// The catalog shipped with the app.
    pub fn embedded() -> Result<Self, String> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let plants: Vec<CatalogPlant> =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse plant catalog: {}", e))?;
        info!("Loaded plant catalog with {} plants", plants.len());
        Ok(Self { plants })
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read catalog {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }

    pub fn all(&self) -> &[CatalogPlant] {
        &self.plants
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Plants matching `query`. A blank query matches nothing.
    pub fn search(&self, query: &str, lang: Language) -> Vec<&CatalogPlant> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        self.plants.iter().filter(|p| p.matches(&term, lang)).collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&CatalogPlant> {
        self.plants.iter().find(|p| p.id == id)
    }

    pub fn by_category(&self, category: &str) -> Vec<&CatalogPlant> {
        self.plants
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category.trim()))
            .collect()
    }

    pub fn by_difficulty(&self, difficulty: &str) -> Vec<&CatalogPlant> {
        self.plants
            .iter()
            .filter(|p| p.difficulty.as_str().eq_ignore_ascii_case(difficulty.trim()))
            .collect()
    }

    /// Search-page query: optional text plus category and difficulty
    /// filters, where `"all"` (or blank) disables a filter. Unlike
    /// [`search`](Self::search), a blank query returns the whole catalog.
    pub fn filter(
        &self,
        query: &str,
        category: &str,
        difficulty: &str,
        lang: Language,
    ) -> Vec<&CatalogPlant> {
        let term = query.trim().to_lowercase();
        let category = category.trim();
        let difficulty = difficulty.trim();

        self.plants
            .iter()
            .filter(|p| term.is_empty() || p.matches(&term, lang))
            .filter(|p| is_any(category) || p.category.eq_ignore_ascii_case(category))
            .filter(|p| is_any(difficulty) || p.difficulty.as_str().eq_ignore_ascii_case(difficulty))
            .collect()
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for plant in &self.plants {
            if !seen.contains(&plant.category.as_str()) {
                seen.push(&plant.category);
            }
        }
        seen
    }
}

fn is_any(filter: &str) -> bool {
    filter.is_empty() || filter.eq_ignore_ascii_case("all")
}
