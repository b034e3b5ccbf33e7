//! Page routing for the landing app.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Landing,
    TryForFree,
    Demo,
    LearnMore,
    Reviews,
    HowItWorks,
    Features,
    FeatureTryout,
    Search,
    PlantDetail,
    SignIn,
}

impl Page {
    pub const ALL: [Page; 11] = [
        Page::Landing,
        Page::TryForFree,
        Page::Demo,
        Page::LearnMore,
        Page::Reviews,
        Page::HowItWorks,
        Page::Features,
        Page::FeatureTryout,
        Page::Search,
        Page::PlantDetail,
        Page::SignIn,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Landing => "landing",
            Page::TryForFree => "try-for-free",
            Page::Demo => "demo",
            Page::LearnMore => "learn-more",
            Page::Reviews => "reviews",
            Page::HowItWorks => "how-it-works",
            Page::Features => "features",
            Page::FeatureTryout => "feature-tryout",
            Page::Search => "search",
            Page::PlantDetail => "plant-detail",
            Page::SignIn => "sign-in",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        Page::ALL.into_iter().find(|p| p.slug() == slug)
    }

    /// Where the page's back button leads.
    pub fn parent(&self) -> Page {
        match self {
            Page::FeatureTryout => Page::Features,
            Page::PlantDetail => Page::Search,
            _ => Page::Landing,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Current page, selected catalog plant and the pages visited so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigator {
    current: Page,
    selected_plant: Option<String>,
    history: Vec<Page>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn selected_plant(&self) -> Option<&str> {
        self.selected_plant.as_deref()
    }

    /// Pages left behind, oldest first.
    pub fn history(&self) -> &[Page] {
        &self.history
    }

    /// Go to `page`. A plant id, when given, becomes the selected plant;
    /// `PlantDetail` cannot be opened without one.
    pub fn navigate_to(&mut self, page: Page, plant_id: Option<&str>) -> Result<(), String> {
        let plant_id = plant_id.map(str::trim).filter(|id| !id.is_empty());
        if page == Page::PlantDetail && plant_id.is_none() {
            return Err("Plant detail page requires a plant id".to_string());
        }

        if let Some(id) = plant_id {
            self.selected_plant = Some(id.to_string());
        }
        if page != self.current {
            self.history.push(self.current);
        }
        debug!("Navigate {} -> {}", self.current, page);
        self.current = page;
        Ok(())
    }

    /// Follow the current page's back button and return the new page.
    pub fn back(&mut self) -> Page {
        let parent = self.current.parent();
        if parent != self.current {
            self.history.push(self.current);
            debug!("Back {} -> {}", self.current, parent);
            self.current = parent;
        }
        parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_slug(page.slug()), Some(page));
        }
        assert_eq!(Page::from_slug("nowhere"), None);
        assert_eq!(
            serde_json::to_string(&Page::FeatureTryout).unwrap(),
            "\"feature-tryout\""
        );
    }

    #[test]
    fn test_starts_on_landing() {
        let nav = Navigator::new();
        assert_eq!(nav.current(), Page::Landing);
        assert_eq!(nav.selected_plant(), None);
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_plant_detail_requires_id() {
        let mut nav = Navigator::new();
        assert!(nav.navigate_to(Page::PlantDetail, None).is_err());
        assert!(nav.navigate_to(Page::PlantDetail, Some("  ")).is_err());
        assert_eq!(nav.current(), Page::Landing);

        nav.navigate_to(Page::PlantDetail, Some("pothos")).unwrap();
        assert_eq!(nav.current(), Page::PlantDetail);
        assert_eq!(nav.selected_plant(), Some("pothos"));
    }

    #[test]
    fn test_back_goes_to_parent() {
        let mut nav = Navigator::new();
        nav.navigate_to(Page::Search, None).unwrap();
        nav.navigate_to(Page::PlantDetail, Some("snake-plant")).unwrap();
        assert_eq!(nav.back(), Page::Search);
        assert_eq!(nav.back(), Page::Landing);
        assert_eq!(nav.back(), Page::Landing);

        nav.navigate_to(Page::FeatureTryout, None).unwrap();
        assert_eq!(nav.back(), Page::Features);
        assert_eq!(nav.back(), Page::Landing);
    }

    #[test]
    fn test_history_and_selection_survive_other_pages() {
        let mut nav = Navigator::new();
        nav.navigate_to(Page::Search, None).unwrap();
        nav.navigate_to(Page::PlantDetail, Some("pothos")).unwrap();
        nav.navigate_to(Page::Reviews, None).unwrap();

        assert_eq!(nav.selected_plant(), Some("pothos"));
        assert_eq!(
            nav.history(),
            &[Page::Landing, Page::Search, Page::PlantDetail]
        );
    }
}
