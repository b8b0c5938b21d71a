//! Venue roster, name resolution and progress labels.
use serde::{Deserialize, Serialize};

const STATIC_VENUES: &str = include_str!("../assets/venues.json");

/// Ordered list of venues on the crawl.
///
/// The last name doubles as the overflow label shown once the player keeps
/// going past the planned route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueConfig {
    #[serde(default = "default_noun")]
    pub noun: String,
    pub names: Vec<String>,
    pub max_venues: u32,
}

fn default_noun() -> String {
    "Bar".to_string()
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl VenueConfig {
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            noun: default_noun(),
            names: vec![
                "City of London".to_string(),
                "Crafty Cat".to_string(),
                "Dubliners".to_string(),
                "Saddles".to_string(),
                "The Adventure Continues...".to_string(),
            ],
            max_venues: 4,
        }
    }

    /// Load the roster from the embedded asset, falling back to the defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str::<Self>(STATIC_VENUES)
            .ok()
            .filter(|cfg| !cfg.names.is_empty() && cfg.max_venues > 0)
            .unwrap_or_else(Self::default_config)
    }

    /// Resolve the display name for a 1-based venue index.
    ///
    /// Indices up to `N - 1` map to their own name; anything later maps to
    /// the final (overflow) name.
    #[must_use]
    pub fn name_for(&self, index: u32) -> &str {
        let index = usize::try_from(index.max(1)).unwrap_or(usize::MAX);
        let Some(last) = self.names.last() else {
            return "";
        };
        if index <= self.names.len() - 1 {
            self.names.get(index - 1).unwrap_or(last).as_str()
        } else {
            last.as_str()
        }
    }

    /// Fraction of the planned route covered, capped at 1.0.
    #[must_use]
    pub fn progress(&self, index: u32) -> f64 {
        if self.max_venues == 0 {
            return 1.0;
        }
        (f64::from(index) / f64::from(self.max_venues)).min(1.0)
    }

    #[must_use]
    pub fn indicator(&self, index: u32) -> String {
        if index <= self.max_venues {
            format!("{} {index} of {}", self.noun, self.max_venues)
        } else {
            format!("{} {index}", self.noun)
        }
    }

    #[must_use]
    pub fn next_label(&self, index: u32) -> String {
        if index == self.max_venues {
            "Continue Adventure →".to_string()
        } else {
            format!("Next {} →", self.noun)
        }
    }

    /// Toast shown after moving forward.
    #[must_use]
    pub fn arrival_message(&self, index: u32) -> String {
        let name = self.name_for(index);
        if index <= self.max_venues {
            format!("🎉 Welcome to {name}!")
        } else {
            format!("🎊 {name}")
        }
    }

    /// Toast shown after stepping back.
    #[must_use]
    pub fn return_message(&self, index: u32) -> String {
        format!("← Back to {}", self.name_for(index))
    }

    #[must_use]
    pub fn progress_for(&self, index: u32) -> VenueProgress {
        VenueProgress {
            index,
            name: self.name_for(index).to_string(),
            progress: self.progress(index),
            indicator: self.indicator(index),
            next_label: self.next_label(index),
            can_retreat: index > 1,
            beyond_route: index > self.max_venues,
        }
    }
}

/// Read model for the venue panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueProgress {
    pub index: u32,
    pub name: String,
    pub progress: f64,
    pub indicator: String,
    pub next_label: String,
    pub can_retreat: bool,
    pub beyond_route: bool,
}

impl VenueProgress {
    /// Progress bar width as a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=100
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_named() -> VenueConfig {
        VenueConfig {
            noun: "Bar".to_string(),
            names: vec![
                "One".to_string(),
                "Two".to_string(),
                "Three".to_string(),
                "Four".to_string(),
            ],
            max_venues: 4,
        }
    }

    #[test]
    fn static_roster_matches_default() {
        assert_eq!(VenueConfig::load_from_static(), VenueConfig::default_config());
    }

    #[test]
    fn names_resolve_by_position_then_overflow() {
        let cfg = VenueConfig::default_config();
        assert_eq!(cfg.name_for(1), "City of London");
        assert_eq!(cfg.name_for(4), "Saddles");
        assert_eq!(cfg.name_for(5), "The Adventure Continues...");
        assert_eq!(cfg.name_for(42), "The Adventure Continues...");
        assert_eq!(cfg.name_for(0), "City of London");
    }

    #[test]
    fn index_past_list_maps_to_final_name() {
        let cfg = four_named();
        assert_eq!(cfg.name_for(3), "Three");
        assert_eq!(cfg.name_for(4), "Four");
        assert_eq!(cfg.name_for(5), cfg.name_for(4));
    }

    #[test]
    fn empty_roster_has_blank_name() {
        let cfg = VenueConfig {
            names: Vec::new(),
            ..four_named()
        };
        assert_eq!(cfg.name_for(2), "");
    }

    #[test]
    fn progress_is_capped() {
        let cfg = VenueConfig::default_config();
        assert!((cfg.progress(1) - 0.25).abs() < f64::EPSILON);
        assert!((cfg.progress(4) - 1.0).abs() < f64::EPSILON);
        assert!((cfg.progress(9) - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.progress_for(2).percent(), 50);
    }

    #[test]
    fn labels_switch_at_route_end() {
        let cfg = VenueConfig::default_config();
        assert_eq!(cfg.indicator(2), "Bar 2 of 4");
        assert_eq!(cfg.indicator(6), "Bar 6");
        assert_eq!(cfg.next_label(3), "Next Bar →");
        assert_eq!(cfg.next_label(4), "Continue Adventure →");
        assert_eq!(cfg.next_label(5), "Next Bar →");
        assert_eq!(cfg.arrival_message(2), "🎉 Welcome to Crafty Cat!");
        assert_eq!(cfg.arrival_message(5), "🎊 The Adventure Continues...");
        assert_eq!(cfg.return_message(1), "← Back to City of London");
    }

    #[test]
    fn progress_view_flags_edges() {
        let cfg = VenueConfig::default_config();
        let first = cfg.progress_for(1);
        assert!(!first.can_retreat);
        assert!(!first.beyond_route);
        let beyond = cfg.progress_for(5);
        assert!(beyond.can_retreat);
        assert!(beyond.beyond_route);
    }
}
