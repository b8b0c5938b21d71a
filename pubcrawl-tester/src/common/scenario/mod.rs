pub mod catalog;

use crate::logic::SimulationPlan;
use catalog::{catalog_scenarios, find_catalog_scenario};

/// Key of the draw distribution analysis, which runs outside the catalog.
pub const DISTRIBUTION_KEY: &str = "distribution";

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = name.trim().to_lowercase();
    find_catalog_scenario(&key).map(|scenario| scenario.into_test_scenario())
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    let mut listed: Vec<_> = catalog_scenarios()
        .iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect();
    listed.push((DISTRIBUTION_KEY, "Challenge Draw Distribution"));
    listed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_key_resolves() {
        for (key, name) in list_scenarios() {
            if key == DISTRIBUTION_KEY {
                assert!(get_scenario(key).is_none());
                continue;
            }
            let scenario = get_scenario(key).unwrap_or_else(|| panic!("missing {key}"));
            assert_eq!(scenario.name, name);
            assert!(!scenario.plan.steps.is_empty());
            assert!(!scenario.plan.expectations.is_empty());
        }
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert!(get_scenario(" SMOKE ").is_some());
        assert!(get_scenario("nope").is_none());
    }
}
