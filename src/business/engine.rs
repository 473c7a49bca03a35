//! Ordered collection of business rules

use crate::features::HouseFeatures;
use super::rules::{BathroomsRule, BusinessRule, RoomsRule, SizeRule};

/// Applies its rules in insertion order
///
/// Build once and share; applying rules never mutates the engine.
#[derive(Default)]
pub struct BusinessRuleEngine {
    rules: Vec<Box<dyn BusinessRule>>,
}

impl BusinessRuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the rooms, size and bathrooms rules at their default limits
    pub fn with_default_rules() -> Self {
        Self::new()
            .add_rule(RoomsRule::default())
            .add_rule(SizeRule::default())
            .add_rule(BathroomsRule::default())
    }

    pub fn add_rule(mut self, rule: impl BusinessRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// One violation flag per rule
    pub fn apply_rules(&self, features: &HouseFeatures) -> Vec<bool> {
        self.rules.iter().map(|rule| rule.apply(features)).collect()
    }

    /// Names of the violated rules
    pub fn violations(&self, features: &HouseFeatures) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.apply(features))
            .map(|rule| rule.name())
            .collect()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for BusinessRuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusinessRuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}
