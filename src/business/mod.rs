//! Business rules checked before a prediction is made

mod engine;
mod rules;

pub use engine::BusinessRuleEngine;
pub use rules::{BathroomsRule, BusinessRule, RoomsRule, SizeRule};
