//! Business rules over a single house

use crate::features::HouseFeatures;

/// A predicate flagging inputs outside the range the service accepts
pub trait BusinessRule: Send + Sync {
    /// Rule name reported on violation
    fn name(&self) -> &str;

    /// Returns `true` when `features` violates the rule
    fn apply(&self, features: &HouseFeatures) -> bool;
}

/// Violated when a house has more than `max_rooms` rooms
#[derive(Debug, Clone, Copy)]
pub struct RoomsRule {
    pub max_rooms: u32,
}

impl RoomsRule {
    pub fn new(max_rooms: u32) -> Self {
        Self { max_rooms }
    }
}

impl Default for RoomsRule {
    fn default() -> Self {
        Self::new(5)
    }
}

impl BusinessRule for RoomsRule {
    fn name(&self) -> &str {
        "rooms"
    }

    fn apply(&self, features: &HouseFeatures) -> bool {
        features.rooms > self.max_rooms
    }
}

/// Violated when the floor area exceeds `max_size` square meters
#[derive(Debug, Clone, Copy)]
pub struct SizeRule {
    pub max_size: f64,
}

impl SizeRule {
    pub fn new(max_size: f64) -> Self {
        Self { max_size }
    }
}

impl Default for SizeRule {
    fn default() -> Self {
        Self::new(200.0)
    }
}

impl BusinessRule for SizeRule {
    fn name(&self) -> &str {
        "size"
    }

    fn apply(&self, features: &HouseFeatures) -> bool {
        features.size > self.max_size
    }
}

/// Violated when a house has more than `max_bathrooms` bathrooms
#[derive(Debug, Clone, Copy)]
pub struct BathroomsRule {
    pub max_bathrooms: u32,
}

impl BathroomsRule {
    pub fn new(max_bathrooms: u32) -> Self {
        Self { max_bathrooms }
    }
}

impl Default for BathroomsRule {
    fn default() -> Self {
        Self::new(4)
    }
}

impl BusinessRule for BathroomsRule {
    fn name(&self) -> &str {
        "bathrooms"
    }

    fn apply(&self, features: &HouseFeatures) -> bool {
        features.bathrooms > self.max_bathrooms
    }
}
