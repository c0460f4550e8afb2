//! Client-side vehicle lists: the garage (saved vehicles) and the compare
//! set. Both are plain state objects owned by the root component. They are
//! read from storage once with `load` and written back with `save` after
//! each change; nothing else touches storage.

mod compare;
mod garage;
mod storage;

pub use compare::{CompareOutcome, CompareStore, MAX_COMPARED};
pub use garage::GarageStore;
#[cfg(test)]
pub use storage::MemoryStorage;
pub use storage::{LocalStorage, PreferenceStorage};

use common::model::catalog::ProductCard;
use serde::{Deserialize, Serialize};

/// Snapshot of a catalog card kept on the client. Built only from public
/// catalog fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedVehicle {
    pub vin: String,
    pub signature: String,
    pub model_code: String,
    pub color_code: String,
    pub price: Option<f64>,
    pub currency: String,
    pub photo: Option<String>,
    /// Cleared by `refresh` when the vehicle no longer shows in the catalog.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl From<&ProductCard> for SavedVehicle {
    fn from(card: &ProductCard) -> Self {
        let unit = &card.representative;
        Self {
            vin: unit.vin.clone(),
            signature: card.signature.clone(),
            model_code: unit.model_code.clone(),
            color_code: unit.color_code.clone(),
            price: card.price,
            currency: unit.currency.clone(),
            photo: card.photo.clone(),
            available: true,
        }
    }
}

/// Ordered list of vehicles, unique by VIN, persisted as JSON under one key.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct VehicleList {
    vehicles: Vec<SavedVehicle>,
}

impl VehicleList {
    /// Missing or unreadable data loads as an empty list.
    pub(crate) fn load(storage: &dyn PreferenceStorage, key: &str) -> Self {
        let vehicles = storage
            .read(key)
            .and_then(|raw| serde_json::from_str::<Vec<SavedVehicle>>(&raw).ok())
            .unwrap_or_default();
        Self { vehicles }
    }

    pub(crate) fn save(&self, storage: &dyn PreferenceStorage, key: &str) -> Result<(), String> {
        let raw = serde_json::to_string(&self.vehicles).map_err(|e| e.to_string())?;
        storage.write(key, &raw)
    }

    pub(crate) fn vehicles(&self) -> &[SavedVehicle] {
        &self.vehicles
    }

    pub(crate) fn contains(&self, vin: &str) -> bool {
        self.vehicles.iter().any(|v| v.vin == vin)
    }

    pub(crate) fn push(&mut self, vehicle: SavedVehicle) -> bool {
        if self.contains(&vehicle.vin) {
            return false;
        }
        self.vehicles.push(vehicle);
        true
    }

    pub(crate) fn remove(&mut self, vin: &str) -> bool {
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.vin != vin);
        self.vehicles.len() != before
    }

    /// Updates price and photo from the current catalog. A vehicle whose VIN
    /// is in no card is kept but flagged unavailable.
    pub(crate) fn refresh(&mut self, cards: &[ProductCard]) {
        for vehicle in &mut self.vehicles {
            match cards.iter().find(|c| c.vins.contains(&vehicle.vin)) {
                Some(card) => {
                    vehicle.price = card.price;
                    vehicle.photo = card.photo.clone().or(vehicle.photo.take());
                    vehicle.available = card.available_count > 0;
                }
                None => vehicle.available = false,
            }
        }
    }
}
