use super::{PreferenceStorage, SavedVehicle, VehicleList};
use common::model::catalog::ProductCard;

const STORAGE_KEY: &str = "showroom.garage";

/// Vehicles the visitor saved for later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GarageStore {
    list: VehicleList,
}

impl GarageStore {
    pub fn load(storage: &dyn PreferenceStorage) -> Self {
        Self {
            list: VehicleList::load(storage, STORAGE_KEY),
        }
    }

    pub fn save(&self, storage: &dyn PreferenceStorage) -> Result<(), String> {
        self.list.save(storage, STORAGE_KEY)
    }

    pub fn vehicles(&self) -> &[SavedVehicle] {
        self.list.vehicles()
    }

    pub fn contains(&self, vin: &str) -> bool {
        self.list.contains(vin)
    }

    /// Returns `false` when the VIN is already saved.
    pub fn add(&mut self, vehicle: SavedVehicle) -> bool {
        self.list.push(vehicle)
    }

    pub fn remove(&mut self, vin: &str) -> bool {
        self.list.remove(vin)
    }

    pub fn refresh(&mut self, cards: &[ProductCard]) {
        self.list.refresh(cards)
    }
}
