use super::{PreferenceStorage, SavedVehicle, VehicleList};
use common::model::catalog::ProductCard;

const STORAGE_KEY: &str = "showroom.compare";

/// The compare view has one column per vehicle.
pub const MAX_COMPARED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutcome {
    Added,
    AlreadyPresent,
    Full,
}

/// Vehicles selected for side-by-side comparison, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareStore {
    list: VehicleList,
}

impl CompareStore {
    pub fn load(storage: &dyn PreferenceStorage) -> Self {
        let mut list = VehicleList::load(storage, STORAGE_KEY);
        // Data written by another build may hold more than fits on screen.
        while list.vehicles().len() > MAX_COMPARED {
            let Some(last) = list.vehicles().last().map(|v| v.vin.clone()) else {
                break;
            };
            list.remove(&last);
        }
        Self { list }
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

    pub fn is_full(&self) -> bool {
        self.list.vehicles().len() >= MAX_COMPARED
    }

    pub fn add(&mut self, vehicle: SavedVehicle) -> CompareOutcome {
        if self.contains(&vehicle.vin) {
            CompareOutcome::AlreadyPresent
        } else if self.is_full() {
            CompareOutcome::Full
        } else {
            self.list.push(vehicle);
            CompareOutcome::Added
        }
    }

    pub fn remove(&mut self, vin: &str) -> bool {
        self.list.remove(vin)
    }

    pub fn clear(&mut self) {
        self.list = VehicleList::default();
    }

    pub fn refresh(&mut self, cards: &[ProductCard]) {
        self.list.refresh(cards)
    }
}
