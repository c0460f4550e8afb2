use crate::stores::SavedVehicle;
use common::model::catalog::ProductCard;
use yew::prelude::*;

/// The catalog owns no stored state of its own: which vehicles are saved or
/// compared comes from the root component, and changes go back through the
/// callbacks.
#[derive(Properties, PartialEq, Clone)]
pub struct CatalogProps {
    #[prop_or_default]
    pub saved_vins: Vec<String>,
    #[prop_or_default]
    pub compared_vins: Vec<String>,
    #[prop_or_default]
    pub compare_full: bool,
    pub on_save: Callback<SavedVehicle>,
    pub on_compare: Callback<SavedVehicle>,
    /// Emitted after every successful load so the stores can refresh.
    pub on_cards: Callback<Vec<ProductCard>>,
}
