//! Message handling for the catalog page.

use crate::helpers::show_toast;
use crate::stores::SavedVehicle;
use gloo_console::error;
use yew::prelude::*;

use super::fetch_units;
use super::messages::Msg;
use super::state::CatalogComponent;

pub fn update(component: &mut CatalogComponent, ctx: &Context<CatalogComponent>, msg: Msg) -> bool {
    match msg {
        Msg::Reload => {
            component.loading = true;
            component.error = None;
            fetch_units(ctx.link().clone());
            true
        }
        Msg::UnitsLoaded(units) => {
            component.units = units;
            component.loading = false;
            component.rebuild_cards();
            ctx.props().on_cards.emit(component.cards.clone());
            true
        }
        Msg::LoadFailed(message) => {
            error!(format!("Catalog load failed: {}", message));
            component.loading = false;
            component.error = Some(message);
            true
        }
        Msg::SetSort(sort) => {
            if component.sort == sort {
                return false;
            }
            component.sort = sort;
            component.rebuild_cards();
            true
        }
        Msg::SetModelFilter(filter) => {
            component.model_filter = filter;
            true
        }
        Msg::Save(index) => {
            if let Some(card) = component.visible_cards().get(index) {
                ctx.props().on_save.emit(SavedVehicle::from(*card));
                show_toast("Saved to your garage");
            }
            false
        }
        Msg::Compare(index) => {
            if let Some(card) = component.visible_cards().get(index) {
                ctx.props().on_compare.emit(SavedVehicle::from(*card));
            }
            false
        }
    }
}
