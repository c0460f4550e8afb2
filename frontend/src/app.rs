//! Root component. Owns the garage and compare stores and switches between
//! the three pages.

use crate::components::catalog::CatalogComponent;
use crate::components::compare::CompareComponent;
use crate::components::garage::GarageComponent;
use crate::helpers::show_toast;
use crate::stores::{
    CompareOutcome, CompareStore, GarageStore, LocalStorage, SavedVehicle, MAX_COMPARED,
};
use common::model::catalog::ProductCard;
use gloo_console::error;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Catalog,
    Garage,
    Compare,
}

pub enum Msg {
    SetTab(Tab),
    Save(SavedVehicle),
    RemoveSaved(String),
    Compare(SavedVehicle),
    RemoveCompared(String),
    ClearCompare,
    CatalogLoaded(Vec<ProductCard>),
}

pub struct App {
    tab: Tab,
    garage: GarageStore,
    compare: CompareStore,
}

impl App {
    fn persist(&self) {
        if let Err(e) = self.garage.save(&LocalStorage) {
            error!(format!("Could not save the garage: {}", e));
        }
        if let Err(e) = self.compare.save(&LocalStorage) {
            error!(format!("Could not save the compare list: {}", e));
        }
    }

    fn saved_vins(&self) -> Vec<String> {
        self.garage.vehicles().iter().map(|v| v.vin.clone()).collect()
    }

    fn compared_vins(&self) -> Vec<String> {
        self.compare.vehicles().iter().map(|v| v.vin.clone()).collect()
    }

    fn tab_button(&self, ctx: &Context<Self>, tab: Tab, label: String) -> Html {
        html! {
            <button
                class={classes!("tab", (self.tab == tab).then_some("active"))}
                onclick={ctx.link().callback(move |_| Msg::SetTab(tab))}
            >
                { label }
            </button>
        }
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            tab: Tab::Catalog,
            garage: GarageStore::load(&LocalStorage),
            compare: CompareStore::load(&LocalStorage),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetTab(tab) => {
                if self.tab == tab {
                    return false;
                }
                self.tab = tab;
                return true;
            }
            Msg::Save(vehicle) => {
                if !self.garage.add(vehicle) {
                    return false;
                }
            }
            Msg::RemoveSaved(vin) => {
                if !self.garage.remove(&vin) {
                    return false;
                }
            }
            Msg::Compare(vehicle) => match self.compare.add(vehicle) {
                CompareOutcome::Added => show_toast("Added to comparison"),
                CompareOutcome::AlreadyPresent => return false,
                CompareOutcome::Full => {
                    show_toast(&format!("You can compare up to {} vehicles", MAX_COMPARED));
                    return false;
                }
            },
            Msg::RemoveCompared(vin) => {
                if !self.compare.remove(&vin) {
                    return false;
                }
            }
            Msg::ClearCompare => self.compare.clear(),
            Msg::CatalogLoaded(cards) => {
                self.garage.refresh(&cards);
                self.compare.refresh(&cards);
            }
        }
        self.persist();
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let page = match self.tab {
            Tab::Catalog => html! {
                <CatalogComponent
                    saved_vins={self.saved_vins()}
                    compared_vins={self.compared_vins()}
                    compare_full={self.compare.is_full()}
                    on_save={link.callback(Msg::Save)}
                    on_compare={link.callback(Msg::Compare)}
                    on_cards={link.callback(Msg::CatalogLoaded)}
                />
            },
            Tab::Garage => html! {
                <GarageComponent
                    vehicles={self.garage.vehicles().to_vec()}
                    compared_vins={self.compared_vins()}
                    compare_full={self.compare.is_full()}
                    on_remove={link.callback(Msg::RemoveSaved)}
                    on_compare={link.callback(Msg::Compare)}
                />
            },
            Tab::Compare => html! {
                <CompareComponent
                    vehicles={self.compare.vehicles().to_vec()}
                    on_remove={link.callback(Msg::RemoveCompared)}
                    on_clear={link.callback(|_| Msg::ClearCompare)}
                />
            },
        };

        html! {
            <div class="app">
                <nav class="tabs">
                    { self.tab_button(ctx, Tab::Catalog, "Catalog".to_string()) }
                    { self.tab_button(ctx, Tab::Garage, format!("Garage ({})", self.garage.vehicles().len())) }
                    { self.tab_button(ctx, Tab::Compare, format!("Compare ({}/{})", self.compare.vehicles().len(), MAX_COMPARED)) }
                </nav>
                <main>{ page }</main>
            </div>
        }
    }
}
