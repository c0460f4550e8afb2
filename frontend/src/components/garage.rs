//! Saved vehicles page.

use crate::helpers::format_price;
use crate::stores::SavedVehicle;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct GarageProps {
    pub vehicles: Vec<SavedVehicle>,
    #[prop_or_default]
    pub compared_vins: Vec<String>,
    #[prop_or_default]
    pub compare_full: bool,
    pub on_remove: Callback<String>,
    pub on_compare: Callback<SavedVehicle>,
}

pub enum Msg {
    Remove(String),
    Compare(usize),
}

pub struct GarageComponent;

impl Component for GarageComponent {
    type Message = Msg;
    type Properties = GarageProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let props = ctx.props();
        match msg {
            Msg::Remove(vin) => props.on_remove.emit(vin),
            Msg::Compare(index) => {
                if let Some(vehicle) = props.vehicles.get(index) {
                    props.on_compare.emit(vehicle.clone());
                }
            }
        }
        false
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        if props.vehicles.is_empty() {
            return html! {
                <div class="garage">
                    <p class="catalog-status">{"Your garage is empty. Save vehicles from the catalog to find them here."}</p>
                </div>
            };
        }

        let link = ctx.link();
        html! {
            <div class="garage">
                { for props.vehicles.iter().enumerate().map(|(index, vehicle)| {
                    let vin = vehicle.vin.clone();
                    let compared = props.compared_vins.contains(&vehicle.vin);
                    html! {
                        <div class={classes!("garage-row", (!vehicle.available).then_some("unavailable"))}>
                            {
                                match &vehicle.photo {
                                    Some(url) => html! { <img src={url.clone()} alt={vehicle.model_code.clone()} /> },
                                    None => html! { <div class="photo-placeholder" /> },
                                }
                            }
                            <div class="garage-details">
                                <h3>{ &vehicle.model_code }</h3>
                                <p>{ format!("Color {}", vehicle.color_code) }</p>
                                <p class="price">{ format_price(vehicle.price, &vehicle.currency) }</p>
                                if !vehicle.available {
                                    <p class="status">{"No longer available"}</p>
                                }
                            </div>
                            <div class="card-actions">
                                <button
                                    disabled={compared || props.compare_full || !vehicle.available}
                                    onclick={link.callback(move |_| Msg::Compare(index))}
                                >
                                    {"Compare"}
                                </button>
                                <button onclick={link.callback(move |_| Msg::Remove(vin.clone()))}>
                                    {"Remove"}
                                </button>
                            </div>
                        </div>
                    }
                }) }
            </div>
        }
    }
}
