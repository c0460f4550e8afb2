//! Side-by-side comparison of up to three vehicles.
//!
//! Each column is filled from `/api/units/{vin}`, which returns the unit with
//! its codes resolved through the dictionary. Vehicles whose details cannot
//! be fetched (sold or hidden since they were added) show the saved snapshot
//! only.

use crate::helpers::format_price;
use crate::stores::SavedVehicle;
use common::model::dictionary::EnrichedUnit;
use gloo_console::warn;
use gloo_net::http::Request;
use std::collections::{HashMap, HashSet};
use yew::html::Scope;
use yew::platform::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CompareProps {
    pub vehicles: Vec<SavedVehicle>,
    pub on_remove: Callback<String>,
    pub on_clear: Callback<()>,
}

pub enum Msg {
    DetailsLoaded(String, Box<EnrichedUnit>),
    DetailsFailed(String),
    Remove(String),
    Clear,
}

#[derive(Default)]
pub struct CompareComponent {
    details: HashMap<String, EnrichedUnit>,
    pending: HashSet<String>,
    failed: HashSet<String>,
}

impl CompareComponent {
    fn fetch_missing(&mut self, ctx: &Context<Self>) {
        for vehicle in &ctx.props().vehicles {
            let vin = &vehicle.vin;
            if self.details.contains_key(vin) || self.pending.contains(vin) || self.failed.contains(vin) {
                continue;
            }
            self.pending.insert(vin.clone());
            fetch_details(ctx.link().clone(), vin.clone());
        }
    }
}

fn fetch_details(link: Scope<CompareComponent>, vin: String) {
    spawn_local(async move {
        let url = format!("/api/units/{}", vin);
        match Request::get(&url).send().await {
            Ok(resp) if resp.ok() => match resp.json::<EnrichedUnit>().await {
                Ok(unit) => link.send_message(Msg::DetailsLoaded(vin, Box::new(unit))),
                Err(e) => {
                    warn!(format!("Unit {} could not be decoded: {}", vin, e));
                    link.send_message(Msg::DetailsFailed(vin));
                }
            },
            Ok(resp) => {
                warn!(format!("Unit {} returned HTTP {}", vin, resp.status()));
                link.send_message(Msg::DetailsFailed(vin));
            }
            Err(e) => {
                warn!(format!("Unit {} request failed: {}", vin, e));
                link.send_message(Msg::DetailsFailed(vin));
            }
        }
    });
}

type Column<'a> = (&'a SavedVehicle, Option<&'a EnrichedUnit>);

fn text(value: impl Into<String>) -> Html {
    let value: String = value.into();
    html! { <>{ value }</> }
}

fn compare_row(
    label: &str,
    columns: &[Column<'_>],
    cell: impl Fn(&SavedVehicle, Option<&EnrichedUnit>) -> Html,
) -> Html {
    html! {
        <tr>
            <th>{ label }</th>
            { for columns.iter().map(|(v, d)| html! { <td>{ cell(*v, *d) }</td> }) }
        </tr>
    }
}

impl Component for CompareComponent {
    type Message = Msg;
    type Properties = CompareProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut component = Self::default();
        component.fetch_missing(ctx);
        component
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        let vins: HashSet<&String> = ctx.props().vehicles.iter().map(|v| &v.vin).collect();
        self.details.retain(|vin, _| vins.contains(vin));
        self.failed.retain(|vin| vins.contains(vin));
        self.fetch_missing(ctx);
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::DetailsLoaded(vin, unit) => {
                self.pending.remove(&vin);
                self.details.insert(vin, *unit);
                true
            }
            Msg::DetailsFailed(vin) => {
                self.pending.remove(&vin);
                self.failed.insert(vin);
                true
            }
            Msg::Remove(vin) => {
                ctx.props().on_remove.emit(vin);
                false
            }
            Msg::Clear => {
                ctx.props().on_clear.emit(());
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let link = ctx.link();
        if props.vehicles.is_empty() {
            return html! {
                <div class="compare">
                    <p class="catalog-status">{"Pick up to three vehicles with Compare to see them side by side."}</p>
                </div>
            };
        }

        let columns: Vec<Column<'_>> = props
            .vehicles
            .iter()
            .map(|v| (v, self.details.get(&v.vin)))
            .collect();

        html! {
            <div class="compare">
                <table class="compare-table">
                    <thead>
                        <tr>
                            <th />
                            { for columns.iter().map(|(v, _)| {
                                let vin = v.vin.clone();
                                html! {
                                    <th>
                                        {
                                            match &v.photo {
                                                Some(url) => html! { <img src={url.clone()} alt={v.model_code.clone()} /> },
                                                None => html! {},
                                            }
                                        }
                                        <button onclick={link.callback(move |_| Msg::Remove(vin.clone()))}>{"Remove"}</button>
                                    </th>
                                }
                            }) }
                        </tr>
                    </thead>
                    <tbody>
                        { compare_row("Model", &columns, |v, d| {
                            text(d.map(|d| d.model_name.clone()).unwrap_or_else(|| v.model_code.clone()))
                        }) }
                        { compare_row("Color", &columns, |v, d| {
                            text(d.map(|d| d.color_name.clone()).unwrap_or_else(|| v.color_code.clone()))
                        }) }
                        { compare_row("Upholstery", &columns, |_, d| {
                            text(d.map(|d| d.upholstery_name.clone()).unwrap_or_default())
                        }) }
                        { compare_row("Year", &columns, |_, d| {
                            text(d.and_then(|d| d.unit.production_year).map(|y| y.to_string()).unwrap_or_default())
                        }) }
                        { compare_row("Price", &columns, |v, d| {
                            text(format_price(d.map(|d| d.price).unwrap_or(v.price), &v.currency))
                        }) }
                        { compare_row("Options", &columns, |_, d| match d {
                            Some(d) => html! {
                                <ul>{ for d.options.iter().map(|o| html! { <li>{ &o.name }</li> }) }</ul>
                            },
                            None => html! {},
                        }) }
                        { compare_row("Service", &columns, |_, d| match d {
                            Some(d) => html! {
                                <ul>{ for d.service_offers.iter().map(|s| html! {
                                    <li>{ format!("{}: {}", s.name, format_price(Some(s.price), &s.currency)) }</li>
                                }) }</ul>
                            },
                            None => html! {},
                        }) }
                        { compare_row("Availability", &columns, |v, d| {
                            text(if d.is_some() && v.available { "In stock" } else { "No longer available" })
                        }) }
                    </tbody>
                </table>
                <button class="compare-clear" onclick={link.callback(|_| Msg::Clear)}>{"Clear comparison"}</button>
            </div>
        }
    }
}
