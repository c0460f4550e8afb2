//! Catalog page: sort and model filter on top, one card per product below.

use crate::helpers::format_price;
use common::model::catalog::{CardSort, ProductCard};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::CatalogComponent;

const SORT_OPTIONS: [(CardSort, &str, &str); 4] = [
    (CardSort::Recommended, "recommended", "Recommended"),
    (CardSort::PriceAsc, "price_asc", "Price: low to high"),
    (CardSort::PriceDesc, "price_desc", "Price: high to low"),
    (CardSort::Newest, "newest", "Newest first"),
];

fn sort_from_value(value: &str) -> CardSort {
    SORT_OPTIONS
        .iter()
        .find(|(_, v, _)| *v == value)
        .map(|(sort, _, _)| *sort)
        .unwrap_or_default()
}

pub fn view(component: &CatalogComponent, ctx: &Context<CatalogComponent>) -> Html {
    let link = ctx.link();
    html! {
        <div class="catalog">
            { build_toolbar(component, link) }
            {
                if component.loading {
                    html! { <p class="catalog-status">{"Loading vehicles..."}</p> }
                } else if let Some(message) = &component.error {
                    html! {
                        <div class="catalog-status error">
                            <p>{ format!("The catalog could not be loaded: {}", message) }</p>
                            <button onclick={link.callback(|_| Msg::Reload)}>{"Retry"}</button>
                        </div>
                    }
                } else {
                    build_grid(component, ctx)
                }
            }
        </div>
    }
}

fn build_toolbar(component: &CatalogComponent, link: &Scope<CatalogComponent>) -> Html {
    let on_sort = link.callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::SetSort(sort_from_value(&select.value()))
    });
    let on_filter = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::SetModelFilter(input.value())
    });

    html! {
        <div class="catalog-toolbar">
            <input
                type="search"
                placeholder="Model code"
                value={component.model_filter.clone()}
                oninput={on_filter}
            />
            <select onchange={on_sort}>
                { for SORT_OPTIONS.iter().map(|(sort, value, label)| html! {
                    <option value={*value} selected={*sort == component.sort}>{ *label }</option>
                }) }
            </select>
        </div>
    }
}

fn build_grid(component: &CatalogComponent, ctx: &Context<CatalogComponent>) -> Html {
    let cards = component.visible_cards();
    if cards.is_empty() {
        return html! { <p class="catalog-status">{"No vehicles match."}</p> };
    }
    html! {
        <div class="card-grid">
            { for cards.iter().enumerate().map(|(index, card)| build_card(index, card, ctx)) }
        </div>
    }
}

fn build_card(index: usize, card: &ProductCard, ctx: &Context<CatalogComponent>) -> Html {
    let props = ctx.props();
    let link = ctx.link();
    let unit = &card.representative;
    let saved = props.saved_vins.contains(&unit.vin);
    let compared = props.compared_vins.contains(&unit.vin);

    html! {
        <div class="product-card">
            {
                match &card.photo {
                    Some(url) => html! { <img src={url.clone()} alt={unit.model_code.clone()} /> },
                    None => html! { <div class="photo-placeholder">{"No photo yet"}</div> },
                }
            }
            <h3>{ &unit.model_code }</h3>
            <p class="codes">{ format!("Color {} / Upholstery {}", unit.color_code, unit.upholstery_code) }</p>
            <p class="status">{ &card.display_status }</p>
            <p class="count">{ format!("{} available", card.available_count) }</p>
            <p class="price">{ format_price(card.price, &unit.currency) }</p>
            { for card.bulletins.iter().map(|b| html! { <p class="bulletin">{ &b.title }</p> }) }
            <div class="card-actions">
                <button disabled={saved} onclick={link.callback(move |_| Msg::Save(index))}>
                    { if saved { "Saved" } else { "Save" } }
                </button>
                <button
                    disabled={compared || props.compare_full}
                    onclick={link.callback(move |_| Msg::Compare(index))}
                >
                    { if compared { "Comparing" } else { "Compare" } }
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_values() {
        assert_eq!(sort_from_value("price_desc"), CardSort::PriceDesc);
        assert_eq!(sort_from_value("newest"), CardSort::Newest);
        assert_eq!(sort_from_value("bogus"), CardSort::Recommended);
    }
}
