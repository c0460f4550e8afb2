//! Public catalog page.
//!
//! Fetches the visible units once from `/api/units` and clusters them in the
//! browser with `common::grouping`, so sorting and filtering never go back
//! to the server.

use common::model::stock::StockUnit;
use gloo_net::http::Request;
use yew::html::Scope;
use yew::platform::spawn_local;
use yew::prelude::*;

mod messages;
mod props;
mod state;
mod update;
mod view;

use messages::Msg;
use props::CatalogProps;
pub use state::CatalogComponent;

impl Component for CatalogComponent {
    type Message = Msg;
    type Properties = CatalogProps;

    fn create(ctx: &Context<Self>) -> Self {
        fetch_units(ctx.link().clone());
        CatalogComponent::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }
}

pub(crate) fn fetch_units(link: Scope<CatalogComponent>) {
    spawn_local(async move {
        let response = Request::get("/api/units").send().await;
        match response {
            Ok(resp) if resp.ok() => match resp.json::<Vec<StockUnit>>().await {
                Ok(units) => link.send_message(Msg::UnitsLoaded(units)),
                Err(e) => link.send_message(Msg::LoadFailed(e.to_string())),
            },
            Ok(resp) => link.send_message(Msg::LoadFailed(format!("HTTP {}", resp.status()))),
            Err(e) => link.send_message(Msg::LoadFailed(e.to_string())),
        }
    });
}
