use crate::app::App;

mod app;
mod components;
mod helpers;
mod stores;

fn main() {
    yew::Renderer::<App>::new().render();
}
