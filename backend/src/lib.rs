//! Showroom backend: stock import, catalog and admin HTTP service.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod import;
pub mod media;
pub mod services;
pub mod state;
pub mod store;
