//! Types and derivation rules shared by the server and the browser client.
//!
//! The signature and grouping rules live here so the catalog can cluster an
//! already-fetched unit list in the browser exactly the way the server does.

pub mod grouping;
pub mod model;
pub mod requests;
pub mod signature;
