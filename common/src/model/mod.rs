pub mod bulletin;
pub mod catalog;
pub mod dictionary;
pub mod import;
pub mod stock;
