pub mod catalog;
pub mod compare;
pub mod garage;
