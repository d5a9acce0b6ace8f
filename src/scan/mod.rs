pub mod cache;
pub mod field_model;
pub mod locator;
pub mod types;
