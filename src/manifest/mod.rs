/// Manifest data model and JSON persistence.
pub mod model;
