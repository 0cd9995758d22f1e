pub mod adapters;
pub mod models;

pub use adapters::LegacyServiceView;
pub use models::service::{Service, ServiceRow};
