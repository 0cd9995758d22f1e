pub mod service;

pub use service::{Service, ServiceRow};
