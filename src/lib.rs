pub mod auth;
pub mod config;
pub mod engine;
pub mod flights;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod saga;

pub use engine::{Engine, EngineError, PriceRange, SearchFilters};
pub use saga::{CancelError, CancelOrchestrator, CancelReport, CancelRequest};
