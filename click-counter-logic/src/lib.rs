pub mod error;
pub mod metrics;
pub mod repository;
pub mod services;
pub mod types;

pub use error::ServiceError;
pub use types::{BusMessage, BusPushEnvelope, ClickEvent, ClientFrame, CounterTotals, CountryTotal, ServerFrame};
