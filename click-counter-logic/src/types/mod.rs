pub mod click_event;
pub mod envelope;
pub mod frames;
pub mod totals;

pub use click_event::ClickEvent;
pub use envelope::{BusMessage, BusPushEnvelope};
pub use frames::{ClientFrame, ServerFrame};
pub use totals::{CountryTotal, CounterTotals};
