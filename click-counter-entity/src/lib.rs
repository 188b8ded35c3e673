pub mod counters;
pub mod processed_messages;

pub use counters::Entity as Counters;
pub use processed_messages::Entity as ProcessedMessages;
