pub mod counters;
pub mod processed_messages;
