use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    pub static ref CLICKS_ACCEPTED_TOTAL: IntCounter = register_int_counter!(
        "click_counter_clicks_accepted",
        "total number of click events accepted and published to the bus"
    )
    .unwrap();
    pub static ref CLICKS_RATE_LIMITED_TOTAL: IntCounter = register_int_counter!(
        "click_counter_clicks_rate_limited",
        "total number of click events rejected by the per-session rate limiter"
    )
    .unwrap();
    pub static ref BUS_PUBLISH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "click_counter_bus_publish",
        "total number of bus publish attempts",
        &["outcome"]
    )
    .unwrap();
    pub static ref PROCESSOR_INCREMENTS_TOTAL: IntCounter = register_int_counter!(
        "click_counter_processor_increments",
        "total number of counter increments committed by the processor"
    )
    .unwrap();
    pub static ref PROCESSOR_IDEMPOTENT_HITS_TOTAL: IntCounter = register_int_counter!(
        "click_counter_processor_idempotent_hits",
        "total number of bus deliveries short-circuited by the idempotency check"
    )
    .unwrap();
    pub static ref BROADCAST_FANOUT_TOTAL: IntCounter = register_int_counter!(
        "click_counter_broadcast_fanout",
        "total number of sessions a broadcast frame was enqueued to"
    )
    .unwrap();
    pub static ref BROADCAST_DROPPED_TOTAL: IntCounter = register_int_counter!(
        "click_counter_broadcast_dropped",
        "total number of sessions skipped during broadcast because their outbox was full"
    )
    .unwrap();
    pub static ref GEO_CACHE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "click_counter_geo_cache",
        "total number of geolocation cache lookups",
        &["outcome"]
    )
    .unwrap();
}
