pub mod ad_event;
pub mod creative_ad;
pub mod segment;
pub mod user_model;
