use std::sync::Arc;

use seatline_core::repository::{SeatRepository, UserRepository};
use seatline_store::app_config::BookingRules;
use seatline_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub seats: Arc<dyn SeatRepository>,
    pub redis: Arc<RedisClient>,
    pub auth: AuthConfig,
    pub booking_rules: BookingRules,
}
