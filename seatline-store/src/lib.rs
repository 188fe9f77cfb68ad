pub mod app_config;
pub mod database;
pub mod redis_repo;
pub mod seat_repo;
pub mod user_repo;

pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use seat_repo::PgSeatRepository;
pub use user_repo::PgUserRepository;
