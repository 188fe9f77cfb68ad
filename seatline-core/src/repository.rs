use async_trait::async_trait;
use uuid::Uuid;

use seatline_shared::models::{Seat, User};

use crate::allocation::{AllocationError, AllocationPlan};

/// Failure modes of the booking transaction that drive distinct responses.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("all seats are fully booked")]
    FullyBooked,
    #[error("seat {0} was taken by a concurrent booking")]
    SeatTaken(i32),
    #[error("booking storage error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<AllocationError> for BookingError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::FullyBooked => BookingError::FullyBooked,
        }
    }
}

/// Repository trait for account storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        user: &User,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the seat pool
#[async_trait]
pub trait SeatRepository: Send + Sync {
    /// Full seat map ordered by seat number, booked and unbooked.
    async fn list_seats(&self) -> Result<Vec<Seat>, Box<dyn std::error::Error + Send + Sync>>;

    /// Plan and mark seats for `requested` travellers inside one
    /// transaction. Any failure rolls the whole transaction back.
    async fn book_seats(
        &self,
        user_id: Uuid,
        requested: usize,
    ) -> Result<AllocationPlan, BookingError>;

    /// Clear every booking. Returns the number of seats released.
    async fn reset_bookings(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}
