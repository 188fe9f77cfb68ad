use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seatline_core::allocation::AllocationStrategy;
use seatline_core::repository::BookingError;

use crate::error::AppError;
use crate::middleware::auth::{admin_auth_middleware, user_auth_middleware, Claims};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct SeatResponse {
    seat_number: i32,
    row_number: i32,
    booked_by: Option<Uuid>,
    booked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct SeatMapResponse {
    seats: Vec<SeatResponse>,
}

#[derive(Debug, Deserialize)]
struct BookSeatsRequest {
    seat_count: u32,
}

#[derive(Debug, Serialize)]
struct BookSeatsResponse {
    seats: Vec<i32>,
    strategy: AllocationStrategy,
}

#[derive(Debug, Serialize)]
struct ResetBookingsResponse {
    cleared: u64,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let booking = Router::new()
        .route("/v1/seats/book", post(book_seats))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    let admin = Router::new()
        .route("/v1/seats/reset", post(reset_bookings))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ));

    Router::new()
        .route("/v1/seats", get(list_seats))
        .merge(booking)
        .merge(admin)
}

/// GET /v1/seats
/// Full seat map, booked and unbooked, ordered by seat number.
async fn list_seats(State(state): State<AppState>) -> Result<Json<SeatMapResponse>, AppError> {
    let seats = state
        .seats
        .list_seats()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let seats = seats
        .into_iter()
        .map(|s| SeatResponse {
            seat_number: s.seat_number,
            row_number: s.row_number,
            booked_by: s.booked_by,
            booked_at: s.booked_at,
        })
        .collect();

    Ok(Json(SeatMapResponse { seats }))
}

/// POST /v1/seats/book
/// Allocate and mark seats for the authenticated user.
async fn book_seats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BookSeatsRequest>,
) -> Result<Json<BookSeatsResponse>, AppError> {
    let max = state.booking_rules.max_seats_per_booking;
    if req.seat_count == 0 || req.seat_count > max {
        return Err(AppError::ValidationError(format!(
            "seat_count must be between 1 and {}",
            max
        )));
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthenticationError("invalid subject claim".to_string()))?;

    let plan = state
        .seats
        .book_seats(user_id, req.seat_count as usize)
        .await
        .map_err(|e| match e {
            BookingError::FullyBooked => {
                AppError::ConflictError("all seats are fully booked".to_string())
            }
            BookingError::SeatTaken(seat) => AppError::ConflictError(format!(
                "seat {} was taken by a concurrent booking",
                seat
            )),
            BookingError::Store(err) => AppError::InternalServerError(err.to_string()),
        })?;

    tracing::info!(user_id = %user_id, seats = ?plan.seat_numbers, "Booking confirmed");

    Ok(Json(BookSeatsResponse {
        seats: plan.seat_numbers,
        strategy: plan.strategy,
    }))
}

/// POST /v1/seats/reset
/// Clear every booking. The admin middleware gates access.
async fn reset_bookings(
    State(state): State<AppState>,
) -> Result<Json<ResetBookingsResponse>, AppError> {
    let cleared = state
        .seats
        .reset_bookings()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(cleared, "Bookings reset");

    Ok(Json(ResetBookingsResponse { cleared }))
}
