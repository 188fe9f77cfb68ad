use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use seatline_core::allocation::{self, AllocationPlan, SeatAvailability};
use seatline_core::repository::{BookingError, SeatRepository};
use seatline_shared::models::Seat;

pub struct PgSeatRepository {
    pool: PgPool,
}

impl PgSeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    seat_number: i32,
    row_number: i32,
    booked_by: Option<Uuid>,
    booked_at: Option<DateTime<Utc>>,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat {
            seat_number: row.seat_number,
            row_number: row.row_number,
            booked_by: row.booked_by,
            booked_at: row.booked_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AvailableRow {
    seat_number: i32,
    row_number: i32,
}

fn store_err(err: sqlx::Error) -> BookingError {
    BookingError::Store(Box::new(err))
}

#[async_trait]
impl SeatRepository for PgSeatRepository {
    async fn list_seats(&self) -> Result<Vec<Seat>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            "SELECT seat_number, row_number, booked_by, booked_at FROM seats ORDER BY seat_number",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn book_seats(
        &self,
        user_id: Uuid,
        requested: usize,
    ) -> Result<AllocationPlan, BookingError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // Snapshot the available pool, then plan against it.
        let free = sqlx::query_as::<_, AvailableRow>(
            "SELECT seat_number, row_number FROM seats WHERE booked_by IS NULL ORDER BY seat_number",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(store_err)?;

        let snapshot: Vec<SeatAvailability> = free
            .iter()
            .map(|row| SeatAvailability {
                seat_number: row.seat_number,
                row_number: row.row_number,
            })
            .collect();

        let plan = allocation::plan(&snapshot, requested)?;

        // The NULL guard is the double-booking defense: a concurrent
        // transaction that committed first leaves this update matching zero
        // rows, and the whole booking rolls back.
        let booked_at = Utc::now();
        for &seat_number in &plan.seat_numbers {
            let result = sqlx::query(
                r#"
                UPDATE seats
                SET booked_by = $1, booked_at = $2
                WHERE seat_number = $3 AND booked_by IS NULL
                "#,
            )
            .bind(user_id)
            .bind(booked_at)
            .bind(seat_number)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

            if result.rows_affected() == 0 {
                tx.rollback().await.map_err(store_err)?;
                return Err(BookingError::SeatTaken(seat_number));
            }
        }

        tx.commit().await.map_err(store_err)?;

        info!(user_id = %user_id, seats = ?plan.seat_numbers, "Seats booked");
        Ok(plan)
    }

    async fn reset_bookings(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE seats SET booked_by = NULL, booked_at = NULL WHERE booked_by IS NOT NULL",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
