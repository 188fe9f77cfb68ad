use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use seatline_api::{
    app,
    state::{AppState, AuthConfig},
};
use seatline_core::allocation::{self, AllocationPlan, SeatAvailability};
use seatline_core::repository::{BookingError, SeatRepository, UserRepository};
use seatline_shared::models::{Seat, User};
use seatline_store::app_config::BookingRules;
use seatline_store::RedisClient;

const SECRET: &str = "test-secret";

struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create_user(
        &self,
        user: &User,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

struct InMemorySeats {
    seats: Mutex<Vec<Seat>>,
}

impl InMemorySeats {
    fn new(seats: Vec<Seat>) -> Self {
        Self {
            seats: Mutex::new(seats),
        }
    }

    /// A pool of `total` seats, 7 per row, with `taken` pre-booked by a
    /// throwaway user.
    fn pool(total: i32, taken: &[i32]) -> Self {
        let owner = Uuid::new_v4();
        let seats = (1..=total)
            .map(|n| Seat {
                seat_number: n,
                row_number: (n - 1) / 7 + 1,
                booked_by: taken.contains(&n).then_some(owner),
                booked_at: taken.contains(&n).then(Utc::now),
            })
            .collect();
        Self::new(seats)
    }
}

#[async_trait]
impl SeatRepository for InMemorySeats {
    async fn list_seats(&self) -> Result<Vec<Seat>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.seats.lock().unwrap().clone())
    }

    async fn book_seats(
        &self,
        user_id: Uuid,
        requested: usize,
    ) -> Result<AllocationPlan, BookingError> {
        let mut seats = self.seats.lock().unwrap();

        let free: Vec<SeatAvailability> = seats
            .iter()
            .filter(|s| s.is_available())
            .map(|s| SeatAvailability {
                seat_number: s.seat_number,
                row_number: s.row_number,
            })
            .collect();

        let plan = allocation::plan(&free, requested)?;

        let booked_at = Utc::now();
        for seat in seats.iter_mut() {
            if plan.seat_numbers.contains(&seat.seat_number) {
                seat.booked_by = Some(user_id);
                seat.booked_at = Some(booked_at);
            }
        }

        Ok(plan)
    }

    async fn reset_bookings(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let mut seats = self.seats.lock().unwrap();
        let mut cleared = 0;
        for seat in seats.iter_mut() {
            if seat.booked_by.take().is_some() {
                seat.booked_at = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

async fn test_state(seats: InMemorySeats) -> AppState {
    AppState {
        users: Arc::new(InMemoryUsers {
            users: Mutex::new(Vec::new()),
        }),
        seats: Arc::new(seats),
        redis: Arc::new(RedisClient::new("redis://127.0.0.1/").await.unwrap()),
        auth: AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
        booking_rules: BookingRules {
            max_seats_per_booking: 7,
        },
    }
}

fn token_for(user_id: Uuid, role: &str) -> String {
    let claims = json!({
        "sub": user_id.to_string(),
        "email": "someone@example.com",
        "role": role,
        "exp": (Utc::now().timestamp() + 3600) as usize,
    });
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_and_login_flow() {
    let app = app(test_state(InMemorySeats::pool(14, &[])).await);

    let register = json!({
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "password": "Voyager7!",
        "confirm_password": "Voyager7!",
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/auth/register", register.clone(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(body.get("user_id").is_some());

    // Same email again conflicts.
    let response = app
        .clone()
        .oneshot(post_json("/v1/auth/register", register, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Correct credentials yield a token and profile.
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/login",
            json!({"email": "grace@example.com", "password": "Voyager7!"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["role"], "CUSTOMER");

    // Wrong password is an authentication failure.
    let response = app
        .oneshot(post_json(
            "/v1/auth/login",
            json!({"email": "grace@example.com", "password": "Voyager7!wrong"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = app(test_state(InMemorySeats::pool(14, &[])).await);

    let response = app
        .oneshot(post_json(
            "/v1/auth/register",
            json!({
                "name": "Grace Hopper",
                "email": "grace@example.com",
                "password": "nodigits",
                "confirm_password": "nodigits",
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_mismatched_confirmation() {
    let app = app(test_state(InMemorySeats::pool(14, &[])).await);

    let response = app
        .oneshot(post_json(
            "/v1/auth/register",
            json!({
                "name": "Grace Hopper",
                "email": "grace@example.com",
                "password": "Voyager7!",
                "confirm_password": "Voyager8!",
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seat_map_is_public() {
    let app = app(test_state(InMemorySeats::pool(14, &[3])).await);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/seats")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let seats = body["seats"].as_array().unwrap();
    assert_eq!(seats.len(), 14);
    assert!(seats[2]["booked_by"].is_string());
    assert!(seats[0]["booked_by"].is_null());
}

#[tokio::test]
async fn test_booking_requires_token() {
    let app = app(test_state(InMemorySeats::pool(14, &[])).await);

    let response = app
        .oneshot(post_json("/v1/seats/book", json!({"seat_count": 2}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_booking_prefers_a_single_row() {
    // Row 1 keeps two free seats; row 2 is fully free.
    let app = app(test_state(InMemorySeats::pool(14, &[1, 2, 3, 4, 5])).await);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let response = app
        .oneshot(post_json(
            "/v1/seats/book",
            json!({"seat_count": 3}),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["strategy"], "SAME_ROW");
    assert_eq!(body["seats"], json!([8, 9, 10]));
}

#[tokio::test]
async fn test_booking_scatters_across_rows() {
    // Two free seats in each row, party of three.
    let app = app(test_state(InMemorySeats::pool(14, &[1, 2, 3, 4, 5, 8, 9, 10, 11, 12])).await);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let response = app
        .oneshot(post_json(
            "/v1/seats/book",
            json!({"seat_count": 3}),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["strategy"], "SCATTERED");
    assert_eq!(body["seats"], json!([6, 7, 13]));
}

#[tokio::test]
async fn test_booking_grants_remainder_when_pool_runs_short() {
    let app = app(test_state(InMemorySeats::pool(14, &(1..=12).collect::<Vec<_>>())).await);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let response = app
        .oneshot(post_json(
            "/v1/seats/book",
            json!({"seat_count": 5}),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["seats"], json!([13, 14]));
}

#[tokio::test]
async fn test_booking_conflicts_when_fully_booked() {
    let app = app(test_state(InMemorySeats::pool(14, &(1..=14).collect::<Vec<_>>())).await);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let response = app
        .oneshot(post_json(
            "/v1/seats/book",
            json!({"seat_count": 1}),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_caps_party_size() {
    let app = app(test_state(InMemorySeats::pool(80, &[])).await);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let response = app
        .oneshot(post_json(
            "/v1/seats/book",
            json!({"seat_count": 8}),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_requires_admin_role() {
    let app = app(test_state(InMemorySeats::pool(14, &[1, 2])).await);

    let customer = token_for(Uuid::new_v4(), "CUSTOMER");
    let response = app
        .clone()
        .oneshot(post_json("/v1/seats/reset", json!({}), Some(&customer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = token_for(Uuid::new_v4(), "ADMIN");
    let response = app
        .oneshot(post_json("/v1/seats/reset", json!({}), Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cleared"], 2);
}
