use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Parse the storage representation. Unknown values map to `None`.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "CUSTOMER" => Some(Role::Customer),
            _ => None,
        }
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new customer account. Admin promotion happens at the
    /// database level, never through registration.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: Role::Customer,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// One seat in the fixed pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub seat_number: i32,
    pub row_number: i32,
    pub booked_by: Option<Uuid>,
    pub booked_at: Option<DateTime<Utc>>,
}

impl Seat {
    /// A seat is available while no booking owner is set.
    pub fn is_available(&self) -> bool {
        self.booked_by.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(Role::parse(Role::Customer.as_str()), Some(Role::Customer));
        assert_eq!(Role::parse("SUPERVISOR"), None);
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "$2b$12$hash".to_string(),
        );
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "CUSTOMER");
    }
}
