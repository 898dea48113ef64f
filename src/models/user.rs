use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone: String,
    pub address: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub expense_limit: i64,
    pub discount_limit: i64,
    pub point: i64,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Closed set of roles. Request bodies and query filters are parsed into
/// this enum at the HTTP boundary; unknown values are rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Manager,
    Supervisor,
    Finance,
    Warehouse,
    Sales,
    Cashier,
    Courier,
    Technician,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::Superadmin,
        Role::Admin,
        Role::Manager,
        Role::Supervisor,
        Role::Finance,
        Role::Warehouse,
        Role::Sales,
        Role::Cashier,
        Role::Courier,
        Role::Technician,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::Finance => "finance",
            Role::Warehouse => "warehouse",
            Role::Sales => "sales",
            Role::Cashier => "cashier",
            Role::Courier => "courier",
            Role::Technician => "technician",
        }
    }

    /// Higher rank outranks lower. Admin user management may only touch
    /// users at or below the actor's rank.
    pub fn rank(self) -> u8 {
        match self {
            Role::Superadmin => 9,
            Role::Admin => 8,
            Role::Manager => 7,
            Role::Supervisor => 6,
            Role::Finance => 5,
            Role::Warehouse => 4,
            Role::Sales => 3,
            Role::Cashier => 2,
            Role::Courier => 1,
            Role::Technician => 0,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin)
    }

    pub fn is_manager(self) -> bool {
        self.rank() >= Role::Manager.rank()
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown role: {s}"))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
