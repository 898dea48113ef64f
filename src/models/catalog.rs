use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumber {
    pub id: i64,
    pub number: String,
    pub holder: String,
    pub bank_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub price_type: String,
    pub depreciation_months: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub id: i64,
    pub number: String,
    pub owner: String,
    pub module: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReimbursementType {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermission {
    pub id: i64,
    pub role: String,
    pub module: String,
    pub can_create: bool,
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChequeFailStatus {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Branch pricing discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Retail,
    Wholesale,
}

impl PriceType {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceType::Retail => "retail",
            PriceType::Wholesale => "wholesale",
        }
    }
}

impl FromStr for PriceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retail" => Ok(PriceType::Retail),
            "wholesale" => Ok(PriceType::Wholesale),
            other => Err(format!("Unknown price type: {other}")),
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the business a company phone line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneModule {
    Sales,
    Support,
    Warehouse,
    Logistics,
}

impl PhoneModule {
    pub fn as_str(self) -> &'static str {
        match self {
            PhoneModule::Sales => "sales",
            PhoneModule::Support => "support",
            PhoneModule::Warehouse => "warehouse",
            PhoneModule::Logistics => "logistics",
        }
    }
}

impl FromStr for PhoneModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales" => Ok(PhoneModule::Sales),
            "support" => Ok(PhoneModule::Support),
            "warehouse" => Ok(PhoneModule::Warehouse),
            "logistics" => Ok(PhoneModule::Logistics),
            other => Err(format!("Unknown phone module: {other}")),
        }
    }
}

impl fmt::Display for PhoneModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API modules a permission row can target.
pub const PERMISSION_MODULES: &[&str] = &[
    "users",
    "banks",
    "account-numbers",
    "branches",
    "colors",
    "phones",
    "reimbursement-types",
    "user-permissions",
    "cheque-fail-statuses",
];
