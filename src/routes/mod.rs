pub mod account_numbers;
pub mod auth;
pub mod banks;
pub mod branches;
pub mod cheque_fail_statuses;
pub mod colors;
pub mod phones;
pub mod reimbursement_types;
pub mod user_permissions;
pub mod users;

use std::sync::OnceLock;

use axum::routing::{get, post};
use axum::Router;
use regex::Regex;

use crate::error::AppError;
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/revoke-all", post(auth::revoke_all))
        .route("/api/auth/validate", get(auth::validate))
        // Users
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/stats", get(users::stats))
        .route("/api/users/code/{code}", get(users::get_by_code))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        // Banks
        .route("/api/banks", get(banks::list).post(banks::create))
        .route("/api/banks/stats", get(banks::stats))
        .route("/api/banks/code/{code}", get(banks::get_by_code))
        .route(
            "/api/banks/{id}",
            get(banks::get).put(banks::update).delete(banks::delete),
        )
        // Account numbers
        .route(
            "/api/account-numbers",
            get(account_numbers::list).post(account_numbers::create),
        )
        .route("/api/account-numbers/stats", get(account_numbers::stats))
        .route(
            "/api/account-numbers/number/{number}",
            get(account_numbers::get_by_number),
        )
        .route(
            "/api/account-numbers/{id}",
            get(account_numbers::get)
                .put(account_numbers::update)
                .delete(account_numbers::delete),
        )
        // Branches
        .route("/api/branches", get(branches::list).post(branches::create))
        .route("/api/branches/stats", get(branches::stats))
        .route("/api/branches/code/{code}", get(branches::get_by_code))
        .route(
            "/api/branches/{id}",
            get(branches::get)
                .put(branches::update)
                .delete(branches::delete),
        )
        // Colors
        .route("/api/colors", get(colors::list).post(colors::create))
        .route("/api/colors/stats", get(colors::stats))
        .route("/api/colors/code/{code}", get(colors::get_by_code))
        .route(
            "/api/colors/{id}",
            get(colors::get).put(colors::update).delete(colors::delete),
        )
        // Phones
        .route("/api/phones", get(phones::list).post(phones::create))
        .route("/api/phones/stats", get(phones::stats))
        .route("/api/phones/number/{number}", get(phones::get_by_number))
        .route(
            "/api/phones/{id}",
            get(phones::get).put(phones::update).delete(phones::delete),
        )
        // Reimbursement types
        .route(
            "/api/reimbursement-types",
            get(reimbursement_types::list).post(reimbursement_types::create),
        )
        .route(
            "/api/reimbursement-types/stats",
            get(reimbursement_types::stats),
        )
        .route(
            "/api/reimbursement-types/code/{code}",
            get(reimbursement_types::get_by_code),
        )
        .route(
            "/api/reimbursement-types/{id}",
            get(reimbursement_types::get)
                .put(reimbursement_types::update)
                .delete(reimbursement_types::delete),
        )
        // User permissions
        .route(
            "/api/user-permissions",
            get(user_permissions::list).post(user_permissions::create),
        )
        .route("/api/user-permissions/stats", get(user_permissions::stats))
        .route(
            "/api/user-permissions/{id}",
            get(user_permissions::get)
                .put(user_permissions::update)
                .delete(user_permissions::delete),
        )
        // Cheque fail statuses
        .route(
            "/api/cheque-fail-statuses",
            get(cheque_fail_statuses::list).post(cheque_fail_statuses::create),
        )
        .route(
            "/api/cheque-fail-statuses/stats",
            get(cheque_fail_statuses::stats),
        )
        .route(
            "/api/cheque-fail-statuses/code/{code}",
            get(cheque_fail_statuses::get_by_code),
        )
        .route(
            "/api/cheque-fail-statuses/{id}",
            get(cheque_fail_statuses::get)
                .put(cheque_fail_statuses::update)
                .delete(cheque_fail_statuses::delete),
        )
}

/// Normalize a fixed-length natural key: trim, uppercase, exact length,
/// alphanumeric only.
pub(crate) fn normalize_code(raw: &str, len: usize, label: &str) -> Result<String, AppError> {
    let code = raw.trim().to_uppercase();
    if code.len() != len || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest(format!(
            "{label} must be exactly {len} alphanumeric characters"
        )));
    }
    Ok(code)
}

pub(crate) fn require_non_empty(value: &str, label: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{label} is required")));
    }
    Ok(())
}

static PHONE_NUMBER: OnceLock<Regex> = OnceLock::new();

pub(crate) fn validate_phone_number(value: &str, label: &str) -> Result<(), AppError> {
    let re = PHONE_NUMBER
        .get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,18}$").expect("valid phone regex"));
    if !re.is_match(value) {
        return Err(AppError::BadRequest(format!(
            "{label} must be a phone number of 6 to 20 characters"
        )));
    }
    Ok(())
}
