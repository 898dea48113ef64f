use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::{self, TokenKind};
use crate::error::AppError;
use crate::models::Role;
use crate::state::SharedState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub code: String,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.role.is_manager() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Manager access or above required".to_string(),
            ))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let value = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        // The failure cause (expired vs malformed vs wrong kind) stays out of
        // the response; it is only distinguishable in the logs.
        let claims = jwt::decode_token(token, &state.config.jwt_secret).map_err(|e| {
            tracing::debug!("Access token rejected: {e}");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        let role: Role = claims
            .role
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if let Err(retry_after) = state.api_limiter.check(
            claims.sub,
            state.config.rate_limit_max,
            state.config.rate_limit_window_secs,
        ) {
            return Err(AppError::RateLimited(format!(
                "Rate limit exceeded. Retry in {retry_after}s"
            )));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role,
            code: claims.code,
        })
    }
}
