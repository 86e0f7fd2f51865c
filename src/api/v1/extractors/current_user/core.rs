use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::security::{Principal, current_user_id, is_elevated};
use crate::state::AppState;

/// The authenticated caller's user id.
///
/// Rejects with 401 when the request has no principal or the principal has no user id.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = current_user_id(&state.security)?;
        Ok(Self { user_id })
    }
}

/// Guard for routes that only Admin / SubAdmin may call.
///
/// - no principal: 401
/// - principal without an elevated role: 403
#[derive(Debug, Clone, Copy)]
pub struct Elevated;

impl FromRequestParts<AppState> for Elevated {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_elevated(state.security.current_principal().as_ref())
    }
}

// Decides from one principal snapshot: identity and roles are read together.
fn require_elevated(principal: Option<&Principal>) -> Result<Elevated, AppError> {
    let Some(principal) = principal else {
        return Err(AppError::Unauthorized);
    };

    if !is_elevated(principal.roles()) {
        tracing::warn!(principal = %principal.name(), "elevated role required");
        return Err(AppError::Forbidden);
    }

    Ok(Elevated)
}
