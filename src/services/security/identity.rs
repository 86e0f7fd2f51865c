/*
 * Responsibility
 * - 現在の caller の user_id を解決する
 * - 取れなければ Unauthorized (default 値にはフォールバックしない)
 */
use uuid::Uuid;

use crate::error::AppError;
use crate::services::security::context::SecurityContextAccessor;

/// Resolve the authenticated user's id from the current context.
///
/// Fails with `AppError::Unauthorized` when there is no context, no principal,
/// or the principal carries no user id.
pub fn current_user_id(accessor: &SecurityContextAccessor) -> Result<Uuid, AppError> {
    let Some(principal) = accessor.current_principal() else {
        tracing::debug!("no authenticated principal in context");
        return Err(AppError::Unauthorized);
    };

    principal.user_id().ok_or_else(|| {
        tracing::debug!(principal = %principal.name(), "principal has no user id claim");
        AppError::Unauthorized
    })
}
