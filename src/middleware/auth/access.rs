//! access token (JWT) 検証 → SecurityContext を request scope に載せる
//!
//! - `Authorization` ヘッダなし: anonymous context (principal なし) のまま handler へ
//! - `Authorization: Bearer <jwt>`: 検証して principal 付き context を作る
//! - ヘッダはあるが不正 / 検証失敗: 401
//!
//! handler 側は `SecurityContextAccessor` (TaskLocalContextProvider) 経由で context を読む。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::security::{SecurityContext, context};
use crate::state::AppState;

/// `/api/v1/*` に認証 context を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

/// `Ok(None)` when no Authorization header is present.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth = value.to_str().map_err(|_| AppError::Unauthorized)?;
    let token = auth
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    Ok(Some(token))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = match bearer_token(req.headers())? {
        None => SecurityContext::anonymous(),
        Some(token) => {
            // 署名検証 + iss/aud/exp/leeway などは AuthService 側で実施
            let verified = match state.auth.verify_verified(token) {
                Ok(verified) => verified,
                Err(err) => {
                    tracing::warn!(
                        error = ?err,
                        "access token verification failed"
                    );
                    return Err(AppError::Unauthorized);
                }
            };

            tracing::debug!(
                subject = %verified.subject,
                jti = ?verified.jti,
                roles = ?verified.roles,
                "access token verified"
            );

            SecurityContext::authenticated(verified.into_principal())
        }
    };

    // middleware → handler への受け渡し (task-local scope)
    Ok(context::scope(ctx, next.run(req)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_anonymous() {
        let headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Ok(None)));
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert!(matches!(bearer_token(&headers), Ok(Some("abc.def"))));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "bearer abc"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
            assert!(
                matches!(bearer_token(&headers), Err(AppError::Unauthorized)),
                "{value}"
            );
        }
    }
}
