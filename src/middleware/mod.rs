/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (SecurityContext の設置), cors, http (request-id / limit / timeout / trace / security headers)
 */
pub mod auth;
pub mod cors;
pub mod http;
