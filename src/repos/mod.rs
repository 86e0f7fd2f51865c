/*
 * Responsibility
 * - DB アクセス (sqlx) と RepoError
 */
pub mod error;
pub mod session_repo;
pub mod user_repo;
