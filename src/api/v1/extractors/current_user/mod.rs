/*!
 * Caller extractors
 *
 * Responsibility:
 * - 認証済み caller (user_id) や elevated role を handler に提供する
 * - context の設置は middleware::auth::access の責務。ここは読むだけ
 */

mod core;

pub use core::{CurrentUser, Elevated};
