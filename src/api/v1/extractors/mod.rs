/*
 * Responsibility
 * - handler 向け extractor の公開
 *   - CurrentUser / Elevated: SecurityContext から caller を取り出す
 *   - PublicId<T>: 公開 ID → 内部 ID
 */
mod current_user;
mod public_id;

pub use current_user::{CurrentUser, Elevated};
pub use public_id::*;
