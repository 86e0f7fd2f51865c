/**
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *  - decode ロジックや extractor 実装は core 側
 */
use super::core::PublicId;

// sessions
pub enum SessionTag {}
pub type PublicSessionId = PublicId<SessionTag>;
