use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: usize,
}
