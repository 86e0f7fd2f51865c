pub mod cache;
pub mod guard;
pub mod ratable;

pub use cache::RatingCacheConfig;
pub use guard::SecureRatingService;
pub use ratable::{EntityKind, Ratable};
