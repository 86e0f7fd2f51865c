use rust_decimal::Decimal;

/// Which shape a ratable entity has. Part of the decision cache key so two shapes
/// with colliding identities never share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    UserProfile,
    RosterEntry,
}

/// Anything that carries a rating.
///
/// - `entity_key` must be stable for the same logical entity (e.g. primary key)
/// - `rating` is the raw, unmasked value as loaded from storage
pub trait Ratable {
    fn kind(&self) -> EntityKind;
    fn entity_key(&self) -> String;
    fn rating(&self) -> Decimal;
}
