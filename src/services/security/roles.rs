use std::collections::BTreeSet;

/// Roles allowed to see raw ratings and to manage them. Exact, case-sensitive match.
pub const ELEVATED_ROLES: [&str; 2] = ["Admin", "SubAdmin"];

pub fn is_elevated(roles: &BTreeSet<String>) -> bool {
    ELEVATED_ROLES.iter().any(|role| roles.contains(*role))
}
