//! Fixture values shared by the bootstrap suites.

/// Target the standalone run path points at.
pub const LOCAL_TARGET: &str = "http://localhost:3000";

/// Token the scripted login grants for `email` unless told otherwise:
/// `tok-` followed by the local part (`customer@test.com` → `tok-customer`).
#[must_use]
pub fn token_for(email: &str) -> String {
    let local = email.split_once('@').map_or(email, |(local, _)| local);
    format!("tok-{local}")
}
