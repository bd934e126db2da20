//! Non-reentrant lock around mutating entry points.
//!
//! The host already refuses contract re-entry; the lock additionally keeps a
//! callback from any external contract from starting a second mutating call
//! while the first one still holds stale totals.

use soroban_sdk::Env;

use crate::error::VaultError;
use crate::storage::DataKey;

pub(crate) fn enter(env: &Env) -> Result<(), VaultError> {
    let locked: bool = env.storage().instance().get(&DataKey::Locked).unwrap_or(false);
    if locked {
        return Err(VaultError::Reentrant);
    }
    env.storage().instance().set(&DataKey::Locked, &true);
    Ok(())
}

pub(crate) fn exit(env: &Env) {
    env.storage().instance().remove(&DataKey::Locked);
}

/// Runs `f` holding the lock. A failed call is rolled back by the host, lock
/// included.
pub(crate) fn non_reentrant<T>(
    env: &Env,
    f: impl FnOnce() -> Result<T, VaultError>,
) -> Result<T, VaultError> {
    enter(env)?;
    let result = f();
    exit(env);
    result
}
