//! Identity verification gate.
//!
//! An address moves from unverified to verified exactly once; there is no
//! revocation. How a proof is judged depends on the configured
//! [`VerificationMode`]:
//!
//! - `Permissive` accepts any proof from an authenticated caller. Testnet only.
//! - `Strict` asks an identity hub to verify a zero-knowledge disclosure proof
//!   and checks the disclosed attributes against a [`StrictPolicy`].

use soroban_sdk::{contractclient, contracttype, log, Address, Bytes, Env, String, Vec};

use crate::error::VaultError;
use crate::storage;

/// Disclosure requirements enforced in strict mode.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrictPolicy {
    /// Identity hub contract that verifies proofs
    pub hub: Address,
    /// Application scope the proof must be bound to
    pub scope: String,
    pub min_age: u32,
    /// Nationalities (ISO 3166 alpha-3) that may not verify
    pub excluded_countries: Vec<String>,
    pub ofac_enabled: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VerificationMode {
    Permissive,
    Strict(StrictPolicy),
}

/// Attributes disclosed by a verified proof.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Disclosure {
    /// Address the proof was generated for
    pub user: Address,
    pub scope: String,
    pub age: u32,
    pub nationality: String,
    pub ofac_match: bool,
}

/// Identity hub interface. `verify_disclosure` fails on an invalid proof.
#[contractclient(name = "IdentityHubClient")]
pub trait IdentityHub {
    fn verify_disclosure(env: Env, proof: Bytes, context: Bytes) -> Disclosure;
}

pub fn is_verified(env: &Env, user: &Address) -> bool {
    storage::read_account(env, user)
        .map(|account| account.verified)
        .unwrap_or(false)
}

/// Marks `user` verified, creating the account if needed.
pub fn mark_verified(env: &Env, user: &Address) -> Result<(), VaultError> {
    let mut account = storage::load_account(env, user);
    if account.verified {
        return Err(VaultError::AlreadyVerified);
    }
    account.verified = true;
    account.last_activity = env.ledger().timestamp();
    storage::write_account(env, user, &account);
    Ok(())
}

/// Judges `proof` for `user` under `mode`.
pub fn check_proof(
    env: &Env,
    mode: &VerificationMode,
    user: &Address,
    proof: &Bytes,
    context: &Bytes,
) -> Result<(), VaultError> {
    let policy = match mode {
        VerificationMode::Permissive => return Ok(()),
        VerificationMode::Strict(policy) => policy,
    };

    if proof.is_empty() {
        return Err(VaultError::ProofRejected);
    }

    let hub = IdentityHubClient::new(env, &policy.hub);
    let disclosure = match hub.try_verify_disclosure(proof, context) {
        Ok(Ok(disclosure)) => disclosure,
        _ => {
            log!(env, "identity hub rejected proof", user.clone());
            return Err(VaultError::ProofRejected);
        }
    };

    check_disclosure(policy, user, &disclosure).map_err(|err| {
        log!(env, "disclosure does not meet policy", user.clone());
        err
    })
}

fn check_disclosure(policy: &StrictPolicy, user: &Address, disclosure: &Disclosure) -> Result<(), VaultError> {
    if disclosure.user != *user || disclosure.scope != policy.scope {
        return Err(VaultError::ProofRejected);
    }
    if disclosure.age < policy.min_age {
        return Err(VaultError::ProofRejected);
    }
    if policy.excluded_countries.contains(&disclosure.nationality) {
        return Err(VaultError::ProofRejected);
    }
    if policy.ofac_enabled && disclosure.ofac_match {
        return Err(VaultError::ProofRejected);
    }
    Ok(())
}
