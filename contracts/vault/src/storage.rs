//! Storage keys, persisted records and typed accessors.
//!
//! Instance storage holds vault-wide state (configuration, totals, flags).
//! Persistent storage holds one `UserAccount` per address plus a dense holder
//! index (`Holder(i)` for `i < HolderCount`) so the whole ledger can be
//! scanned.

use soroban_sdk::{contracttype, Address, Env};

use crate::error::VaultError;
use crate::strategy::StrategyKind;
use crate::verification::VerificationMode;

pub(crate) const INSTANCE_TTL_THRESHOLD: u32 = 17_280; // ~1 day
pub(crate) const INSTANCE_TTL_EXTEND: u32 = 518_400; // ~30 days
pub(crate) const ACCOUNT_TTL_THRESHOLD: u32 = 17_280;
pub(crate) const ACCOUNT_TTL_EXTEND: u32 = 518_400;

pub const VERSION: u32 = 1;


// ============================================================================
// STORAGE KEYS
// ============================================================================

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    /// Deposit asset (Stellar token contract)
    Asset,
    /// Lending pool the vault supplies into
    YieldSource,
    Limits,
    Paused,
    TotalShares,
    /// Tracked liquid reserve; tokens sent to the vault outside `deposit` are not counted
    Reserve,
    /// Lifetime deposits
    TotalDeposited,
    /// Lifetime withdrawals
    TotalWithdrawn,
    Verification,
    /// Address allowed to call `set_verified`
    Oracle,
    /// Non-reentrant lock
    Locked,
    Version,
    HolderCount,
    Account(Address),
    Holder(u32),
}


// ============================================================================
// RECORDS
// ============================================================================

/// Deposit limits and the vault-wide reserve ratio.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultLimits {
    /// Smallest accepted deposit, in asset units
    pub min_deposit: i128,
    /// Largest accepted single deposit, in asset units
    pub max_deposit: i128,
    /// Cap on total assets (reserve + yield source)
    pub max_tvl: i128,
    /// Percent of each deposit kept in the reserve
    pub reserve_ratio: u32,
}

impl VaultLimits {
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.min_deposit < 1
            || self.max_deposit < self.min_deposit
            || self.max_tvl < self.min_deposit
            || self.reserve_ratio > 100
        {
            return Err(VaultError::InvalidConfig);
        }
        Ok(())
    }
}

/// Per-address record. Created on first interaction and never deleted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserAccount {
    pub shares: i128,
    pub strategy: StrategyKind,
    pub verified: bool,
    pub total_deposited: i128,
    pub total_withdrawn: i128,
    pub last_activity: u64,
}

impl UserAccount {
    pub fn new() -> Self {
        UserAccount {
            shares: 0,
            strategy: StrategyKind::Conservative,
            verified: false,
            total_deposited: 0,
            total_withdrawn: 0,
            last_activity: 0,
        }
    }
}

impl Default for UserAccount {
    fn default() -> Self {
        Self::new()
    }
}


// ============================================================================
// ACCESSORS
// ============================================================================

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Owner)
}

fn read_address(env: &Env, key: &DataKey) -> Result<Address, VaultError> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(VaultError::NotInitialized)
}

pub fn read_owner(env: &Env) -> Result<Address, VaultError> {
    read_address(env, &DataKey::Owner)
}

pub fn read_asset(env: &Env) -> Result<Address, VaultError> {
    read_address(env, &DataKey::Asset)
}

pub fn read_yield_source(env: &Env) -> Result<Address, VaultError> {
    read_address(env, &DataKey::YieldSource)
}

pub fn read_limits(env: &Env) -> Result<VaultLimits, VaultError> {
    env.storage()
        .instance()
        .get(&DataKey::Limits)
        .ok_or(VaultError::NotInitialized)
}

pub fn write_limits(env: &Env, limits: &VaultLimits) {
    env.storage().instance().set(&DataKey::Limits, limits);
}

pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&DataKey::Paused).unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
}

pub fn read_verification_mode(env: &Env) -> Result<VerificationMode, VaultError> {
    env.storage()
        .instance()
        .get(&DataKey::Verification)
        .ok_or(VaultError::NotInitialized)
}

pub fn write_verification_mode(env: &Env, mode: &VerificationMode) {
    env.storage().instance().set(&DataKey::Verification, mode);
}

pub fn read_oracle(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Oracle)
}

pub fn write_oracle(env: &Env, oracle: &Address) {
    env.storage().instance().set(&DataKey::Oracle, oracle);
}

/// Reads one of the vault-wide `i128` counters.
pub fn read_amount(env: &Env, key: &DataKey) -> i128 {
    env.storage().instance().get(key).unwrap_or(0)
}

pub fn write_amount(env: &Env, key: &DataKey, value: i128) {
    env.storage().instance().set(key, &value);
}

/// Adds `delta` (may be negative) to a counter. Counters never go negative.
pub fn add_amount(env: &Env, key: &DataKey, delta: i128) -> Result<i128, VaultError> {
    let value = read_amount(env, key)
        .checked_add(delta)
        .ok_or(VaultError::MathOverflow)?;
    if value < 0 {
        return Err(VaultError::MathOverflow);
    }
    write_amount(env, key, value);
    Ok(value)
}

pub fn read_account(env: &Env, user: &Address) -> Option<UserAccount> {
    let key = DataKey::Account(user.clone());
    let account = env.storage().persistent().get(&key);
    if account.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, ACCOUNT_TTL_THRESHOLD, ACCOUNT_TTL_EXTEND);
    }
    account
}

/// Returns the stored account or a fresh one; nothing is written.
pub fn load_account(env: &Env, user: &Address) -> UserAccount {
    read_account(env, user).unwrap_or_default()
}

/// Writes `account`, appending `user` to the holder index on first write.
pub fn write_account(env: &Env, user: &Address, account: &UserAccount) {
    let key = DataKey::Account(user.clone());
    if !env.storage().persistent().has(&key) {
        let count = holder_count(env);
        let holder_key = DataKey::Holder(count);
        env.storage().persistent().set(&holder_key, user);
        env.storage()
            .persistent()
            .extend_ttl(&holder_key, ACCOUNT_TTL_THRESHOLD, ACCOUNT_TTL_EXTEND);
        env.storage().instance().set(&DataKey::HolderCount, &(count + 1));
    }
    env.storage().persistent().set(&key, account);
    env.storage()
        .persistent()
        .extend_ttl(&key, ACCOUNT_TTL_THRESHOLD, ACCOUNT_TTL_EXTEND);
}

pub fn holder_count(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::HolderCount).unwrap_or(0)
}

pub fn holder_at(env: &Env, index: u32) -> Option<Address> {
    let key = DataKey::Holder(index);
    let holder = env.storage().persistent().get(&key);
    if holder.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, ACCOUNT_TTL_THRESHOLD, ACCOUNT_TTL_EXTEND);
    }
    holder
}
