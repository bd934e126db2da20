//! # SeedVault Lending Pool
//!
//! A minimal single-asset lending pool used as the vault's yield source on
//! testnets and in tests. Suppliers deposit the pool asset and their position
//! accrues interest at a configurable APY (basis points).
//!
//! ## Interest Model
//!
//! The pool keeps a single liquidity index, starting at [`INDEX_SCALE`]:
//!
//! ```text
//! index' = index + index * apy_bps * elapsed_seconds / (10_000 * SECONDS_PER_YEAR)
//! balance = principal * index_now / index_at_last_settlement
//! ```
//!
//! The index is brought up to date on every `supply`, `withdraw` and
//! `set_apy`, so a rate change only applies from the moment it is made and
//! interest already earned is never recomputed. Positions are settled against
//! the index whenever they are touched. `balance_of` reports the accrued
//! balance without writing it. Interest is paid out of the pool's own token
//! balance, so the owner must keep the pool funded; a withdrawal the pool
//! cannot cover fails.
//!
//! ## Storage Layout
//!
//! ### Instance Storage
//! - `Owner`, `Asset`, `Apy`, `Paused`, `TotalSupplied`
//! - `Index`, `IndexUpdated`: liquidity index and the timestamp it was last brought up to date
//!
//! ### Persistent Storage
//! - `Position(account)`: settled principal and the index it was settled at

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, token, Address, Env,
};

/// Default APY in basis points (5%).
pub const DEFAULT_APY_BPS: u32 = 500;

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Fixed-point scale of the liquidity index.
pub const INDEX_SCALE: i128 = 1_000_000_000;

const BPS_DENOMINATOR: i128 = 10_000;

const POSITION_TTL_THRESHOLD: u32 = 100_000;
const POSITION_TTL_EXTEND: u32 = 500_000;


// ============================================================================
// ERRORS
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidAmount = 3,
    InsufficientBalance = 4,
    Paused = 5,
    InvalidConfig = 6,
}


// ============================================================================
// STORAGE KEYS
// ============================================================================

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    Asset,
    Apy,
    Paused,
    /// Sum of settled principals across all positions
    TotalSupplied,
    Index,
    IndexUpdated,
    Position(Address),
}

/// A supplier's position.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Principal including all interest settled so far
    pub principal: i128,
    /// Liquidity index at the last settlement
    pub index: i128,
}


// ============================================================================
// EVENTS
// ============================================================================

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SupplyEvent {
    pub account: Address,
    pub amount: i128,
    pub balance: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolWithdrawEvent {
    pub account: Address,
    pub amount: i128,
    pub balance: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApyUpdatedEvent {
    pub old_apy: u32,
    pub new_apy: u32,
}


// ============================================================================
// CONTRACT
// ============================================================================

#[contract]
pub struct LendingPool;

#[contractimpl]
impl LendingPool {
    /// Initializes the pool for a single asset.
    ///
    /// # Errors
    /// - `AlreadyInitialized` if called twice
    /// - `InvalidConfig` if `apy_bps` exceeds 100%
    pub fn initialize(env: Env, owner: Address, asset: Address, apy_bps: u32) -> Result<(), PoolError> {
        if env.storage().instance().has(&DataKey::Owner) {
            return Err(PoolError::AlreadyInitialized);
        }
        if apy_bps as i128 > BPS_DENOMINATOR {
            return Err(PoolError::InvalidConfig);
        }

        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Asset, &asset);
        env.storage().instance().set(&DataKey::Apy, &apy_bps);
        env.storage().instance().set(&DataKey::Paused, &false);
        env.storage().instance().set(&DataKey::TotalSupplied, &0_i128);
        env.storage().instance().set(&DataKey::Index, &INDEX_SCALE);
        env.storage()
            .instance()
            .set(&DataKey::IndexUpdated, &env.ledger().timestamp());
        Ok(())
    }

    /// Supplies `amount` of the pool asset from `from`.
    ///
    /// Pulls the tokens with a plain `transfer`, so a contract caller must
    /// pre-authorize that nested transfer.
    pub fn supply(env: Env, from: Address, amount: i128) -> Result<(), PoolError> {
        from.require_auth();
        Self::require_not_paused(&env)?;
        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }

        let asset = Self::read_asset(&env)?;
        let index = Self::update_index(&env);
        let mut position = Self::settle(&env, &from, index);
        position.principal += amount;
        Self::write_position(&env, &from, &position);
        Self::add_total(&env, amount);

        token::Client::new(&env, &asset).transfer(&from, &env.current_contract_address(), &amount);

        env.events().publish(
            (symbol_short!("supply"),),
            SupplyEvent { account: from, amount, balance: position.principal },
        );
        Ok(())
    }

    /// Withdraws exactly `amount` (principal plus accrued interest) to `to`.
    ///
    /// Returns the amount transferred. Never returns less than requested: an
    /// amount the position or the pool's liquidity cannot cover fails instead.
    pub fn withdraw(env: Env, to: Address, amount: i128) -> Result<i128, PoolError> {
        to.require_auth();
        Self::require_not_paused(&env)?;
        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }

        let asset = Self::read_asset(&env)?;
        let index = Self::update_index(&env);
        let mut position = Self::settle(&env, &to, index);
        if position.principal < amount {
            log!(&env, "pool withdraw exceeds position", amount, position.principal);
            return Err(PoolError::InsufficientBalance);
        }
        position.principal -= amount;
        Self::write_position(&env, &to, &position);
        Self::add_total(&env, -amount);

        token::Client::new(&env, &asset).transfer(&env.current_contract_address(), &to, &amount);

        env.events().publish(
            (symbol_short!("withdraw"),),
            PoolWithdrawEvent { account: to, amount, balance: position.principal },
        );
        Ok(amount)
    }

    /// Current balance of `account` including interest accrued up to now.
    pub fn balance_of(env: Env, account: Address) -> i128 {
        match Self::read_position(&env, &account) {
            Some(position) => Self::accrue(&position, Self::current_index(&env)),
            None => 0,
        }
    }

    pub fn get_apy(env: Env) -> u32 {
        env.storage().instance().get(&DataKey::Apy).unwrap_or(DEFAULT_APY_BPS)
    }

    /// Sum of settled principals. Interest accrued since the last touch of
    /// each position is not included.
    pub fn total_supplied(env: Env) -> i128 {
        env.storage().instance().get(&DataKey::TotalSupplied).unwrap_or(0)
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage().instance().get(&DataKey::Paused).unwrap_or(false)
    }

    /// Liquidity index as of the current ledger time, scaled by [`INDEX_SCALE`].
    pub fn liquidity_index(env: Env) -> i128 {
        Self::current_index(&env)
    }


    // ==========================================================================
    // ADMINISTRATIVE
    // ==========================================================================

    /// Changes the APY. Interest up to now is locked into the index at the
    /// old rate; the new rate applies from this ledger onwards.
    pub fn set_apy(env: Env, apy_bps: u32) -> Result<(), PoolError> {
        Self::require_owner(&env)?;
        if apy_bps as i128 > BPS_DENOMINATOR {
            return Err(PoolError::InvalidConfig);
        }
        Self::update_index(&env);
        let old_apy = Self::get_apy(env.clone());
        env.storage().instance().set(&DataKey::Apy, &apy_bps);

        env.events().publish(
            (symbol_short!("apy"),),
            ApyUpdatedEvent { old_apy, new_apy: apy_bps },
        );
        Ok(())
    }

    pub fn pause(env: Env) -> Result<(), PoolError> {
        Self::require_owner(&env)?;
        env.storage().instance().set(&DataKey::Paused, &true);
        env.events().publish((symbol_short!("paused"),), true);
        Ok(())
    }

    pub fn unpause(env: Env) -> Result<(), PoolError> {
        Self::require_owner(&env)?;
        env.storage().instance().set(&DataKey::Paused, &false);
        env.events().publish((symbol_short!("paused"),), false);
        Ok(())
    }

    /// Sweeps the pool's entire balance of `token` to the owner.
    ///
    /// Supplier positions are left untouched; this is an owner rescue path.
    pub fn emergency_withdraw(env: Env, token: Address) -> Result<i128, PoolError> {
        let owner = Self::require_owner(&env)?;
        let client = token::Client::new(&env, &token);
        let balance = client.balance(&env.current_contract_address());
        if balance > 0 {
            client.transfer(&env.current_contract_address(), &owner, &balance);
        }
        env.events().publish((symbol_short!("emergency"),), (token, balance));
        Ok(balance)
    }


    // ==========================================================================
    // INTERNAL HELPERS
    // ==========================================================================

    fn require_owner(env: &Env) -> Result<Address, PoolError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(PoolError::NotInitialized)?;
        owner.require_auth();
        Ok(owner)
    }

    fn require_not_paused(env: &Env) -> Result<(), PoolError> {
        let paused: bool = env.storage().instance().get(&DataKey::Paused).unwrap_or(false);
        if paused {
            return Err(PoolError::Paused);
        }
        Ok(())
    }

    fn read_asset(env: &Env) -> Result<Address, PoolError> {
        env.storage()
            .instance()
            .get(&DataKey::Asset)
            .ok_or(PoolError::NotInitialized)
    }

    fn read_position(env: &Env, account: &Address) -> Option<Position> {
        env.storage()
            .persistent()
            .get(&DataKey::Position(account.clone()))
    }

    fn write_position(env: &Env, account: &Address, position: &Position) {
        let key = DataKey::Position(account.clone());
        env.storage().persistent().set(&key, position);
        env.storage()
            .persistent()
            .extend_ttl(&key, POSITION_TTL_THRESHOLD, POSITION_TTL_EXTEND);
    }

    fn add_total(env: &Env, delta: i128) {
        let total: i128 = env.storage().instance().get(&DataKey::TotalSupplied).unwrap_or(0);
        env.storage().instance().set(&DataKey::TotalSupplied, &(total + delta));
    }

    /// Index grown by simple interest since it was last brought up to date.
    fn current_index(env: &Env) -> i128 {
        let index: i128 = env.storage().instance().get(&DataKey::Index).unwrap_or(INDEX_SCALE);
        let now = env.ledger().timestamp();
        let updated: u64 = env.storage().instance().get(&DataKey::IndexUpdated).unwrap_or(now);
        let elapsed = now.saturating_sub(updated) as i128;
        let apy = Self::get_apy(env.clone()) as i128;

        index + index * apy * elapsed / (BPS_DENOMINATOR * SECONDS_PER_YEAR as i128)
    }

    fn update_index(env: &Env) -> i128 {
        let index = Self::current_index(env);
        env.storage().instance().set(&DataKey::Index, &index);
        env.storage()
            .instance()
            .set(&DataKey::IndexUpdated, &env.ledger().timestamp());
        index
    }

    /// Balance of `position` at `index`.
    fn accrue(position: &Position, index: i128) -> i128 {
        if position.index == 0 {
            return position.principal;
        }
        position.principal * index / position.index
    }

    /// Settles `account` against `index`, folding the interest into the pool total.
    fn settle(env: &Env, account: &Address, index: i128) -> Position {
        match Self::read_position(env, account) {
            Some(position) => {
                let principal = Self::accrue(&position, index);
                Self::add_total(env, principal - position.principal);
                Position { principal, index }
            }
            None => Position { principal: 0, index },
        }
    }
}

mod test;
