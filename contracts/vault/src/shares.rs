//! Share accounting.
//!
//! Every conversion rounds in the vault's favour: deposits mint
//! `floor(amount * S / A)`, withdrawals burn `ceil(amount * S / A)` and share
//! values are `floor(shares * A / S)`. Neither operation can lower the share
//! price, and a deposit followed by a withdrawal never returns more than was
//! put in.

use soroban_sdk::Env;

use crate::error::VaultError;
use crate::storage::{self, DataKey, UserAccount};

/// Fixed-point scale of reported share prices (7 decimals, as Stellar tokens).
pub const PRICE_SCALE: i128 = 10_000_000;

fn mul_div_floor(a: i128, b: i128, denominator: i128) -> Result<i128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::DivisionByZero);
    }
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or(VaultError::MathOverflow)
}

fn mul_div_ceil(a: i128, b: i128, denominator: i128) -> Result<i128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(VaultError::MathOverflow)?;
    let quotient = product / denominator;
    if product % denominator == 0 {
        Ok(quotient)
    } else {
        quotient.checked_add(1).ok_or(VaultError::MathOverflow)
    }
}

/// Shares minted for a deposit of `amount`, given the totals before it.
///
/// The first deposit (no shares outstanding) mints 1:1.
pub fn shares_for_deposit(
    amount: i128,
    total_assets_before: i128,
    total_shares_before: i128,
) -> Result<i128, VaultError> {
    if amount <= 0 {
        return Err(VaultError::InvalidAmount);
    }
    if total_shares_before == 0 {
        return Ok(amount);
    }
    mul_div_floor(amount, total_shares_before, total_assets_before)
}

/// Asset value of `shares`.
pub fn assets_for_shares(shares: i128, total_assets: i128, total_shares: i128) -> Result<i128, VaultError> {
    if total_shares == 0 {
        return Ok(0);
    }
    mul_div_floor(shares, total_assets, total_shares)
}

/// Shares burned to pay out exactly `amount`.
pub fn shares_for_withdrawal(amount: i128, total_assets: i128, total_shares: i128) -> Result<i128, VaultError> {
    if amount <= 0 {
        return Err(VaultError::InvalidAmount);
    }
    mul_div_ceil(amount, total_shares, total_assets)
}

/// Assets per share scaled by [`PRICE_SCALE`]. An empty vault prices at 1.
pub fn share_price(total_assets: i128, total_shares: i128) -> Result<i128, VaultError> {
    if total_shares == 0 {
        return Ok(PRICE_SCALE);
    }
    mul_div_floor(total_assets, PRICE_SCALE, total_shares)
}

/// Credits `shares` to `account` and to the vault total.
///
/// The caller persists `account`.
pub fn mint(env: &Env, account: &mut UserAccount, shares: i128) -> Result<(), VaultError> {
    if shares <= 0 {
        return Err(VaultError::InvalidAmount);
    }
    account.shares = account
        .shares
        .checked_add(shares)
        .ok_or(VaultError::MathOverflow)?;
    storage::add_amount(env, &DataKey::TotalShares, shares)?;
    Ok(())
}

/// Debits `shares` from `account` and from the vault total.
pub fn burn(env: &Env, account: &mut UserAccount, shares: i128) -> Result<(), VaultError> {
    if shares <= 0 {
        return Err(VaultError::InvalidAmount);
    }
    if shares > account.shares {
        return Err(VaultError::InsufficientShares);
    }
    account.shares -= shares;
    storage::add_amount(env, &DataKey::TotalShares, -shares)?;
    Ok(())
}
