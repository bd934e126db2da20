//! Strategy catalogue and reserve split.
//!
//! Strategies are per-user risk labels. They do not move funds: the split
//! between reserve and yield source is governed by the vault-wide
//! `reserve_ratio` in [`VaultLimits`](crate::storage::VaultLimits).

use soroban_sdk::contracttype;

use crate::error::VaultError;

const PERCENT: i128 = 100;

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StrategyKind {
    Conservative = 0,
    Balanced = 1,
    Growth = 2,
}

/// Fixed parameters of a strategy.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Strategy {
    pub kind: StrategyKind,
    /// Share of funds nominally supplied to the yield source (percent)
    pub yield_allocation_pct: u32,
    /// Share of funds nominally kept liquid (percent)
    pub reserve_allocation_pct: u32,
    pub target_apy_bps: u32,
    /// 1 (lowest) to 5 (highest)
    pub risk_level: u32,
}

impl StrategyKind {
    pub fn from_id(id: u32) -> Result<Self, VaultError> {
        match id {
            0 => Ok(StrategyKind::Conservative),
            1 => Ok(StrategyKind::Balanced),
            2 => Ok(StrategyKind::Growth),
            _ => Err(VaultError::InvalidStrategy),
        }
    }

    pub fn params(self) -> Strategy {
        let (yield_allocation_pct, reserve_allocation_pct, target_apy_bps, risk_level) = match self {
            StrategyKind::Conservative => (100, 0, 500, 1),
            StrategyKind::Balanced => (90, 10, 450, 3),
            StrategyKind::Growth => (80, 20, 400, 5),
        };
        Strategy {
            kind: self,
            yield_allocation_pct,
            reserve_allocation_pct,
            target_apy_bps,
            risk_level,
        }
    }
}

/// Splits a deposit into `(reserve, yield_source)` portions.
///
/// The reserve portion rounds down; the yield source receives the remainder.
pub fn split_deposit(amount: i128, reserve_ratio: u32) -> Result<(i128, i128), VaultError> {
    let to_reserve = reserve_target(amount, reserve_ratio)?;
    Ok((to_reserve, amount - to_reserve))
}

/// Reserve the vault should hold for `total_assets` at `reserve_ratio` percent.
pub fn reserve_target(total_assets: i128, reserve_ratio: u32) -> Result<i128, VaultError> {
    total_assets
        .checked_mul(reserve_ratio as i128)
        .map(|v| v / PERCENT)
        .ok_or(VaultError::MathOverflow)
}
