//! Event payloads.
//!
//! Every state-changing entry point publishes one event under a short symbol
//! topic so indexers and front ends can follow balances without polling.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::storage::VaultLimits;
use crate::strategy::StrategyKind;
use crate::verification::VerificationMode;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultInitializedEvent {
    pub owner: Address,
    pub asset: Address,
    pub yield_source: Address,
    pub limits: VaultLimits,
}

/// Topic `deposit`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub user: Address,
    pub amount: i128,
    pub shares: i128,
    /// Share price after the deposit, scaled by `PRICE_SCALE`
    pub share_price: i128,
}

/// Topic `withdraw`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub user: Address,
    pub amount: i128,
    pub shares: i128,
    pub share_price: i128,
    /// Portion pulled from the yield source because the reserve was short
    pub from_yield_source: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyChangedEvent {
    pub user: Address,
    pub old_strategy: StrategyKind,
    pub new_strategy: StrategyKind,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerifiedEvent {
    pub user: Address,
    /// True when the proof was checked against an identity hub
    pub strict: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseEvent {
    pub paused: bool,
    pub caller: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawEvent {
    pub token: Address,
    pub amount: i128,
    pub recipient: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LimitsUpdatedEvent {
    pub old_limits: VaultLimits,
    pub new_limits: VaultLimits,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RebalanceEvent {
    pub reserve_before: i128,
    pub reserve_after: i128,
    pub yield_source_after: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerificationModeEvent {
    pub mode: VerificationMode,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleUpdatedEvent {
    pub old_oracle: Option<Address>,
    pub new_oracle: Address,
}

/// Topic `funded`. Owner capital returned to the reserve.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReserveFundedEvent {
    pub funder: Address,
    pub amount: i128,
    pub reserve_after: i128,
}

pub(crate) fn initialized(env: &Env, event: VaultInitializedEvent) {
    env.events().publish((symbol_short!("init"),), event);
}

pub(crate) fn deposit(env: &Env, event: DepositEvent) {
    env.events().publish((symbol_short!("deposit"),), event);
}

pub(crate) fn withdraw(env: &Env, event: WithdrawEvent) {
    env.events().publish((symbol_short!("withdraw"),), event);
}

pub(crate) fn strategy_changed(env: &Env, event: StrategyChangedEvent) {
    env.events().publish((symbol_short!("strategy"),), event);
}

pub(crate) fn verified(env: &Env, event: VerifiedEvent) {
    env.events().publish((symbol_short!("verified"),), event);
}

pub(crate) fn paused(env: &Env, event: PauseEvent) {
    let topic = if event.paused {
        symbol_short!("paused")
    } else {
        symbol_short!("unpaused")
    };
    env.events().publish((topic,), event);
}

pub(crate) fn emergency_withdraw(env: &Env, event: EmergencyWithdrawEvent) {
    env.events().publish((symbol_short!("emergency"),), event);
}

pub(crate) fn limits_updated(env: &Env, event: LimitsUpdatedEvent) {
    env.events().publish((symbol_short!("limits"),), event);
}

pub(crate) fn rebalanced(env: &Env, event: RebalanceEvent) {
    env.events().publish((symbol_short!("rebalance"),), event);
}

pub(crate) fn verification_mode(env: &Env, event: VerificationModeEvent) {
    env.events().publish((symbol_short!("vmode"),), event);
}

pub(crate) fn oracle_updated(env: &Env, event: OracleUpdatedEvent) {
    env.events().publish((symbol_short!("oracle"),), event);
}

pub(crate) fn reserve_funded(env: &Env, event: ReserveFundedEvent) {
    env.events().publish((symbol_short!("funded"),), event);
}
