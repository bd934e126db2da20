//! # SeedVault Contract
//!
//! A share-based yield vault for a single stablecoin on Stellar. Verified users
//! deposit the asset, the vault keeps a liquid reserve and supplies the rest to
//! a lending pool (the yield source), and each depositor owns a proportional
//! claim on the pooled assets through vault shares.
//!
//! ## Share Accounting Model
//!
//! - `total_assets = reserve + yield_source.balance_of(vault)`
//! - The first deposit mints shares 1:1; later deposits mint
//!   `floor(amount * total_shares / total_assets)`
//! - Withdrawals are amount-based and burn `ceil(amount * total_shares / total_assets)`
//! - Rounding always favours the vault, so the share price only moves up
//!   (interest) and never down from a deposit or a withdrawal
//! - The reserve is tracked internally: tokens sent straight to the vault do
//!   not change the share price
//!
//! ## Asset Flow
//!
//! ```text
//! Deposit Flow:
//! User ─approve─► [Token]
//! User → [Vault.deposit()] → transfer_from(user → vault)
//!                          ↓
//!        shares minted, reserve_ratio% kept as reserve
//!                          ↓
//!        remainder → [YieldSource.supply()]
//!
//! Withdraw Flow:
//! User → [Vault.withdraw(amount)] → shares burned
//!                                 ↓
//!        paid from reserve first, shortfall ← [YieldSource.withdraw()]
//!                                 ↓
//!        transfer(vault → user)
//! ```
//!
//! ## Verification
//!
//! Every balance-affecting call (`deposit`, `withdraw`, `change_strategy`)
//! requires the caller to be verified. See [`verification`] for the permissive
//! and strict modes, and `set_verified` for the oracle path.
//!
//! ## Storage Layout
//!
//! ### Instance Storage (Contract-Wide)
//! - `Owner`, `Asset`, `YieldSource`, `Limits`, `Paused`, `Verification`, `Oracle`
//! - `TotalShares`, `Reserve`, `TotalDeposited`, `TotalWithdrawn`
//! - `Locked`: non-reentrant lock, `Version`, `HolderCount`
//!
//! ### Persistent Storage (Per-User)
//! - `Account(user)`: shares, strategy, verification flag, history
//! - `Holder(i)`: dense index of every address that has an account
//!
//! ## Trust Model
//!
//! The owner is a single key. It can pause the vault, change limits and the
//! verification mode, and sweep funds with `emergency_withdraw` even while the
//! vault is paused. Production deployments should put a multisig or timelock
//! behind the owner address.
//!
//! # Examples
//!
//! ```ignore
//! token_client.approve(&user, &vault_address, &amount, &expiration_ledger);
//! vault_client.deposit(&user, &amount);
//! vault_client.withdraw(&user, &amount);
//! ```

#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Bytes, Env};

pub mod error;
pub mod events;
mod guard;
pub mod shares;
pub mod storage;
pub mod strategy;
pub mod verification;
pub mod yield_source;

pub use error::VaultError;
pub use shares::PRICE_SCALE;
pub use storage::{UserAccount, VaultLimits};
pub use strategy::{Strategy, StrategyKind};
pub use verification::{Disclosure, StrictPolicy, VerificationMode};

use events::{
    DepositEvent, EmergencyWithdrawEvent, LimitsUpdatedEvent, OracleUpdatedEvent, PauseEvent,
    RebalanceEvent, ReserveFundedEvent, StrategyChangedEvent, VaultInitializedEvent,
    VerificationModeEvent, VerifiedEvent, WithdrawEvent,
};
use storage::DataKey;


// ============================================================================
// DEFAULTS
// ============================================================================

/// One unit of a 7-decimal Stellar asset.
pub const UNIT: i128 = 10_000_000;
/// 1 unit.
pub const DEFAULT_MIN_DEPOSIT: i128 = UNIT;
/// 10,000 units per deposit.
pub const DEFAULT_MAX_DEPOSIT: i128 = 10_000 * UNIT;
/// 100,000 units total.
pub const DEFAULT_MAX_TVL: i128 = 100_000 * UNIT;
/// 10% of each deposit stays liquid.
pub const DEFAULT_RESERVE_RATIO: u32 = 10;

impl VaultLimits {
    pub fn defaults() -> Self {
        VaultLimits {
            min_deposit: DEFAULT_MIN_DEPOSIT,
            max_deposit: DEFAULT_MAX_DEPOSIT,
            max_tvl: DEFAULT_MAX_TVL,
            reserve_ratio: DEFAULT_RESERVE_RATIO,
        }
    }
}

/// Aggregate vault figures, read in a single invocation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultStats {
    pub total_assets: i128,
    pub total_shares: i128,
    pub reserve_balance: i128,
    pub yield_source_balance: i128,
    pub total_deposited: i128,
    pub total_withdrawn: i128,
}


// ============================================================================
// CONTRACT
// ============================================================================

/// SeedVault - verified-access yield vault.
///
/// # Security Model
///
/// - Users act only on their own account (`require_auth()`)
/// - Admin calls name the caller explicitly; anyone but the owner gets `Unauthorized`
/// - Mutating calls hold a non-reentrant lock and update the ledger before any
///   token or yield-source call
/// - Any error rolls back the whole invocation
#[contract]
pub struct SeedVault;

#[contractimpl]
impl SeedVault {

    // ==========================================================================
    // INITIALIZATION
    // ==========================================================================

    /// Initializes the vault.
    ///
    /// The verification mode has no default: deployments must choose between
    /// `Permissive` (testnets) and `Strict`.
    ///
    /// # Arguments
    /// * `owner` - Admin key for pause, limits and emergency calls
    /// * `asset` - Stellar token contract of the deposit asset
    /// * `yield_source` - Lending pool implementing [`yield_source::YieldSource`]
    /// * `limits` - Deposit limits and reserve ratio
    /// * `mode` - Verification mode
    ///
    /// # Errors
    /// - `AlreadyInitialized` if called twice
    /// - `InvalidConfig` if `limits` are inconsistent
    ///
    /// # Events
    /// Emits `VaultInitializedEvent`
    pub fn initialize(
        env: Env,
        owner: Address,
        asset: Address,
        yield_source: Address,
        limits: VaultLimits,
        mode: VerificationMode,
    ) -> Result<(), VaultError> {
        if storage::is_initialized(&env) {
            return Err(VaultError::AlreadyInitialized);
        }
        limits.validate()?;

        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Asset, &asset);
        env.storage().instance().set(&DataKey::YieldSource, &yield_source);
        env.storage().instance().set(&DataKey::Version, &storage::VERSION);
        storage::write_limits(&env, &limits);
        storage::write_verification_mode(&env, &mode);
        storage::set_paused(&env, false);
        storage::write_amount(&env, &DataKey::TotalShares, 0);
        storage::write_amount(&env, &DataKey::Reserve, 0);
        storage::write_amount(&env, &DataKey::TotalDeposited, 0);
        storage::write_amount(&env, &DataKey::TotalWithdrawn, 0);
        storage::bump_instance(&env);

        events::initialized(
            &env,
            VaultInitializedEvent { owner, asset, yield_source, limits },
        );
        Ok(())
    }


    // ==========================================================================
    // CORE LIFECYCLE - DEPOSIT
    // ==========================================================================

    /// Deposits `amount` of the asset and mints shares to `user`.
    ///
    /// The user must have approved the vault for at least `amount`.
    ///
    /// # Returns
    /// Shares minted.
    ///
    /// # Errors
    /// Checked in this order:
    /// - `Paused`
    /// - `NotVerified`
    /// - `InvalidAmount` if `amount <= 0` or it would mint zero shares
    /// - `BelowMinimum`, `ExceedsMaxDeposit`
    /// - `LiquidityUnavailable` if shares are outstanding but the vault holds
    ///   no assets (after an emergency sweep; see `fund_reserve`)
    /// - `ExceedsMaxTvl` if total assets would pass `max_tvl`
    /// - `TransferFailed` if the allowance or balance is insufficient
    /// - `LiquidityUnavailable` if the yield source rejects the supply
    ///
    /// # Events
    /// Emits `DepositEvent`
    pub fn deposit(env: Env, user: Address, amount: i128) -> Result<i128, VaultError> {
        user.require_auth();
        storage::bump_instance(&env);
        guard::non_reentrant(&env, || Self::process_deposit(&env, &user, amount))
    }


    // ==========================================================================
    // CORE LIFECYCLE - WITHDRAW
    // ==========================================================================

    /// Withdraws exactly `amount` of the asset to `user`, burning shares.
    ///
    /// The reserve pays first; any shortfall is pulled from the yield source.
    ///
    /// # Returns
    /// Shares burned.
    ///
    /// # Errors
    /// - `Paused`, `NotVerified`
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientBalance` if the user's shares are worth less than `amount`
    /// - `LiquidityUnavailable` if the yield source cannot return the shortfall
    /// - `TransferFailed`
    ///
    /// # Events
    /// Emits `WithdrawEvent`
    pub fn withdraw(env: Env, user: Address, amount: i128) -> Result<i128, VaultError> {
        user.require_auth();
        storage::bump_instance(&env);
        guard::non_reentrant(&env, || Self::process_withdraw(&env, &user, amount))
    }


    // ==========================================================================
    // STRATEGY
    // ==========================================================================

    /// Changes the user's strategy label.
    ///
    /// Strategies do not move funds; see [`strategy`].
    ///
    /// # Errors
    /// - `NotVerified`
    /// - `InvalidStrategy` if `strategy_id` is not 0, 1 or 2
    /// - `SameStrategy` if it is already selected
    pub fn change_strategy(env: Env, user: Address, strategy_id: u32) -> Result<(), VaultError> {
        user.require_auth();
        storage::bump_instance(&env);
        guard::non_reentrant(&env, || {
            if !verification::is_verified(&env, &user) {
                return Err(VaultError::NotVerified);
            }
            let new_strategy = StrategyKind::from_id(strategy_id)?;
            let mut account = storage::load_account(&env, &user);
            if account.strategy == new_strategy {
                return Err(VaultError::SameStrategy);
            }

            let old_strategy = account.strategy;
            account.strategy = new_strategy;
            account.last_activity = env.ledger().timestamp();
            storage::write_account(&env, &user, &account);

            events::strategy_changed(
                &env,
                StrategyChangedEvent { user: user.clone(), old_strategy, new_strategy },
            );
            Ok(())
        })
    }

    /// Strategy selected by `user`; `Conservative` if none was chosen.
    pub fn user_strategy(env: Env, user: Address) -> StrategyKind {
        storage::load_account(&env, &user).strategy
    }

    /// Parameters of strategy `strategy_id`.
    pub fn get_strategy(_env: Env, strategy_id: u32) -> Result<Strategy, VaultError> {
        Ok(StrategyKind::from_id(strategy_id)?.params())
    }


    // ==========================================================================
    // VERIFICATION
    // ==========================================================================

    /// Verifies `user` with an identity proof.
    ///
    /// # Arguments
    /// * `proof` - Disclosure proof; ignored in permissive mode
    /// * `context` - Hub-specific user context passed through with the proof
    ///
    /// # Errors
    /// - `AlreadyVerified`
    /// - `ProofRejected` in strict mode when the proof or its disclosure fails
    ///
    /// # Events
    /// Emits `VerifiedEvent`
    pub fn verify(env: Env, user: Address, proof: Bytes, context: Bytes) -> Result<(), VaultError> {
        user.require_auth();
        storage::bump_instance(&env);
        guard::non_reentrant(&env, || {
            if verification::is_verified(&env, &user) {
                return Err(VaultError::AlreadyVerified);
            }
            let mode = storage::read_verification_mode(&env)?;
            verification::check_proof(&env, &mode, &user, &proof, &context)?;
            verification::mark_verified(&env, &user)?;

            let strict = matches!(mode, VerificationMode::Strict(_));
            events::verified(&env, VerifiedEvent { user: user.clone(), strict });
            Ok(())
        })
    }

    /// Marks `user` verified on behalf of the configured verification oracle.
    ///
    /// # Errors
    /// - `Unauthorized` if no oracle is configured or `oracle` is not it
    /// - `AlreadyVerified`
    pub fn set_verified(env: Env, oracle: Address, user: Address) -> Result<(), VaultError> {
        oracle.require_auth();
        storage::bump_instance(&env);
        match storage::read_oracle(&env) {
            Some(configured) if configured == oracle => {}
            _ => return Err(VaultError::Unauthorized),
        }
        verification::mark_verified(&env, &user)?;
        events::verified(&env, VerifiedEvent { user, strict: false });
        Ok(())
    }

    pub fn is_verified(env: Env, user: Address) -> bool {
        verification::is_verified(&env, &user)
    }


    // ==========================================================================
    // ADMINISTRATIVE - PAUSE CONTROL
    // ==========================================================================

    /// Pauses deposits, withdrawals and rebalancing. Reads and
    /// `emergency_withdraw` stay available.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    ///
    /// # Events
    /// Emits `PauseEvent` under topic `paused`
    pub fn pause(env: Env, caller: Address) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        storage::set_paused(&env, true);
        events::paused(&env, PauseEvent { paused: true, caller });
        Ok(())
    }

    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `NotPaused` if the vault is not paused
    ///
    /// # Events
    /// Emits `PauseEvent` under topic `unpaused`
    pub fn unpause(env: Env, caller: Address) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        if !storage::is_paused(&env) {
            return Err(VaultError::NotPaused);
        }
        storage::set_paused(&env, false);
        events::paused(&env, PauseEvent { paused: false, caller });
        Ok(())
    }

    /// Sends `amount` of `token` held by the vault to the owner.
    ///
    /// Works while paused. For the deposit asset, a shortfall over the vault's
    /// token balance is first withdrawn from the yield source, and the tracked
    /// reserve is clamped to what is left. Share accounting is not adjusted:
    /// this is an admin rescue path and relies on the owner being trusted.
    ///
    /// # Errors
    /// - `Unauthorized`, `InvalidAmount`
    /// - `LiquidityUnavailable`, `TransferFailed`
    ///
    /// # Events
    /// Emits `EmergencyWithdrawEvent`
    pub fn emergency_withdraw(env: Env, caller: Address, token: Address, amount: i128) -> Result<(), VaultError> {
        let owner = Self::require_owner(&env, &caller)?;
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }
        guard::non_reentrant(&env, || {
            let vault = env.current_contract_address();
            let client = token::Client::new(&env, &token);
            let asset = storage::read_asset(&env)?;

            if token == asset {
                let on_hand = client.balance(&vault);
                let reserve = storage::read_amount(&env, &DataKey::Reserve);
                let left = if on_hand > amount { on_hand - amount } else { 0 };
                if reserve > left {
                    storage::write_amount(&env, &DataKey::Reserve, left);
                }
                if on_hand < amount {
                    let source = storage::read_yield_source(&env)?;
                    yield_source::withdraw(&env, &source, amount - on_hand)?;
                }
            }

            match client.try_transfer(&vault, &owner, &amount) {
                Ok(Ok(())) => {}
                _ => return Err(VaultError::TransferFailed),
            }

            log!(&env, "emergency withdraw", token.clone(), amount);
            events::emergency_withdraw(
                &env,
                EmergencyWithdrawEvent { token: token.clone(), amount, recipient: owner.clone() },
            );
            Ok(())
        })
    }


    // ==========================================================================
    // ADMINISTRATIVE - CONFIGURATION
    // ==========================================================================

    /// Replaces the deposit limits and reserve ratio.
    ///
    /// Lowering `max_tvl` below current assets does not affect existing
    /// positions; it only blocks further deposits.
    ///
    /// # Errors
    /// - `Unauthorized`, `InvalidConfig`
    ///
    /// # Events
    /// Emits `LimitsUpdatedEvent`
    pub fn set_limits(env: Env, caller: Address, limits: VaultLimits) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        limits.validate()?;
        let old_limits = storage::read_limits(&env)?;
        storage::write_limits(&env, &limits);
        events::limits_updated(&env, LimitsUpdatedEvent { old_limits, new_limits: limits });
        Ok(())
    }

    /// Sets the percent of each deposit kept in the reserve. Existing funds
    /// move only on `rebalance`.
    pub fn set_reserve_ratio(env: Env, caller: Address, reserve_ratio: u32) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let old_limits = storage::read_limits(&env)?;
        let new_limits = VaultLimits { reserve_ratio, ..old_limits.clone() };
        new_limits.validate()?;
        storage::write_limits(&env, &new_limits);
        events::limits_updated(&env, LimitsUpdatedEvent { old_limits, new_limits });
        Ok(())
    }

    /// Switches verification mode. Already verified users stay verified.
    pub fn set_verification_mode(env: Env, caller: Address, mode: VerificationMode) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        storage::write_verification_mode(&env, &mode);
        events::verification_mode(&env, VerificationModeEvent { mode });
        Ok(())
    }

    /// Sets the address allowed to call `set_verified`.
    pub fn set_oracle(env: Env, caller: Address, oracle: Address) -> Result<(), VaultError> {
        Self::require_owner(&env, &caller)?;
        let old_oracle = storage::read_oracle(&env);
        storage::write_oracle(&env, &oracle);
        events::oracle_updated(&env, OracleUpdatedEvent { old_oracle, new_oracle: oracle });
        Ok(())
    }

    /// Moves `amount` of the asset from the owner into the reserve without
    /// minting shares, raising the value of every outstanding share.
    ///
    /// This is how the vault recovers after `emergency_withdraw` swept its
    /// assets: while shares are outstanding and total assets are zero,
    /// deposits are refused.
    ///
    /// # Errors
    /// - `Unauthorized`, `InvalidAmount`, `TransferFailed`
    ///
    /// # Events
    /// Emits `ReserveFundedEvent`
    pub fn fund_reserve(env: Env, caller: Address, amount: i128) -> Result<(), VaultError> {
        let owner = Self::require_owner(&env, &caller)?;
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }
        guard::non_reentrant(&env, || {
            let asset = storage::read_asset(&env)?;
            let reserve_after = storage::add_amount(&env, &DataKey::Reserve, amount)?;

            let vault = env.current_contract_address();
            match token::Client::new(&env, &asset).try_transfer(&owner, &vault, &amount) {
                Ok(Ok(())) => {}
                _ => return Err(VaultError::TransferFailed),
            }

            events::reserve_funded(
                &env,
                ReserveFundedEvent { funder: owner.clone(), amount, reserve_after },
            );
            Ok(())
        })
    }

    /// Moves funds between reserve and yield source so the reserve matches
    /// `reserve_ratio` percent of total assets.
    ///
    /// When the yield source holds less than the deficit, the reserve is
    /// topped up with what is available.
    ///
    /// # Errors
    /// - `Unauthorized`, `Paused`, `LiquidityUnavailable`
    ///
    /// # Events
    /// Emits `RebalanceEvent`
    pub fn rebalance(env: Env, caller: Address) -> Result<VaultStats, VaultError> {
        Self::require_owner(&env, &caller)?;
        guard::non_reentrant(&env, || {
            if storage::is_paused(&env) {
                return Err(VaultError::Paused);
            }
            let limits = storage::read_limits(&env)?;
            let source = storage::read_yield_source(&env)?;
            let asset = storage::read_asset(&env)?;

            let reserve_before = storage::read_amount(&env, &DataKey::Reserve);
            let in_source = yield_source::balance(&env, &source)?;
            let total_assets = reserve_before
                .checked_add(in_source)
                .ok_or(VaultError::MathOverflow)?;
            let target = strategy::reserve_target(total_assets, limits.reserve_ratio)?;

            if reserve_before > target {
                let excess = reserve_before - target;
                storage::write_amount(&env, &DataKey::Reserve, target);
                yield_source::supply(&env, &source, &asset, excess)?;
            } else if reserve_before < target {
                let deficit = (target - reserve_before).min(in_source);
                if deficit > 0 {
                    storage::write_amount(&env, &DataKey::Reserve, reserve_before + deficit);
                    yield_source::withdraw(&env, &source, deficit)?;
                }
            }

            let stats = Self::snapshot(&env)?;
            events::rebalanced(
                &env,
                RebalanceEvent {
                    reserve_before,
                    reserve_after: stats.reserve_balance,
                    yield_source_after: stats.yield_source_balance,
                },
            );
            Ok(stats)
        })
    }


    // ==========================================================================
    // READ FUNCTIONS
    // ==========================================================================

    /// Asset value of `user`'s shares.
    pub fn balance_of(env: Env, user: Address) -> Result<i128, VaultError> {
        let source = storage::read_yield_source(&env)?;
        let total_assets = Self::total_assets(&env, &source)?;
        let total_shares = storage::read_amount(&env, &DataKey::TotalShares);
        let account = storage::load_account(&env, &user);
        shares::assets_for_shares(account.shares, total_assets, total_shares)
    }

    pub fn shares_of(env: Env, user: Address) -> i128 {
        storage::load_account(&env, &user).shares
    }

    pub fn get_account(env: Env, user: Address) -> Option<UserAccount> {
        storage::read_account(&env, &user)
    }

    /// Yield earned by `user`: current value minus net principal
    /// (`total_deposited - total_withdrawn`), floored at zero.
    ///
    /// A negative result means the vault lost value for this user (e.g. after
    /// an emergency sweep); it is logged and reported as zero.
    pub fn get_earnings(env: Env, user: Address) -> Result<i128, VaultError> {
        let account = storage::load_account(&env, &user);
        let value = Self::balance_of(env.clone(), user.clone())?;
        let principal = account
            .total_deposited
            .checked_sub(account.total_withdrawn)
            .ok_or(VaultError::MathOverflow)?;
        let earnings = value.checked_sub(principal).ok_or(VaultError::MathOverflow)?;
        if earnings < 0 {
            log!(&env, "negative earnings", user, earnings);
            return Ok(0);
        }
        Ok(earnings)
    }

    /// Current yield-source APY in basis points.
    pub fn get_current_apy(env: Env) -> Result<u32, VaultError> {
        let source = storage::read_yield_source(&env)?;
        yield_source::apy(&env, &source)
    }

    pub fn get_vault_stats(env: Env) -> Result<VaultStats, VaultError> {
        Self::snapshot(&env)
    }

    /// Current share price scaled by [`PRICE_SCALE`].
    pub fn share_price(env: Env) -> Result<i128, VaultError> {
        let stats = Self::snapshot(&env)?;
        shares::share_price(stats.total_assets, stats.total_shares)
    }

    pub fn get_limits(env: Env) -> Result<VaultLimits, VaultError> {
        storage::read_limits(&env)
    }

    pub fn get_verification_mode(env: Env) -> Result<VerificationMode, VaultError> {
        storage::read_verification_mode(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    pub fn get_owner(env: Env) -> Result<Address, VaultError> {
        storage::read_owner(&env)
    }

    pub fn get_asset(env: Env) -> Result<Address, VaultError> {
        storage::read_asset(&env)
    }

    pub fn get_yield_source(env: Env) -> Result<Address, VaultError> {
        storage::read_yield_source(&env)
    }

    pub fn get_version(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::Version)
            .unwrap_or(storage::VERSION)
    }

    /// Number of addresses with an account.
    pub fn account_count(env: Env) -> u32 {
        storage::holder_count(&env)
    }

    /// Address at `index` in the holder index (`index < account_count()`).
    pub fn account_at(env: Env, index: u32) -> Option<Address> {
        storage::holder_at(&env, index)
    }


    // ==========================================================================
    // INTERNAL
    // ==========================================================================

    fn process_deposit(env: &Env, user: &Address, amount: i128) -> Result<i128, VaultError> {
        let limits = storage::read_limits(env)?;

        // Checks
        if storage::is_paused(env) {
            return Err(VaultError::Paused);
        }
        if !verification::is_verified(env, user) {
            return Err(VaultError::NotVerified);
        }
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }
        if amount < limits.min_deposit {
            return Err(VaultError::BelowMinimum);
        }
        if amount > limits.max_deposit {
            return Err(VaultError::ExceedsMaxDeposit);
        }

        let source = storage::read_yield_source(env)?;
        let asset = storage::read_asset(env)?;
        let total_assets = Self::total_assets(env, &source)?;
        let total_shares = storage::read_amount(env, &DataKey::TotalShares);
        if total_shares > 0 && total_assets == 0 {
            // Shares with nothing behind them cannot be priced.
            log!(env, "deposit refused: shares outstanding with no assets", total_shares);
            return Err(VaultError::LiquidityUnavailable);
        }
        let assets_after = total_assets
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        if assets_after > limits.max_tvl {
            return Err(VaultError::ExceedsMaxTvl);
        }

        let minted = shares::shares_for_deposit(amount, total_assets, total_shares)?;
        if minted == 0 {
            return Err(VaultError::InvalidAmount);
        }
        let (to_reserve, to_yield) = strategy::split_deposit(amount, limits.reserve_ratio)?;

        // Effects
        let mut account = storage::load_account(env, user);
        shares::mint(env, &mut account, minted)?;
        account.total_deposited = account
            .total_deposited
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        account.last_activity = env.ledger().timestamp();
        storage::write_account(env, user, &account);
        storage::add_amount(env, &DataKey::Reserve, to_reserve)?;
        storage::add_amount(env, &DataKey::TotalDeposited, amount)?;

        // Interactions
        let vault = env.current_contract_address();
        match token::Client::new(env, &asset).try_transfer_from(&vault, user, &vault, &amount) {
            Ok(Ok(())) => {}
            _ => return Err(VaultError::TransferFailed),
        }
        if to_yield > 0 {
            yield_source::supply(env, &source, &asset, to_yield)?;
        }

        let share_price = shares::share_price(assets_after, total_shares + minted)?;
        events::deposit(
            env,
            DepositEvent { user: user.clone(), amount, shares: minted, share_price },
        );
        Ok(minted)
    }

    fn process_withdraw(env: &Env, user: &Address, amount: i128) -> Result<i128, VaultError> {
        // Checks
        if storage::is_paused(env) {
            return Err(VaultError::Paused);
        }
        if !verification::is_verified(env, user) {
            return Err(VaultError::NotVerified);
        }
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }

        let source = storage::read_yield_source(env)?;
        let asset = storage::read_asset(env)?;
        let total_assets = Self::total_assets(env, &source)?;
        let total_shares = storage::read_amount(env, &DataKey::TotalShares);
        let mut account = storage::load_account(env, user);

        let value = shares::assets_for_shares(account.shares, total_assets, total_shares)?;
        if value < amount {
            return Err(VaultError::InsufficientBalance);
        }
        let burned = shares::shares_for_withdrawal(amount, total_assets, total_shares)?;

        // Effects
        shares::burn(env, &mut account, burned)?;
        account.total_withdrawn = account
            .total_withdrawn
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        account.last_activity = env.ledger().timestamp();
        storage::write_account(env, user, &account);

        let reserve = storage::read_amount(env, &DataKey::Reserve);
        let from_reserve = reserve.min(amount);
        let shortfall = amount - from_reserve;
        storage::write_amount(env, &DataKey::Reserve, reserve - from_reserve);
        storage::add_amount(env, &DataKey::TotalWithdrawn, amount)?;

        // Interactions
        if shortfall > 0 {
            yield_source::withdraw(env, &source, shortfall)?;
        }
        let vault = env.current_contract_address();
        match token::Client::new(env, &asset).try_transfer(&vault, user, &amount) {
            Ok(Ok(())) => {}
            _ => return Err(VaultError::TransferFailed),
        }

        let share_price = shares::share_price(total_assets - amount, total_shares - burned)?;
        events::withdraw(
            env,
            WithdrawEvent {
                user: user.clone(),
                amount,
                shares: burned,
                share_price,
                from_yield_source: shortfall,
            },
        );
        Ok(burned)
    }

    fn total_assets(env: &Env, source: &Address) -> Result<i128, VaultError> {
        storage::read_amount(env, &DataKey::Reserve)
            .checked_add(yield_source::balance(env, source)?)
            .ok_or(VaultError::MathOverflow)
    }

    fn snapshot(env: &Env) -> Result<VaultStats, VaultError> {
        let source = storage::read_yield_source(env)?;
        let reserve_balance = storage::read_amount(env, &DataKey::Reserve);
        let yield_source_balance = yield_source::balance(env, &source)?;
        Ok(VaultStats {
            total_assets: reserve_balance
                .checked_add(yield_source_balance)
                .ok_or(VaultError::MathOverflow)?,
            total_shares: storage::read_amount(env, &DataKey::TotalShares),
            reserve_balance,
            yield_source_balance,
            total_deposited: storage::read_amount(env, &DataKey::TotalDeposited),
            total_withdrawn: storage::read_amount(env, &DataKey::TotalWithdrawn),
        })
    }

    /// Checks that `caller` is the owner and has signed.
    fn require_owner(env: &Env, caller: &Address) -> Result<Address, VaultError> {
        let owner = storage::read_owner(env)?;
        if *caller != owner {
            return Err(VaultError::Unauthorized);
        }
        caller.require_auth();
        storage::bump_instance(env);
        Ok(owner)
    }
}
