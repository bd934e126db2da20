#![cfg(test)]

use super::*;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

struct Setup<'a> {
    env: Env,
    pool: LendingPoolClient<'a>,
    token: TokenClient<'a>,
    token_admin: StellarAssetClient<'a>,
    owner: Address,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let asset = env.register_stellar_asset_contract(owner.clone());
    let token = TokenClient::new(&env, &asset);
    let token_admin = StellarAssetClient::new(&env, &asset);

    let pool_id = env.register_contract(None, LendingPool);
    let pool = LendingPoolClient::new(&env, &pool_id);
    pool.initialize(&owner, &asset, &DEFAULT_APY_BPS);

    Setup { env, pool, token, token_admin, owner }
}

#[test]
fn test_initialize_sets_default_apy() {
    let s = setup();
    assert_eq!(s.pool.get_apy(), 500);
    assert!(!s.pool.is_paused());
    assert_eq!(s.pool.total_supplied(), 0);
}

#[test]
fn test_initialize_twice_fails() {
    let s = setup();
    assert_eq!(
        s.pool.try_initialize(&s.owner, &s.token.address, &DEFAULT_APY_BPS),
        Err(Ok(PoolError::AlreadyInitialized))
    );
}

#[test]
fn test_supply_and_withdraw() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &1_000);

    s.pool.supply(&user, &1_000);
    assert_eq!(s.pool.balance_of(&user), 1_000);
    assert_eq!(s.token.balance(&s.pool.address), 1_000);

    let returned = s.pool.withdraw(&user, &400);
    assert_eq!(returned, 400);
    assert_eq!(s.pool.balance_of(&user), 600);
    assert_eq!(s.token.balance(&user), 400);
    assert_eq!(s.pool.total_supplied(), 600);
}

#[test]
fn test_zero_supply_rejected() {
    let s = setup();
    let user = Address::generate(&s.env);
    assert_eq!(s.pool.try_supply(&user, &0), Err(Ok(PoolError::InvalidAmount)));
}

#[test]
fn test_withdraw_more_than_position_rejected() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &100);
    s.pool.supply(&user, &100);

    assert_eq!(s.pool.try_withdraw(&user, &150), Err(Ok(PoolError::InsufficientBalance)));
    assert_eq!(s.pool.balance_of(&user), 100);
}

#[test]
fn test_interest_accrues_over_a_year() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &1_000_000);
    // Interest is paid from pool liquidity.
    s.token_admin.mint(&s.pool.address, &1_000_000);

    s.pool.supply(&user, &1_000_000);
    s.env.ledger().with_mut(|li| li.timestamp += SECONDS_PER_YEAR);

    assert_eq!(s.pool.balance_of(&user), 1_050_000);

    s.pool.withdraw(&user, &1_050_000);
    assert_eq!(s.pool.balance_of(&user), 0);
    assert_eq!(s.token.balance(&user), 1_050_000);
}

#[test]
fn test_unfunded_interest_cannot_be_withdrawn() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &1_000);
    s.pool.supply(&user, &1_000);
    s.env.ledger().with_mut(|li| li.timestamp += SECONDS_PER_YEAR);

    assert_eq!(s.pool.balance_of(&user), 1_050);
    assert!(s.pool.try_withdraw(&user, &1_050).is_err());
    assert_eq!(s.token.balance(&user), 0);
}

#[test]
fn test_set_apy() {
    let s = setup();
    s.pool.set_apy(&350);
    assert_eq!(s.pool.get_apy(), 350);
    assert_eq!(s.pool.try_set_apy(&10_001), Err(Ok(PoolError::InvalidConfig)));
}

#[test]
fn test_apy_change_keeps_earned_interest() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &1_000_000);
    s.pool.supply(&user, &1_000_000);

    s.env.ledger().with_mut(|li| li.timestamp += SECONDS_PER_YEAR);
    assert_eq!(s.pool.balance_of(&user), 1_050_000);

    s.pool.set_apy(&0);
    assert_eq!(s.pool.balance_of(&user), 1_050_000);
    assert_eq!(s.pool.liquidity_index(), INDEX_SCALE * 105 / 100);

    s.env.ledger().with_mut(|li| li.timestamp += SECONDS_PER_YEAR);
    assert_eq!(s.pool.balance_of(&user), 1_050_000);
}

#[test]
fn test_new_apy_applies_only_from_change() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &1_000_000);
    s.pool.supply(&user, &1_000_000);

    s.env.ledger().with_mut(|li| li.timestamp += SECONDS_PER_YEAR / 2);
    s.pool.set_apy(&1_000);
    s.env.ledger().with_mut(|li| li.timestamp += SECONDS_PER_YEAR / 2);

    // 2.5% for the first half, then 10% of 1_025_000 for the second.
    assert_eq!(s.pool.balance_of(&user), 1_076_250);
}

#[test]
fn test_paused_pool_rejects_supply_and_withdraw() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &100);
    s.pool.supply(&user, &50);

    s.pool.pause();
    assert!(s.pool.is_paused());
    assert_eq!(s.pool.try_supply(&user, &50), Err(Ok(PoolError::Paused)));
    assert_eq!(s.pool.try_withdraw(&user, &50), Err(Ok(PoolError::Paused)));

    s.pool.unpause();
    assert_eq!(s.pool.withdraw(&user, &50), 50);
}

#[test]
fn test_emergency_withdraw_sweeps_to_owner() {
    let s = setup();
    let user = Address::generate(&s.env);
    s.token_admin.mint(&user, &100);
    s.pool.supply(&user, &100);

    let swept = s.pool.emergency_withdraw(&s.token.address);
    assert_eq!(swept, 100);
    assert_eq!(s.token.balance(&s.owner), 100);
    assert_eq!(s.token.balance(&s.pool.address), 0);
}

#[test]
#[should_panic]
fn test_emergency_withdraw_requires_owner_auth() {
    let env = Env::default();
    let owner = Address::generate(&env);
    let asset = env.register_stellar_asset_contract(owner.clone());
    let pool_id = env.register_contract(None, LendingPool);
    let pool = LendingPoolClient::new(&env, &pool_id);
    pool.initialize(&owner, &asset, &DEFAULT_APY_BPS);

    // No auths mocked: the owner signature is missing.
    pool.emergency_withdraw(&asset);
}
