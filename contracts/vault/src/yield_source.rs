//! Yield source (lending pool) interface and the vault-side call wrappers.
//!
//! A failed or short yield-source call surfaces as `LiquidityUnavailable`;
//! nothing is partially applied.

use soroban_sdk::{
    auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation},
    contractclient, log, vec, Address, Env, IntoVal, Symbol,
};

use crate::error::VaultError;

#[contractclient(name = "YieldSourceClient")]
pub trait YieldSource {
    /// Pulls `amount` of the pool asset from `from` via `transfer`.
    fn supply(env: Env, from: Address, amount: i128);
    /// Sends exactly `amount` to `to` and returns it, or fails.
    fn withdraw(env: Env, to: Address, amount: i128) -> i128;
    fn balance_of(env: Env, account: Address) -> i128;
    fn get_apy(env: Env) -> u32;
}

/// The vault's current balance in the yield source, interest included.
pub fn balance(env: &Env, source: &Address) -> Result<i128, VaultError> {
    match YieldSourceClient::new(env, source).try_balance_of(&env.current_contract_address()) {
        Ok(Ok(balance)) => Ok(balance),
        _ => {
            log!(env, "yield source balance query failed");
            Err(VaultError::LiquidityUnavailable)
        }
    }
}

pub fn apy(env: &Env, source: &Address) -> Result<u32, VaultError> {
    match YieldSourceClient::new(env, source).try_get_apy() {
        Ok(Ok(apy)) => Ok(apy),
        _ => Err(VaultError::LiquidityUnavailable),
    }
}

/// Supplies `amount` of `asset` from the vault to `source`.
pub fn supply(env: &Env, source: &Address, asset: &Address, amount: i128) -> Result<(), VaultError> {
    let vault = env.current_contract_address();

    // The pool pulls the funds with a nested `transfer(vault, pool, amount)`.
    env.authorize_as_current_contract(vec![
        env,
        InvokerContractAuthEntry::Contract(SubContractInvocation {
            context: ContractContext {
                contract: asset.clone(),
                fn_name: Symbol::new(env, "transfer"),
                args: (vault.clone(), source.clone(), amount).into_val(env),
            },
            sub_invocations: vec![env],
        }),
    ]);

    match YieldSourceClient::new(env, source).try_supply(&vault, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "yield source supply failed", amount);
            Err(VaultError::LiquidityUnavailable)
        }
    }
}

/// Withdraws exactly `amount` from `source` into the vault.
pub fn withdraw(env: &Env, source: &Address, amount: i128) -> Result<(), VaultError> {
    let vault = env.current_contract_address();
    match YieldSourceClient::new(env, source).try_withdraw(&vault, &amount) {
        Ok(Ok(returned)) if returned == amount => Ok(()),
        Ok(Ok(returned)) => {
            log!(env, "yield source returned short withdrawal", amount, returned);
            Err(VaultError::LiquidityUnavailable)
        }
        _ => {
            log!(env, "yield source withdrawal failed", amount);
            Err(VaultError::LiquidityUnavailable)
        }
    }
}
