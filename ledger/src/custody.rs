//! # Fund Custody Boundary
//!
//! The ledger tracks who owns what; it does not hold tokens itself. Actual
//! fund movement happens through the [`TokenCustody`] capability, provided
//! by the host at construction. The contract is strict:
//!
//! - [`transfer_in`](TokenCustody::transfer_in) pulls a deposit from the
//!   caller into the vault's holdings; [`transfer_out`](TokenCustody::transfer_out)
//!   pays out of the vault's holdings.
//! - Both are all-or-nothing: any failure (insufficient balance,
//!   insufficient pre-authorized allowance, overflow) must reject the whole
//!   transfer. Silent truncation is forbidden.
//! - A failed transfer makes the invoking ledger operation roll back
//!   entirely -- the ledger guarantees that side.
//!
//! [`InMemoryCustody`] is the reference implementation: per-account token
//! balances with vault-directed allowances, the same shape as the ERC-20
//! mint/approve/transferFrom harness the production deployment settles
//! against.

use std::collections::HashMap;

use thiserror::Error;

use crate::identity::AccountId;
use crate::vault::token::TokenId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the fund-custody layer.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// The paying account holds less than the requested amount.
    #[error(
        "insufficient balance: available {available}, requested {requested} (token {token})"
    )]
    InsufficientBalance {
        /// The token being moved.
        token: TokenId,
        /// What the account holds.
        available: u64,
        /// What was requested.
        requested: u64,
    },

    /// The vault has not been authorized to pull this much.
    #[error(
        "insufficient allowance: approved {approved}, requested {requested} (token {token})"
    )]
    InsufficientAllowance {
        /// The token being moved.
        token: TokenId,
        /// What the account approved.
        approved: u64,
        /// What was requested.
        requested: u64,
    },

    /// The vault's own holdings cannot cover a payout. If the ledger's
    /// aggregate invariant holds, this indicates custody-layer corruption,
    /// not a ledger bug.
    #[error("vault holdings insufficient: held {held}, requested {requested} (token {token})")]
    VaultInsufficient {
        /// The token being paid out.
        token: TokenId,
        /// What the vault holds.
        held: u64,
        /// What was requested.
        requested: u64,
    },

    /// A balance would overflow `u64`.
    #[error("balance overflow crediting {amount} (token {token})")]
    Overflow {
        /// The token being credited.
        token: TokenId,
        /// The amount that caused the overflow.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// TokenCustody
// ---------------------------------------------------------------------------

/// Capability for moving funds between external accounts and the vault.
pub trait TokenCustody: Send {
    /// Pulls `amount` of `token` from `from` into the vault's holdings.
    ///
    /// Must verify any pre-authorization the custody model requires and
    /// fail without partial effect.
    fn transfer_in(
        &mut self,
        token: TokenId,
        from: AccountId,
        amount: u64,
    ) -> Result<(), CustodyError>;

    /// Pays `amount` of `token` from the vault's holdings to `to`.
    fn transfer_out(
        &mut self,
        token: TokenId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), CustodyError>;

    /// The vault's current holdings of `token`. Used to pre-check
    /// multi-transfer operations (deactivation) before any state changes.
    fn vault_balance(&self, token: TokenId) -> u64;
}

// ---------------------------------------------------------------------------
// InMemoryCustody
// ---------------------------------------------------------------------------

/// In-process custody: balances, allowances, and the vault's holdings,
/// all in memory. The test-harness and reference implementation.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCustody {
    /// account -> token -> balance.
    balances: HashMap<AccountId, HashMap<TokenId, u64>>,

    /// account -> token -> amount the vault may pull.
    allowances: HashMap<AccountId, HashMap<TokenId, u64>>,

    /// token -> vault holdings.
    vault: HashMap<TokenId, u64>,
}

impl InMemoryCustody {
    /// Creates an empty custody bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits freshly minted tokens to an account.
    pub fn mint(&mut self, token: TokenId, account: AccountId, amount: u64) {
        let balance = self
            .balances
            .entry(account)
            .or_default()
            .entry(token)
            .or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Authorizes the vault to pull up to `amount` from `account`.
    /// Overwrites any previous approval, ERC-20 style.
    pub fn approve(&mut self, token: TokenId, account: AccountId, amount: u64) {
        self.allowances
            .entry(account)
            .or_default()
            .insert(token, amount);
    }

    /// An account's current balance of `token`.
    pub fn balance_of(&self, token: TokenId, account: &AccountId) -> u64 {
        self.balances
            .get(account)
            .and_then(|tokens| tokens.get(&token))
            .copied()
            .unwrap_or(0)
    }

    /// The remaining amount the vault may pull from `account`.
    pub fn allowance_of(&self, token: TokenId, account: &AccountId) -> u64 {
        self.allowances
            .get(account)
            .and_then(|tokens| tokens.get(&token))
            .copied()
            .unwrap_or(0)
    }
}

impl TokenCustody for InMemoryCustody {
    fn transfer_in(
        &mut self,
        token: TokenId,
        from: AccountId,
        amount: u64,
    ) -> Result<(), CustodyError> {
        if amount == 0 {
            return Ok(());
        }
        let approved = self.allowance_of(token, &from);
        if approved < amount {
            return Err(CustodyError::InsufficientAllowance {
                token,
                approved,
                requested: amount,
            });
        }
        let available = self.balance_of(token, &from);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                token,
                available,
                requested: amount,
            });
        }
        let held = self.vault.get(&token).copied().unwrap_or(0);
        let new_held = held
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { token, amount })?;

        // All checks passed; apply everything.
        *self
            .allowances
            .get_mut(&from)
            .and_then(|tokens| tokens.get_mut(&token))
            .expect("allowance entry checked above") -= amount;
        *self
            .balances
            .get_mut(&from)
            .and_then(|tokens| tokens.get_mut(&token))
            .expect("balance entry checked above") -= amount;
        self.vault.insert(token, new_held);
        Ok(())
    }

    fn transfer_out(
        &mut self,
        token: TokenId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), CustodyError> {
        let held = self.vault.get(&token).copied().unwrap_or(0);
        if held < amount {
            return Err(CustodyError::VaultInsufficient {
                token,
                held,
                requested: amount,
            });
        }
        let balance = self.balance_of(token, &to);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { token, amount })?;

        self.vault.insert(token, held - amount);
        self.balances
            .entry(to)
            .or_default()
            .insert(token, new_balance);
        Ok(())
    }

    fn vault_balance(&self, token: TokenId) -> u64 {
        self.vault.get(&token).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::token::{cusd, usdt};

    fn funded(account: AccountId, amount: u64) -> InMemoryCustody {
        let mut custody = InMemoryCustody::new();
        custody.mint(cusd().id, account, amount);
        custody.approve(cusd().id, account, amount);
        custody
    }

    #[test]
    fn mint_and_balance_of() {
        let user = AccountId::random();
        let mut custody = InMemoryCustody::new();
        custody.mint(cusd().id, user, 1_000);
        assert_eq!(custody.balance_of(cusd().id, &user), 1_000);
        assert_eq!(custody.balance_of(usdt().id, &user), 0);
    }

    #[test]
    fn transfer_in_moves_funds_and_consumes_allowance() {
        let user = AccountId::random();
        let mut custody = funded(user, 1_000);

        custody.transfer_in(cusd().id, user, 400).unwrap();
        assert_eq!(custody.balance_of(cusd().id, &user), 600);
        assert_eq!(custody.allowance_of(cusd().id, &user), 600);
        assert_eq!(custody.vault_balance(cusd().id), 400);
    }

    #[test]
    fn transfer_in_rejects_without_allowance() {
        let user = AccountId::random();
        let mut custody = InMemoryCustody::new();
        custody.mint(cusd().id, user, 1_000);

        let err = custody.transfer_in(cusd().id, user, 400).unwrap_err();
        assert!(matches!(err, CustodyError::InsufficientAllowance { .. }));
        // Nothing moved.
        assert_eq!(custody.balance_of(cusd().id, &user), 1_000);
        assert_eq!(custody.vault_balance(cusd().id), 0);
    }

    #[test]
    fn transfer_in_rejects_insufficient_balance() {
        let user = AccountId::random();
        let mut custody = InMemoryCustody::new();
        custody.mint(cusd().id, user, 100);
        custody.approve(cusd().id, user, 1_000);

        let err = custody.transfer_in(cusd().id, user, 400).unwrap_err();
        assert!(matches!(
            err,
            CustodyError::InsufficientBalance {
                available: 100,
                requested: 400,
                ..
            }
        ));
        // Allowance untouched on failure.
        assert_eq!(custody.allowance_of(cusd().id, &user), 1_000);
    }

    #[test]
    fn transfer_out_pays_from_vault() {
        let user = AccountId::random();
        let mut custody = funded(user, 1_000);
        custody.transfer_in(cusd().id, user, 1_000).unwrap();

        custody.transfer_out(cusd().id, user, 999).unwrap();
        assert_eq!(custody.balance_of(cusd().id, &user), 999);
        assert_eq!(custody.vault_balance(cusd().id), 1);
    }

    #[test]
    fn transfer_out_rejects_overdraw() {
        let user = AccountId::random();
        let mut custody = InMemoryCustody::new();
        let err = custody.transfer_out(cusd().id, user, 1).unwrap_err();
        assert!(matches!(
            err,
            CustodyError::VaultInsufficient {
                held: 0,
                requested: 1,
                ..
            }
        ));
    }

    #[test]
    fn approve_overwrites_previous_allowance() {
        let user = AccountId::random();
        let mut custody = InMemoryCustody::new();
        custody.approve(cusd().id, user, 500);
        custody.approve(cusd().id, user, 200);
        assert_eq!(custody.allowance_of(cusd().id, &user), 200);
    }

    #[test]
    fn tokens_are_isolated() {
        let user = AccountId::random();
        let mut custody = InMemoryCustody::new();
        custody.mint(cusd().id, user, 1_000);
        custody.mint(usdt().id, user, 2_000);
        custody.approve(cusd().id, user, 1_000);

        custody.transfer_in(cusd().id, user, 1_000).unwrap();
        assert_eq!(custody.vault_balance(cusd().id), 1_000);
        assert_eq!(custody.vault_balance(usdt().id), 0);
        assert_eq!(custody.balance_of(usdt().id, &user), 2_000);
    }
}
