//! # Token Ledger
//!
//! Balances of the bridged token on the execution chain.

use shared_types::{short_hex, Address, U256};
use std::collections::HashMap;
use thiserror::Error;

/// Token ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Minting nothing.
    #[error("Mint amount is zero")]
    ZeroAmount,

    /// Balance or supply would exceed `U256::MAX`.
    #[error("Mint of {amount} to {recipient} overflows")]
    Overflow {
        /// Requested amount.
        amount: U256,
        /// Short hex of the recipient.
        recipient: String,
    },
}

/// Balances and total supply.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: HashMap<Address, U256>,
    total_supply: U256,
}

impl TokenLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `recipient`, returning the new balance.
    pub fn mint(&mut self, recipient: Address, amount: U256) -> Result<U256, TokenError> {
        if amount.is_zero() {
            return Err(TokenError::ZeroAmount);
        }
        let overflow = || TokenError::Overflow {
            amount,
            recipient: short_hex(&recipient),
        };
        let supply = self.total_supply.checked_add(amount).ok_or_else(overflow)?;
        let balance = self
            .balance_of(&recipient)
            .checked_add(amount)
            .ok_or_else(overflow)?;

        self.total_supply = supply;
        self.balances.insert(recipient, balance);
        Ok(balance)
    }

    /// Balance of an account.
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }
}
