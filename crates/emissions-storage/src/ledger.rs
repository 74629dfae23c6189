use emissions_types::{AccountAddress, ModuleAccount, TokenAmount, TopicId};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// A party that can hold a balance: a module account or a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LedgerAccount {
    Module(ModuleAccount),
    Account(AccountAddress),
}

impl fmt::Display for LedgerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerAccount::Module(module) => write!(f, "module:{}", module),
            LedgerAccount::Account(address) => write!(f, "{}", address),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient funds in {account}: has {available}, needs {needed}")]
    InsufficientFunds {
        account: LedgerAccount,
        available: TokenAmount,
        needed: TokenAmount,
    },

    #[error("Balance overflow for {0}")]
    Overflow(LedgerAccount),
}

/// Bank and staking capabilities used to move rewards.
///
/// Every call either completes fully or leaves balances untouched.
pub trait Ledger {
    fn send_module_to_module(
        &mut self,
        from: ModuleAccount,
        to: ModuleAccount,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;

    fn send_module_to_account(
        &mut self,
        from: ModuleAccount,
        to: &AccountAddress,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;

    /// Record `amount` as additional stake of `reputer` in the topic
    fn add_stake(
        &mut self,
        topic_id: TopicId,
        reputer: &AccountAddress,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;
}

/// In-memory ledger for testing and development
#[derive(Debug, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<LedgerAccount, TokenAmount>,
    stakes: BTreeMap<(TopicId, AccountAddress), TokenAmount>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` into a module account
    pub fn fund_module(&mut self, module: ModuleAccount, amount: TokenAmount) {
        let entry = self
            .balances
            .entry(LedgerAccount::Module(module))
            .or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn module_balance(&self, module: ModuleAccount) -> TokenAmount {
        self.balance_of(LedgerAccount::Module(module))
    }

    pub fn account_balance(&self, address: &AccountAddress) -> TokenAmount {
        self.balance_of(LedgerAccount::Account(*address))
    }

    pub fn stake_of(&self, topic_id: TopicId, reputer: &AccountAddress) -> TokenAmount {
        self.stakes
            .get(&(topic_id, *reputer))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of all balances; stakes are bookkeeping over the staking module
    pub fn total_supply(&self) -> TokenAmount {
        self.balances.values().copied().sum()
    }

    fn balance_of(&self, account: LedgerAccount) -> TokenAmount {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn transfer(
        &mut self,
        from: LedgerAccount,
        to: LedgerAccount,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }

        let from_balance = self.balance_of(from);
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                account: from,
                available: from_balance,
                needed: amount,
            })?;

        if from == to {
            return Ok(());
        }

        let to_balance = self.balance_of(to);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(to))?;

        self.balances.insert(from, new_from);
        self.balances.insert(to, new_to);

        debug!(
            from = %from,
            to = %to,
            amount = amount.to_base_units(),
            "💸 Transfer applied"
        );
        Ok(())
    }
}

impl Ledger for MemoryLedger {
    fn send_module_to_module(
        &mut self,
        from: ModuleAccount,
        to: ModuleAccount,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.transfer(LedgerAccount::Module(from), LedgerAccount::Module(to), amount)
    }

    fn send_module_to_account(
        &mut self,
        from: ModuleAccount,
        to: &AccountAddress,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.transfer(LedgerAccount::Module(from), LedgerAccount::Account(*to), amount)
    }

    fn add_stake(
        &mut self,
        topic_id: TopicId,
        reputer: &AccountAddress,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }

        let current = self.stake_of(topic_id, reputer);
        let new_stake = current
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(LedgerAccount::Account(*reputer)))?;
        self.stakes.insert((topic_id, *reputer), new_stake);

        info!(
            topic_id,
            reputer = %reputer,
            amount = amount.to_base_units(),
            stake_before = current.to_base_units(),
            stake_after = new_stake.to_base_units(),
            "🔒 Stake added"
        );
        Ok(())
    }
}
