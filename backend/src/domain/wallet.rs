//! Wallet balances and their transaction ledger.
//!
//! Amounts are integer minor currency units (cents). The balance never goes
//! negative; a debit exceeding the balance is a conflict the caller reports
//! to the client.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Direction of a wallet transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(WalletError::UnknownKind),
        }
    }
}

/// Wallet operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// Amounts must be strictly positive.
    #[error("amount must be a positive number of cents")]
    NonPositiveAmount,
    /// The debit would take the balance below zero.
    #[error("insufficient funds: balance is {balance_cents} cents")]
    InsufficientFunds { balance_cents: i64 },
    /// Stored transaction kind is not recognised.
    #[error("kind must be credit or debit")]
    UnknownKind,
}

/// Ledger entry recording one balance change.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletTransaction {
    id: Uuid,
    wallet_id: Uuid,
    kind: TransactionKind,
    amount_cents: i64,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Rehydrate a stored ledger entry.
    pub fn from_stored(
        id: Uuid,
        wallet_id: Uuid,
        kind: TransactionKind,
        amount_cents: i64,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            wallet_id,
            kind,
            amount_cents,
            description,
            created_at,
        }
    }

    /// Entry identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wallet the entry belongs to.
    pub fn wallet_id(&self) -> Uuid {
        self.wallet_id
    }

    /// Credit or debit.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Amount moved, in cents.
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// Free-form reason, e.g. "session booking".
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Entry timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Per-user wallet holding a non-negative cent balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    id: Uuid,
    owner_id: UserId,
    balance_cents: i64,
    currency: String,
    updated_at: DateTime<Utc>,
}

/// Currency assigned to newly opened wallets.
pub const DEFAULT_CURRENCY: &str = "usd";

impl Wallet {
    /// Open an empty wallet for a user.
    pub fn open(owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            balance_cents: 0,
            currency: DEFAULT_CURRENCY.to_owned(),
            updated_at: now,
        }
    }

    /// Rehydrate a stored wallet.
    pub fn from_stored(
        id: Uuid,
        owner_id: UserId,
        balance_cents: i64,
        currency: String,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            balance_cents,
            currency,
            updated_at,
        }
    }

    /// Add funds, returning the ledger entry to persist alongside.
    pub fn credit(
        &mut self,
        amount_cents: i64,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<WalletTransaction, WalletError> {
        if amount_cents <= 0 {
            return Err(WalletError::NonPositiveAmount);
        }
        self.balance_cents += amount_cents;
        self.updated_at = now;
        Ok(self.entry(TransactionKind::Credit, amount_cents, description, now))
    }

    /// Remove funds, returning the ledger entry to persist alongside.
    pub fn debit(
        &mut self,
        amount_cents: i64,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<WalletTransaction, WalletError> {
        if amount_cents <= 0 {
            return Err(WalletError::NonPositiveAmount);
        }
        if amount_cents > self.balance_cents {
            return Err(WalletError::InsufficientFunds {
                balance_cents: self.balance_cents,
            });
        }
        self.balance_cents -= amount_cents;
        self.updated_at = now;
        Ok(self.entry(TransactionKind::Debit, amount_cents, description, now))
    }

    fn entry(
        &self,
        kind: TransactionKind,
        amount_cents: i64,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> WalletTransaction {
        WalletTransaction {
            id: Uuid::new_v4(),
            wallet_id: self.id,
            kind,
            amount_cents,
            description,
            created_at: now,
        }
    }

    /// Wallet identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Current balance in cents.
    pub fn balance_cents(&self) -> i64 {
        self.balance_cents
    }

    /// ISO currency code the balance is denominated in.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Last balance change timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wallet {} ({} cents)", self.id, self.balance_cents)
    }
}
