//! Port for wallet and ledger persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{UserId, Wallet, WalletTransaction};

use super::define_port_error;

define_port_error! {
    /// Errors raised by wallet repository adapters.
    pub enum WalletRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "wallet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "wallet repository query failed: {message}",
    }
}

/// Port for wallet storage.
///
/// `record` persists a balance change and its ledger entry together so the
/// two can never drift apart.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Return the user's wallet, creating an empty one on first use.
    async fn find_or_open_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Wallet, WalletRepositoryError>;

    /// Persist an updated balance and its ledger entry atomically.
    async fn record(
        &self,
        wallet: &Wallet,
        transaction: &WalletTransaction,
    ) -> Result<(), WalletRepositoryError>;

    /// List a wallet's ledger entries, newest first.
    async fn list_transactions(
        &self,
        wallet_id: &Uuid,
    ) -> Result<Vec<WalletTransaction>, WalletRepositoryError>;
}

/// Fixture implementation for tests that do not exercise wallet persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWalletRepository;

#[async_trait]
impl WalletRepository for FixtureWalletRepository {
    async fn find_or_open_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Wallet, WalletRepositoryError> {
        Ok(Wallet::open(user_id.clone(), chrono::Utc::now()))
    }

    async fn record(
        &self,
        _wallet: &Wallet,
        _transaction: &WalletTransaction,
    ) -> Result<(), WalletRepositoryError> {
        Ok(())
    }

    async fn list_transactions(
        &self,
        _wallet_id: &Uuid,
    ) -> Result<Vec<WalletTransaction>, WalletRepositoryError> {
        Ok(Vec::new())
    }
}
