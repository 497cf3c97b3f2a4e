//! PostgreSQL-backed `WalletRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{WalletRepository, WalletRepositoryError};
use crate::domain::{UserId, Wallet, WalletTransaction};

use super::error_mapping::{self, is_unique_violation};
use super::models::{
    NewWalletRow, NewWalletTransactionRow, WalletRow, WalletTransactionRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{wallet_transactions, wallets};

/// Diesel-backed implementation of the wallet repository port.
#[derive(Clone)]
pub struct DieselWalletRepository {
    pool: DbPool,
}

impl DieselWalletRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WalletRepositoryError {
    error_mapping::map_pool_error(error, WalletRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> WalletRepositoryError {
    error_mapping::map_diesel_error(
        error,
        WalletRepositoryError::query,
        WalletRepositoryError::connection,
    )
}

fn row_to_wallet(row: WalletRow) -> Wallet {
    Wallet::from_stored(
        row.id,
        UserId::from_uuid(row.owner_id),
        row.balance_cents,
        row.currency,
        row.updated_at,
    )
}

fn row_to_transaction(row: WalletTransactionRow) -> Result<WalletTransaction, WalletRepositoryError> {
    let kind = row
        .kind
        .parse()
        .map_err(|_| WalletRepositoryError::query(format!("unknown kind: {}", row.kind)))?;
    Ok(WalletTransaction::from_stored(
        row.id,
        row.wallet_id,
        kind,
        row.amount_cents,
        row.description,
        row.created_at,
    ))
}

#[async_trait]
impl WalletRepository for DieselWalletRepository {
    async fn find_or_open_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Wallet, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let existing = wallets::table
            .filter(wallets::owner_id.eq(user_id.as_uuid()))
            .select(WalletRow::as_select())
            .first::<WalletRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        if let Some(row) = existing {
            return Ok(row_to_wallet(row));
        }

        let wallet = Wallet::open(user_id.clone(), chrono::Utc::now());
        let new_row = NewWalletRow {
            id: wallet.id(),
            owner_id: *wallet.owner_id().as_uuid(),
            balance_cents: wallet.balance_cents(),
            currency: wallet.currency(),
            updated_at: wallet.updated_at(),
        };

        let inserted = diesel::insert_into(wallets::table)
            .values(&new_row)
            .execute(&mut conn)
            .await;

        match inserted {
            Ok(_) => Ok(wallet),
            // A concurrent first visit won the race; read their wallet.
            Err(err) if is_unique_violation(&err) => {
                let row = wallets::table
                    .filter(wallets::owner_id.eq(user_id.as_uuid()))
                    .select(WalletRow::as_select())
                    .first::<WalletRow>(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                Ok(row_to_wallet(row))
            }
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn record(
        &self,
        wallet: &Wallet,
        transaction: &WalletTransaction,
    ) -> Result<(), WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let wallet_id = wallet.id();
        let balance_cents = wallet.balance_cents();
        let updated_at = wallet.updated_at();
        let ledger_row = NewWalletTransactionRow {
            id: transaction.id(),
            wallet_id: transaction.wallet_id(),
            kind: transaction.kind().as_str(),
            amount_cents: transaction.amount_cents(),
            description: transaction.description(),
            created_at: transaction.created_at(),
        };

        // Balance and ledger entry land in one transaction so they can
        // never drift apart.
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::update(wallets::table.filter(wallets::id.eq(wallet_id)))
                    .set((
                        wallets::balance_cents.eq(balance_cents),
                        wallets::updated_at.eq(updated_at),
                    ))
                    .execute(conn)
                    .await?;

                diesel::insert_into(wallet_transactions::table)
                    .values(&ledger_row)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_transactions(
        &self,
        wallet_id: &Uuid,
    ) -> Result<Vec<WalletTransaction>, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<WalletTransactionRow> = wallet_transactions::table
            .filter(wallet_transactions::wallet_id.eq(wallet_id))
            .order(wallet_transactions::created_at.desc())
            .select(WalletTransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_transaction).collect()
    }
}
