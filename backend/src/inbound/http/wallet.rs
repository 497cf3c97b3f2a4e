//! Wallet balance and ledger endpoints.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::WalletRepositoryError;
use crate::domain::{ApiResult, Error, TransactionKind, Wallet, WalletTransaction};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Wire form of a wallet balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub balance_cents: i64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id(),
            balance_cents: wallet.balance_cents(),
            currency: wallet.currency().to_owned(),
            updated_at: wallet.updated_at(),
        }
    }
}

/// Wire form of one ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String, example = "credit")]
    pub kind: TransactionKind,
    pub amount_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<WalletTransaction> for TransactionResponse {
    fn from(entry: WalletTransaction) -> Self {
        Self {
            id: entry.id(),
            kind: entry.kind(),
            amount_cents: entry.amount_cents(),
            description: entry.description().map(ToOwned::to_owned),
            created_at: entry.created_at(),
        }
    }
}

pub(crate) fn map_wallet_repository_error(err: WalletRepositoryError) -> Error {
    match err {
        WalletRepositoryError::Connection { .. } => {
            Error::service_unavailable("wallet storage is unavailable")
        }
        WalletRepositoryError::Query { .. } => Error::internal("wallet query failed"),
    }
}

/// Fetch the session user's wallet, opening an empty one on first use.
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    responses((status = 200, description = "Current balance", body = WalletResponse)),
    tag = "wallet"
)]
pub async fn get_wallet(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let wallet = state
        .wallets
        .find_or_open_for_user(&actor)
        .await
        .map_err(map_wallet_repository_error)?;
    Ok(HttpResponse::Ok().json(WalletResponse::from(wallet)))
}

/// List the session user's ledger entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/transactions",
    responses((status = 200, description = "Ledger entries", body = [TransactionResponse])),
    tag = "wallet"
)]
pub async fn list_transactions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let wallet = state
        .wallets
        .find_or_open_for_user(&actor)
        .await
        .map_err(map_wallet_repository_error)?;
    let entries = state
        .wallets
        .list_transactions(&wallet.id())
        .await
        .map_err(map_wallet_repository_error)?;
    let ledger: Vec<TransactionResponse> = entries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ledger))
}
