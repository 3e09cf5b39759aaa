use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::hours_to_delta;
use crate::errors::AppError;
use crate::models::{Trade, Wallet};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub hours: Option<Decimal>,
}

/// GET /api/wallets/:address
pub async fn detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Wallet>, AppError> {
    let wallet = state
        .store
        .find_wallet(&address)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wallet {address} not found")))?;

    Ok(Json(wallet))
}

/// GET /api/wallets/:address/trades?hours=N
pub async fn trades(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(params): Query<TradesQuery>,
) -> Result<Json<Vec<Trade>>, AppError> {
    let hours = params
        .hours
        .unwrap_or(state.config.detection.rapid_accumulation_hours);
    if hours <= Decimal::ZERO {
        return Err(AppError::BadRequest("hours must be positive".into()));
    }

    let since = hours_to_delta(hours)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| AppError::BadRequest(format!("hours out of range: {hours}")))?;

    let trades = state.store.find_trades_since(&address, since).await?;
    Ok(Json(trades))
}
