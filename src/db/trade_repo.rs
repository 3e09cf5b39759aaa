use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Trade, TradeRow};

/// Insert a trade. A repeated transaction hash is ignored.
pub async fn insert_trade(pool: &PgPool, trade: &Trade) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO trades (
            id, wallet_address, side, size, price, market_title, market_slug,
            condition_id, outcome, traded_at, transaction_hash
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (transaction_hash) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&trade.wallet)
    .bind(trade.side.as_str())
    .bind(trade.size)
    .bind(trade.price)
    .bind(&trade.market_title)
    .bind(&trade.market_slug)
    .bind(&trade.condition_id)
    .bind(&trade.outcome)
    .bind(trade.timestamp)
    .bind(&trade.transaction_hash)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a wallet's trades at or after `since`, oldest first.
pub async fn get_trades_since(
    pool: &PgPool,
    address: &str,
    since: DateTime<Utc>,
) -> Result<Vec<Trade>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TradeRow>(
        r#"
        SELECT id, wallet_address, side, size, price, market_title, market_slug,
               condition_id, outcome, traded_at, transaction_hash
        FROM trades
        WHERE wallet_address = $1 AND traded_at >= $2
        ORDER BY traded_at ASC
        "#,
    )
    .bind(address)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(TradeRow::into_trade).collect())
}
