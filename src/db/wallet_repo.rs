use sqlx::PgPool;

use crate::models::Wallet;

/// Fetch a wallet by its address.
pub async fn get_wallet_by_address(
    pool: &PgPool,
    address: &str,
) -> Result<Option<Wallet>, sqlx::Error> {
    sqlx::query_as::<_, Wallet>(
        r#"
        SELECT address, first_seen, first_trade_market, first_trade_amount
        FROM wallets
        WHERE address = $1
        "#,
    )
    .bind(address)
    .fetch_optional(pool)
    .await
}

/// Insert a wallet's first-seen record. Existing rows are left untouched;
/// returns whether this call created the row.
pub async fn insert_wallet(pool: &PgPool, wallet: &Wallet) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO wallets (address, first_seen, first_trade_market, first_trade_amount)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (address) DO NOTHING
        "#,
    )
    .bind(&wallet.address)
    .bind(wallet.first_seen)
    .bind(&wallet.first_trade_market)
    .bind(wallet.first_trade_amount)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
