//! Read queries against the `transaction_logs` table

use sqlx::PgPool;
use txsync_common::TransactionRecord;

/// Fetch all persisted transactions for one client, most recent first.
///
/// A client with no rows yields an empty vec; callers decide how to present
/// that (the control API returns an empty JSON array, never 404).
pub async fn by_client(pool: &PgPool, client_id: &str) -> Result<Vec<TransactionRecord>, sqlx::Error> {
    sqlx::query_as::<_, TransactionRecord>(
        r#"
        SELECT id, client_id, transaction_type, amount, transaction_date, status
        FROM transaction_logs
        WHERE client_id = $1
        ORDER BY transaction_date DESC
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
}
