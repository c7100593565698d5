//! Domain types shared across txsync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One transaction log entry.
///
/// The `id` is the natural key supplied by the upstream system; it is globally
/// unique and acts as the conflict key for upserts, so re-ingesting a record
/// with a known id overwrites the stored row instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    #[serde(rename = "clientid")]
    pub client_id: String,
    #[serde(rename = "transaction")]
    pub transaction_type: String,
    pub amount: f64,
    #[serde(rename = "date")]
    pub transaction_date: DateTime<Utc>,
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_json_field_names() {
        let record = TransactionRecord {
            id: 1,
            client_id: "client1".to_string(),
            transaction_type: "Deposit".to_string(),
            amount: 100.50,
            transaction_date: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            status: "Completed".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["clientid"], "client1");
        assert_eq!(json["transaction"], "Deposit");
        assert_eq!(json["status"], "Completed");
    }
}
