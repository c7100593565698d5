//! CSV transaction log parsing and validation
//!
//! A file is only accepted when its header matches the expected column
//! sequence exactly, by position; a header mismatch fails the whole file
//! before any row is produced. Rows are then parsed independently: a row with
//! an unparsable id, amount, or date is logged and skipped without affecting
//! the rows around it.

use csv::StringRecord;
use std::path::Path;
use tracing::warn;
use txsync_common::{timefmt, TransactionRecord, TxSyncError};

use crate::error::{SyncError, SyncResult};

/// Required header columns, in order. Extra trailing columns are tolerated.
pub const EXPECTED_HEADER: [&str; 6] = ["ID", "ClientID", "Transaction", "Amount", "Date", "Status"];

/// Result of parsing one downloaded log file.
#[derive(Debug)]
pub struct ParsedFile {
    pub records: Vec<TransactionRecord>,
    pub rows_skipped: usize,
}

/// Parse one downloaded log file into validated records.
///
/// Returns an error only for file-level problems (unreadable file, header
/// mismatch); row-level problems are counted in `rows_skipped`.
pub fn parse_log_file(path: &Path) -> SyncResult<ParsedFile> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?;
    if !header_matches(headers) {
        return Err(SyncError::InvalidHeader {
            file: path.display().to_string(),
        });
    }

    let mut records = Vec::new();
    let mut rows_skipped = 0usize;

    for (index, row) in reader.records().enumerate() {
        // 1-based data row number, header excluded
        let row_number = index + 1;

        let row = match row {
            Ok(row) => row,
            Err(error) => {
                warn!(row = row_number, error = %error, "Skipping unreadable CSV row");
                rows_skipped += 1;
                continue;
            },
        };

        match parse_row(&row) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(row = row_number, error = %error, "Skipping invalid row");
                rows_skipped += 1;
            },
        }
    }

    Ok(ParsedFile {
        records,
        rows_skipped,
    })
}

/// Positional prefix match against [`EXPECTED_HEADER`].
fn header_matches(headers: &StringRecord) -> bool {
    if headers.len() < EXPECTED_HEADER.len() {
        return false;
    }
    EXPECTED_HEADER
        .iter()
        .enumerate()
        .all(|(i, &expected)| headers.get(i) == Some(expected))
}

fn parse_row(row: &StringRecord) -> Result<TransactionRecord, TxSyncError> {
    if row.len() < EXPECTED_HEADER.len() {
        return Err(TxSyncError::Parse(format!(
            "row has {} fields, expected {}",
            row.len(),
            EXPECTED_HEADER.len()
        )));
    }

    let field = |i: usize| row.get(i).unwrap_or_default();

    let id: i64 = field(0)
        .parse()
        .map_err(|_| TxSyncError::Parse(format!("invalid id: {:?}", field(0))))?;

    let amount: f64 = field(3)
        .parse()
        .map_err(|_| TxSyncError::Parse(format!("invalid amount: {:?}", field(3))))?;

    let transaction_date = timefmt::parse_timestamp(field(4))?;

    Ok(TransactionRecord {
        id,
        client_id: field(1).to_string(),
        transaction_type: field(2).to_string(),
        amount,
        transaction_date,
        status: field(5).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_valid_file() {
        let file = write_file(
            "ID,ClientID,Transaction,Amount,Date,Status\n\
             1,client1,Deposit,100.50,2024-01-01T10:00:00Z,Completed\n\
             2,client1,Withdrawal,42.00,2024-01-02 09:15:00,Pending\n",
        );

        let parsed = parse_log_file(file.path()).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.rows_skipped, 0);

        let first = &parsed.records[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.client_id, "client1");
        assert_eq!(first.transaction_type, "Deposit");
        assert_eq!(first.amount, 100.50);
        assert_eq!(
            first.transaction_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(first.status, "Completed");
    }

    #[test]
    fn test_header_mismatch_fails_whole_file() {
        let file = write_file(
            "ID,Client,Transaction,Amount,Date,Status\n\
             1,client1,Deposit,100.50,2024-01-01T10:00:00Z,Completed\n",
        );
        let result = parse_log_file(file.path());
        assert!(matches!(result, Err(SyncError::InvalidHeader { .. })));
    }

    #[test]
    fn test_header_order_matters() {
        let file = write_file("ClientID,ID,Transaction,Amount,Date,Status\n");
        assert!(parse_log_file(file.path()).is_err());
    }

    #[test]
    fn test_extra_trailing_columns_tolerated() {
        let file = write_file(
            "ID,ClientID,Transaction,Amount,Date,Status,Comment\n\
             1,client1,Deposit,100.50,2024-01-01T10:00:00Z,Completed,ok\n",
        );
        let parsed = parse_log_file(file.path()).unwrap();
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn test_bad_rows_skipped_without_blocking_rest() {
        let file = write_file(
            "ID,ClientID,Transaction,Amount,Date,Status\n\
             not-a-number,client1,Deposit,100.50,2024-01-01T10:00:00Z,Completed\n\
             2,client1,Deposit,abc,2024-01-01T10:00:00Z,Completed\n\
             3,client1,Deposit,10.00,yesterday,Completed\n\
             4,client1,Deposit,10.00\n\
             5,client1,Deposit,10.00,2024-01-05,Completed\n",
        );

        let parsed = parse_log_file(file.path()).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].id, 5);
        assert_eq!(parsed.rows_skipped, 4);
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = write_file("");
        assert!(parse_log_file(file.path()).is_err());
    }

    #[test]
    fn test_header_only_file_yields_no_records() {
        let file = write_file("ID,ClientID,Transaction,Amount,Date,Status\n");
        let parsed = parse_log_file(file.path()).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.rows_skipped, 0);
    }
}
