//! Tabular export/import.
//!
//! One-way CSV export of the catalog and the history, plus parsing of the
//! bulk catalog upload. The upload is validated row-by-row: structural
//! problems are collected per row so one bad line never sinks the file.

use gudang_catalog::Item;
use gudang_core::{StockError, StockResult};
use gudang_ledger::LedgerEntry;
use gudang_requests::TransactionType;

/// Expected header row of a bulk catalog upload.
pub const CATALOG_HEADERS: [&str; 5] = ["Code", "Name", "Qty", "Unit", "Category"];

/// Current catalog as a spreadsheet byte stream.
pub fn items_to_csv(items: &[Item]) -> StockResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CATALOG_HEADERS)
        .map_err(|e| StockError::storage(format!("csv: {e}")))?;

    for item in items {
        let balance = item.balance.to_string();
        writer
            .write_record([
                item.code.as_str(),
                item.name.as_str(),
                balance.as_str(),
                item.unit.as_str(),
                item.category.as_str(),
            ])
            .map_err(|e| StockError::storage(format!("csv: {e}")))?;
    }

    finish(writer)
}

/// Full history as a spreadsheet byte stream, in append order.
pub fn history_to_csv(entries: &[LedgerEntry]) -> StockResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "Action",
            "Date",
            "Code",
            "Item",
            "Qty",
            "Unit",
            "Balance",
            "Type",
            "User",
            "Event",
            "DO Number",
            "Recorded At",
        ])
        .map_err(|e| StockError::storage(format!("csv: {e}")))?;

    for entry in entries {
        let date = entry.effective_date().to_string();
        let quantity = entry.quantity.to_string();
        let balance = entry
            .resulting_balance
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        let recorded_at = entry.recorded_at.to_rfc3339();

        writer
            .write_record([
                entry.action.as_str(),
                date.as_str(),
                entry.item_code.as_str(),
                entry.item_name.as_str(),
                quantity.as_str(),
                entry.unit.as_str(),
                balance.as_str(),
                entry
                    .transaction_type
                    .map(TransactionType::as_str)
                    .unwrap_or("-"),
                entry.actor.as_str(),
                entry.event.as_deref().unwrap_or("-"),
                entry.delivery_reference.as_deref().unwrap_or("-"),
                recorded_at.as_str(),
            ])
            .map_err(|e| StockError::storage(format!("csv: {e}")))?;
    }

    finish(writer)
}

/// Downloadable one-row template for the bulk upload format.
pub fn catalog_template_csv() -> StockResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CATALOG_HEADERS)
        .map_err(|e| StockError::storage(format!("csv: {e}")))?;
    writer
        .write_record(["ITM-0001", "Contoh Produk", "10", "pcs", "Umum"])
        .map_err(|e| StockError::storage(format!("csv: {e}")))?;
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> StockResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| StockError::storage(format!("csv: {e}")))
}

/// One parsed upload row. `line` is the 1-based spreadsheet line (header is
/// line 1), used in skip reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub line: usize,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub unit: String,
    pub category: String,
}

/// Parse result: structurally valid rows plus per-row parse problems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogImport {
    pub rows: Vec<CatalogRow>,
    pub errors: Vec<String>,
}

/// Parse a bulk catalog upload.
///
/// Fails outright only when the header row is missing or wrong; per-row
/// problems land in `errors` and parsing continues.
pub fn parse_catalog_csv(bytes: &[u8]) -> StockResult<CatalogImport> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| StockError::validation(format!("unreadable header row: {e}")))?;
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    if found != CATALOG_HEADERS {
        return Err(StockError::validation(format!(
            "expected columns {CATALOG_HEADERS:?}, found {found:?}"
        )));
    }

    let mut import = CatalogImport::default();
    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                import.errors.push(format!("row {line}: {e}"));
                continue;
            }
        };

        let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let quantity = match field(2).parse::<i64>() {
            Ok(q) => q,
            Err(_) => {
                import
                    .errors
                    .push(format!("row {line}: quantity is not a number"));
                continue;
            }
        };

        import.rows.push(CatalogRow {
            line,
            code: field(0),
            name: field(1),
            quantity,
            unit: field(3),
            category: field(4),
        });
    }

    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_round_trip_through_export_headers() {
        let items = vec![Item::new(
            "ITM-0001".parse().unwrap(),
            "Sirup Original",
            "box",
            "Minuman",
            7,
        )
        .unwrap()];

        let bytes = items_to_csv(&items).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Code,Name,Qty,Unit,Category"));
        assert_eq!(lines.next(), Some("ITM-0001,Sirup Original,7,box,Minuman"));
    }

    #[test]
    fn upload_with_wrong_header_fails_fast() {
        let err = parse_catalog_csv(b"Kode,Nama\nITM-1,x\n").unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
    }

    #[test]
    fn bad_rows_are_reported_and_skipped() {
        let body = b"Code,Name,Qty,Unit,Category\n\
                     ITM-0001,Sirup,10,box,Minuman\n\
                     ITM-0002,Teh,not-a-number,pcs,Minuman\n\
                     ITM-0003,Kopi,5,pcs,Minuman\n";
        let import = parse_catalog_csv(body).unwrap();
        assert_eq!(import.rows.len(), 2);
        assert_eq!(import.errors.len(), 1);
        assert!(import.errors[0].starts_with("row 3:"));
        assert_eq!(import.rows[1].line, 4);
    }

    #[test]
    fn template_parses_back() {
        let template = catalog_template_csv().unwrap();
        let import = parse_catalog_csv(&template).unwrap();
        assert_eq!(import.rows.len(), 1);
        assert!(import.errors.is_empty());
    }
}
