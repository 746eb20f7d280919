use crate::error::Result;
use crate::records::RawRecord;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Load raw booking records from a CSV file with a header row.
///
/// Every cell is kept as a string value; blank cells are treated as
/// missing fields. Type coercion happens later in the cleaning stage.
pub fn load_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path)?;
    let records = read_csv(file)?;
    tracing::info!(
        path = %path.display(),
        rows = records.len(),
        "Loaded raw booking records"
    );
    Ok(records)
}

/// Parse raw booking records from any CSV reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if cell.trim().is_empty() {
                continue;
            }
            record.set(header, Value::String(cell.to_string()));
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_basic() {
        let csv = "branch,price,no_show\nOrchard,150.0,1\nChangi,SGD$200,0\n";
        let records = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get_str("branch"), Some("Orchard".to_string()));
        assert_eq!(records[0].get_f64("price"), Some(150.0));
        assert_eq!(records[1].get_str("price"), Some("SGD$200".to_string()));
    }

    #[test]
    fn test_read_csv_blank_cells_are_missing() {
        let csv = "branch,room,no_show\nOrchard,,1\n";
        let records = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_str("room"), None);
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let csv = "branch,room,no_show\nOrchard,Deluxe\n";
        let records = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_str("no_show"), None);
    }
}
