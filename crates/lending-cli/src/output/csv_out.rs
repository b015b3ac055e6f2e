use serde_json::Value;
use std::fs::File;
use std::io::{self, Write};

use super::{field_pairs, plain, row_array, row_records};

/// Write output as CSV to stdout. A result carrying row objects (a schedule)
/// is written as one line per row; anything else as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let written = match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            match row_array(body) {
                Some((_, rows)) => write_rows(stdout.lock(), rows),
                None => write_fields(stdout.lock(), body),
            }
        }
        Value::Array(arr) => write_rows(stdout.lock(), arr),
        _ => {
            println!("{}", plain(value));
            Ok(())
        }
    };

    if let Err(e) = written {
        log::error!("CSV output failed: {}", e);
    }
}

/// Export row objects to a CSV file that spreadsheets can open directly.
pub fn export_rows(path: &str, rows: &[Value]) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    write_rows(file, rows)?;
    log::info!("exported {} rows to {}", rows.len(), path);
    Ok(())
}

fn write_rows<W: Write>(out: W, rows: &[Value]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let (headers, records) = row_records(rows);
    if !headers.is_empty() {
        wtr.write_record(&headers)?;
    }
    for record in &records {
        wtr.write_record(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_fields<W: Write>(out: W, map: &serde_json::Map<String, Value>) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["field", "value"])?;
    for (key, val) in field_pairs(map) {
        wtr.write_record([key, val])?;
    }
    wtr.flush()?;
    Ok(())
}
