pub mod csv_out;
pub mod minimal;
pub mod table;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter, rounding decimal strings
/// to `dp` places first when requested.
pub fn format_output(format: &OutputFormat, value: &Value, dp: Option<u32>) {
    let rounded;
    let value = match dp {
        Some(dp) => {
            rounded = round_decimals(value, dp);
            &rounded
        }
        None => value,
    };

    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => log::error!("JSON serialization error: {}", e),
    }
}

/// Round every decimal-valued string in the tree, leaving rate fields at full
/// precision. Computation results are kept unrounded; this only affects what
/// is displayed.
pub fn round_decimals(value: &Value, dp: u32) -> Value {
    match value {
        Value::String(s) if s.contains('.') => match Decimal::from_str(s) {
            Ok(d) => Value::String(d.round_dp(dp).to_string()),
            Err(_) => value.clone(),
        },
        Value::Array(arr) => Value::Array(arr.iter().map(|v| round_decimals(v, dp)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let shown = if k.contains("rate") {
                        v.clone()
                    } else {
                        round_decimals(v, dp)
                    };
                    (k.clone(), shown)
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Render a scalar JSON value as plain text.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten an object into dotted `field, value` pairs. Arrays of row objects
/// are skipped; they are rendered separately by [`row_records`].
pub fn field_pairs(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    collect_fields("", map, &mut out);
    out
}

fn collect_fields(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => collect_fields(&name, inner, out),
            Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {}
            _ => out.push((name, plain(val))),
        }
    }
}

/// First field holding an array of row objects, e.g. a schedule's `rows`.
pub fn row_array(map: &Map<String, Value>) -> Option<(&str, &[Value])> {
    map.iter().find_map(|(key, val)| match val {
        Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
            Some((key.as_str(), arr.as_slice()))
        }
        _ => None,
    })
}

/// Flatten row objects into a header and string records. A nested list of
/// `{name, amount}` objects becomes one column per name.
pub fn row_records(rows: &[Value]) -> (Vec<String>, Vec<Vec<String>>) {
    let cells: Vec<Vec<(String, String)>> = rows
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            let mut row = Vec::new();
            for (key, val) in map {
                match named_amounts(val) {
                    Some(pairs) => row.extend(pairs),
                    None => row.push((key.clone(), plain(val))),
                }
            }
            row
        })
        .collect();

    let mut headers: Vec<String> = Vec::new();
    for (name, _) in cells.iter().flatten() {
        if !headers.contains(name) {
            headers.push(name.clone());
        }
    }

    let records = cells
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| {
                    row.iter()
                        .find(|(name, _)| name == h)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    (headers, records)
}

fn named_amounts(value: &Value) -> Option<Vec<(String, String)>> {
    value
        .as_array()?
        .iter()
        .map(|item| {
            let name = item.get("name")?.as_str()?;
            let amount = item.get("amount")?;
            Some((name.to_string(), plain(amount)))
        })
        .collect()
}
