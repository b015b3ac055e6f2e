use serde_json::Value;

use super::plain;

/// Key output fields, in order of priority.
const PRIORITY_KEYS: [&str; 5] = [
    "borrowing_capacity",
    "capacity_difference",
    "summary",
    "periodic_rate",
    "maximum_monthly_repayment",
];

/// Print just the headline value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return plain(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, plain(val));
        }
    }

    plain(result_obj)
}
