use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Borrowing capacity
// ---------------------------------------------------------------------------

#[napi]
pub fn borrowing_capacity(input_json: String) -> NapiResult<String> {
    let input: lending_core::borrowing::capacity::BorrowingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::borrowing::capacity::calculate_borrowing_capacity(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_capacity(input_json: String) -> NapiResult<String> {
    let input: lending_core::borrowing::capacity::BorrowingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        lending_core::borrowing::compare::compare_policies(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: lending_core::amortization::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        lending_core::amortization::schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PeriodicRateInput {
    annual_rate: Decimal,
    #[serde(default = "default_periods_per_year")]
    periods_per_year: u32,
}

fn default_periods_per_year() -> u32 {
    12
}

#[napi]
pub fn periodic_rate(input_json: String) -> NapiResult<String> {
    let input: PeriodicRateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::time_value::convert_rate(input.annual_rate, input.periods_per_year)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
