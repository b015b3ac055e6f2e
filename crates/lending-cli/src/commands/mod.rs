pub mod borrowing;
pub mod rates;
pub mod schedule;
