pub mod charges;
pub mod schedule;
