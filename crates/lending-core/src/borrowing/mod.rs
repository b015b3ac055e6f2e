pub mod capacity;
pub mod compare;
