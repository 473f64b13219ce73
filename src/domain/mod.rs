pub mod error;
pub mod listing;
