pub mod health;
pub mod recommendations;
pub mod records;
pub mod reports;
pub mod stats;
