pub mod inference;
pub mod monitor;
pub mod transmit;
