pub mod hazards;
pub mod reputation;
