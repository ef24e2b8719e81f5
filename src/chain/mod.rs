pub mod types;
pub mod atm;
pub mod confidence;
pub mod expected_move;
