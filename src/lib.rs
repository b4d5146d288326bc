pub mod amm;
pub mod telemetry;

pub use amm::types::U256;
