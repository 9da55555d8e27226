pub mod engine;
pub mod reference;

pub use engine::{SettlementEngine, SettlementRequest};
