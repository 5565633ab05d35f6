pub mod gate;
pub mod ledger;
pub mod simulator;

pub use gate::{ExecutionGate, GateState};
pub use ledger::{Ledger, LedgerView};
pub use simulator::{ArbitrageSimulator, SimulatorParams};
