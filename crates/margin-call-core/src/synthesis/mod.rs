pub mod allocation;
pub mod synthesizer;

pub use allocation::{allocate, Allocation, AllocationBranch};
pub use synthesizer::{settle, CellOutcome, MarketInputs, RecordSynthesizer, Settlement};
