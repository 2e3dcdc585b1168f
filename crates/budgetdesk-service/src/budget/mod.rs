//! Budget-certificate records.

pub mod sequencer;

pub use sequencer::{BudgetRecordInput, BudgetSequencer};
