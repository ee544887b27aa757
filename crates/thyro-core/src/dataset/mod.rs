//! Training dataset generation.
//!
//! - **records**: the supported record shapes
//! - **balance**: label partition, stratified sampling and record emission
//! - **rebalance**: downsampling an existing record file

pub mod balance;
pub mod rebalance;
pub mod records;

pub use balance::{balance, partition, BalancedDataset, DatasetGenerator, Partition};
pub use rebalance::{rebalance_records, RebalanceStats};
pub use records::{RecordFormat, TrainingRecord};
