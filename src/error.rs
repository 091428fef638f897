//! Small, per-boundary error types. The streaming core itself is total (see
//! the crate-level docs); these are only reachable from configuration-time
//! constructors and the `std`-gated CSV collaborator.

/// A `bank` index passed to a setter exceeded the compiled bank count.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("bank index {index} is out of range for a bank count of {bank_count}")]
pub struct BankOutOfRange {
    pub index: usize,
    pub bank_count: usize,
}

/// A `row` index passed to a LUT setter exceeded the compiled row count.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("row index {index} is out of range for a row count of {row_count}")]
pub struct RowOutOfRange {
    pub index: usize,
    pub row_count: usize,
}
