//! Error types for the nesting engine.

use thiserror::Error;

/// Errors produced by the engine. Validation errors are recoverable by
/// the caller; a packing error is fatal for the whole order and no
/// partial result is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("order has no lines")]
    EmptyOrder,

    #[error("order has {count} lines, maximum is {max}")]
    TooManyLines { count: usize, max: usize },

    #[error("line '{line_id}': width {width_mm}mm outside (0, {max_mm}]")]
    InvalidWidth {
        line_id: String,
        width_mm: u32,
        max_mm: u32,
    },

    #[error("line '{line_id}': drop {drop_mm}mm outside (0, {max_mm}]")]
    InvalidDrop {
        line_id: String,
        drop_mm: u32,
        max_mm: u32,
    },

    #[error("line '{line_id}': quantity {qty} outside 1..={max}")]
    InvalidQty { line_id: String, qty: u32, max: u32 },

    #[error("line '{line_id}': duplicate line id")]
    DuplicateLineId { line_id: String },

    #[error("available width {width_mm}mm must be positive")]
    InvalidCandidateWidth { width_mm: u32 },

    #[error("line '{line_id}': piece width {width_mm}mm exceeds roll width {roll_width_mm}mm")]
    PieceExceedsRoll {
        line_id: String,
        width_mm: u32,
        roll_width_mm: u32,
    },
}

impl EngineError {
    /// Whether the caller can fix the order and retry. Packing failures
    /// are fatal for the order as submitted.
    pub fn is_validation(&self) -> bool {
        !matches!(self, EngineError::PieceExceedsRoll { .. })
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
