//! Order validation and canonicalization.

use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::types::{MAX_DROP_MM, MAX_LINES, MAX_QTY_PER_LINE, MAX_WIDTH_MM, Order, OrderLine};

/// A validated order with canonical candidate widths. Line order is
/// preserved; it is the packing tie-break key.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrder {
    pub quote_id: String,
    /// Deduplicated, sorted ascending.
    pub available_widths_mm: Vec<u32>,
    pub lines: Vec<OrderLine>,
}

/// Validates every field of the order and canonicalizes the candidate
/// width list. Fails on the first offending field. No side effects.
pub fn normalize(order: &Order) -> Result<NormalizedOrder> {
    if order.lines.is_empty() {
        return Err(EngineError::EmptyOrder);
    }
    if order.lines.len() > MAX_LINES {
        return Err(EngineError::TooManyLines {
            count: order.lines.len(),
            max: MAX_LINES,
        });
    }

    for w in &order.available_widths_mm {
        if *w == 0 {
            return Err(EngineError::InvalidCandidateWidth { width_mm: *w });
        }
    }

    let mut seen_ids = HashSet::new();
    for line in &order.lines {
        validate_line(line)?;
        if !seen_ids.insert(line.line_id.as_str()) {
            return Err(EngineError::DuplicateLineId {
                line_id: line.line_id.clone(),
            });
        }
    }

    let mut widths = order.available_widths_mm.clone();
    widths.sort_unstable();
    widths.dedup();

    Ok(NormalizedOrder {
        quote_id: order.quote_id.clone(),
        available_widths_mm: widths,
        lines: order.lines.clone(),
    })
}

fn validate_line(line: &OrderLine) -> Result<()> {
    if line.width_mm == 0 || line.width_mm > MAX_WIDTH_MM {
        return Err(EngineError::InvalidWidth {
            line_id: line.line_id.clone(),
            width_mm: line.width_mm,
            max_mm: MAX_WIDTH_MM,
        });
    }
    if line.drop_mm == 0 || line.drop_mm > MAX_DROP_MM {
        return Err(EngineError::InvalidDrop {
            line_id: line.line_id.clone(),
            drop_mm: line.drop_mm,
            max_mm: MAX_DROP_MM,
        });
    }
    if line.qty == 0 || line.qty > MAX_QTY_PER_LINE {
        return Err(EngineError::InvalidQty {
            line_id: line.line_id.clone(),
            qty: line.qty,
            max: MAX_QTY_PER_LINE,
        });
    }
    Ok(())
}
