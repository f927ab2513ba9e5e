//! Engine pipeline: normalize → expand → select roll width → pack →
//! compact → aggregate.

use crate::compact::compact;
use crate::error::Result;
use crate::metrics::aggregate;
use crate::normalize::normalize;
use crate::shelf::{expand_pieces, pack, select_roll_width};
use crate::types::{EfficiencyResult, Layout, Order, Piece};

/// Full engine output: the metrics plus the layout and piece arena
/// they were derived from.
#[derive(Debug, Clone)]
pub struct PackedOrder {
    pub result: EfficiencyResult,
    pub layout: Layout,
    pub pieces: Vec<Piece>,
}

/// Computes waste efficiency for one order. Pure: no I/O, no shared
/// state, deterministic for identical input.
pub fn compute_efficiency(order: &Order) -> Result<EfficiencyResult> {
    Ok(compute_layout(order)?.result)
}

/// Same as [`compute_efficiency`] but also returns the final layout and
/// piece arena, for callers that render or inspect placements.
pub fn compute_layout(order: &Order) -> Result<PackedOrder> {
    let normalized = normalize(order)?;
    let pieces = expand_pieces(&normalized.lines);
    let roll_width_mm = select_roll_width(&pieces, &normalized.available_widths_mm);

    tracing::info!(
        quote_id = %normalized.quote_id,
        lines = normalized.lines.len(),
        pieces = pieces.len(),
        roll_width_mm,
        "computing efficiency"
    );

    let mut layout = pack(&pieces, roll_width_mm, &normalized.lines)?;
    compact(&mut layout);

    let result = aggregate(&layout, &pieces, &normalized.lines);
    tracing::info!(
        quote_id = %normalized.quote_id,
        used_length_mm = layout.used_length_mm,
        levels = layout.levels(),
        eff_pct = result.totals.eff_pct,
        "efficiency computed"
    );

    Ok(PackedOrder {
        result,
        layout,
        pieces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::types::{Model, OrderLine};
    use pretty_assertions::assert_eq;

    fn line(id: &str, width: u32, drop: u32, qty: u32) -> OrderLine {
        OrderLine {
            line_id: id.to_string(),
            width_mm: width,
            drop_mm: drop,
            qty,
            fabric_code: None,
            series: None,
        }
    }

    fn order(widths: Vec<u32>, lines: Vec<OrderLine>) -> Order {
        Order {
            quote_id: "Q-TEST-001".to_string(),
            model: Model::Blinds,
            available_widths_mm: widths,
            lines,
        }
    }

    #[test]
    fn candidate_width_scenario() {
        // Smallest candidate >= 2400 is picked; two 2100-drop pieces of
        // full roll width stack as two shelves.
        let o = order(
            vec![1900, 2050, 2400, 3000],
            vec![line("L1", 2400, 2100, 2)],
        );
        let r = compute_efficiency(&o).unwrap();
        let lr = &r.results[0];
        assert_eq!(lr.roll_width_mm, 2400);
        assert_eq!(lr.levels, 2);
        assert_eq!(lr.pieces, 2);
        assert!((lr.blind_area_m2 - 10.08).abs() < 1e-9);
        assert!((r.totals.eff_pct + r.totals.waste_pct - 100.0).abs() < 1e-6);
    }

    #[test]
    fn custom_roll_when_no_candidate_fits() {
        let o = order(vec![1900, 2050], vec![line("L1", 2200, 1000, 1)]);
        let r = compute_efficiency(&o).unwrap();
        assert_eq!(r.results[0].roll_width_mm, 2200);
    }

    #[test]
    fn two_single_shelf_lines_compact_into_one() {
        // Each line alone fills one 2100-high shelf halfway; compaction
        // merges them, saving exactly one shelf height.
        let o = order(
            vec![2400],
            vec![line("L1", 1200, 2100, 1), line("L2", 1200, 2100, 1)],
        );
        let r = compute_efficiency(&o).unwrap();
        assert_eq!(r.totals.total_levels, 1);
        assert_eq!(r.totals.eff_pct, 100.0);
        let used: f64 = r.results.iter().map(|l| l.used_length_mm).sum();
        assert!((used - 2100.0).abs() < 1e-9);
    }

    #[test]
    fn boundary_gap_shows_up_in_used_length() {
        let o = order(
            vec![1000],
            vec![
                line("A", 1000, 2950, 1),
                line("B", 1000, 2940, 1),
                line("C", 1000, 60, 1),
            ],
        );
        let packed = compute_layout(&o).unwrap();
        assert_eq!(packed.layout.used_length_mm, 5960);
        assert_eq!(packed.layout.gap_total_mm(), 10);
        let used: f64 = packed.result.results.iter().map(|l| l.used_length_mm).sum();
        assert!((used - 5960.0).abs() < 1e-9);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let o = order(
            vec![1900, 2050, 2400, 3000],
            vec![
                line("L1", 2300, 2100, 2),
                line("L2", 1100, 2100, 3),
                line("L3", 900, 1400, 7),
            ],
        );
        let a = compute_efficiency(&o).unwrap();
        let b = compute_efficiency(&o).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn validation_failure_surfaces_field() {
        let o = order(vec![2400], vec![line("L1", 4000, 2100, 1)]);
        assert!(matches!(
            compute_efficiency(&o),
            Err(EngineError::InvalidWidth { .. })
        ));
        let o = order(vec![2400], vec![]);
        assert_eq!(compute_efficiency(&o), Err(EngineError::EmptyOrder));
    }

    #[test]
    fn mixed_order_keeps_all_invariants() {
        let o = order(
            vec![1900, 2050, 2400, 3000],
            vec![
                line("L1", 1800, 2600, 4),
                line("L2", 700, 2600, 3),
                line("L3", 1500, 900, 6),
                line("L4", 300, 450, 20),
            ],
        );
        let packed = compute_layout(&o).unwrap();
        for shelf in &packed.layout.shelves {
            let w: u32 = shelf.pieces.iter().map(|&i| packed.pieces[i].width_mm).sum();
            assert!(w <= packed.layout.roll_width_mm);
            let next = (shelf.start_mm / 5900 + 1) * 5900;
            assert!(shelf.end_mm() <= next);
        }
        let placed: usize = packed.layout.shelves.iter().map(|s| s.pieces.len()).sum();
        assert_eq!(placed, packed.pieces.len());
        assert_eq!(packed.result.totals.total_pieces, 33);
        assert!(packed.result.totals.eff_pct > 0.0 && packed.result.totals.eff_pct <= 100.0);
    }
}
