//! Converts a final layout into per-line and order-wide waste metrics.
//!
//! All areas are accumulated in integer mm² and converted to m² once,
//! so identical input yields bit-identical output regardless of piece
//! count or platform.

use crate::types::{EfficiencyResult, Layout, LineResult, OrderLine, Piece, Totals};

const MM2_PER_M2: f64 = 1_000_000.0;

/// Computes totals and per-line results for one packed order.
///
/// The order is packed as one shared layout, so per-line roll area, used
/// length and waste are allocated proportionally to each line's fraction
/// of the total blind area. `roll_width_mm` and `levels` are reported
/// order-wide on every line.
pub fn aggregate(layout: &Layout, pieces: &[Piece], lines: &[OrderLine]) -> EfficiencyResult {
    let mut line_blind_mm2 = vec![0u64; lines.len()];
    let mut line_pieces = vec![0usize; lines.len()];
    for piece in pieces {
        line_blind_mm2[piece.line_idx] += piece.area_mm2();
        line_pieces[piece.line_idx] += 1;
    }

    let blind_mm2: u64 = line_blind_mm2.iter().sum();
    let roll_mm2 = layout.roll_width_mm as u64 * layout.used_length_mm;

    let blind_area_m2 = blind_mm2 as f64 / MM2_PER_M2;
    let roll_area_m2 = roll_mm2 as f64 / MM2_PER_M2;
    let waste_area_m2 = (roll_mm2 - blind_mm2) as f64 / MM2_PER_M2;
    let eff_pct = if roll_mm2 > 0 {
        100.0 * blind_mm2 as f64 / roll_mm2 as f64
    } else {
        0.0
    };

    let levels = layout.levels();
    let results = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let own_blind = line_blind_mm2[idx] as f64 / MM2_PER_M2;
            let share = if blind_mm2 > 0 {
                line_blind_mm2[idx] as f64 / blind_mm2 as f64
            } else {
                0.0
            };
            let own_roll = share * roll_area_m2;
            let own_waste = own_roll - own_blind;
            LineResult {
                line_id: line.line_id.clone(),
                waste_factor_pct: if own_blind > 0.0 {
                    100.0 * own_waste / own_blind
                } else {
                    0.0
                },
                utilization: if own_roll > 0.0 {
                    100.0 * own_blind / own_roll
                } else {
                    0.0
                },
                used_length_mm: share * layout.used_length_mm as f64,
                blind_area_m2: own_blind,
                roll_area_m2: own_roll,
                waste_area_m2: own_waste,
                roll_width_mm: layout.roll_width_mm,
                pieces: line_pieces[idx],
                levels,
            }
        })
        .collect();

    EfficiencyResult {
        results,
        totals: Totals {
            eff_pct,
            waste_pct: 100.0 - eff_pct,
            total_area_m2: blind_area_m2,
            total_used_area_m2: roll_area_m2,
            total_waste_area_m2: waste_area_m2,
            total_pieces: pieces.len(),
            total_levels: levels,
        },
    }
}
