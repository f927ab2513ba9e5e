//! Shelf packing: piece expansion, roll width selection, FFDH placement
//! and marker-boundary alignment.

use crate::error::{EngineError, Result};
use crate::types::{Layout, MARKER_LENGTH_MM, OrderLine, Piece, Shelf};

/// Expands each line into `qty` identical pieces. Emission order is line
/// array order, then quantity order; a piece's position in the returned
/// vec is the tie-break key used by the packer.
pub fn expand_pieces(lines: &[OrderLine]) -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(lines.iter().map(|l| l.qty as usize).sum());
    for (line_idx, line) in lines.iter().enumerate() {
        for _ in 0..line.qty {
            pieces.push(Piece {
                width_mm: line.width_mm,
                drop_mm: line.drop_mm,
                line_idx,
            });
        }
    }
    pieces
}

/// Picks the single roll width for the whole order: the smallest
/// candidate that takes the widest piece, else a custom roll cut to the
/// widest piece. Candidates must be sorted ascending.
pub fn select_roll_width(pieces: &[Piece], available_widths_mm: &[u32]) -> u32 {
    let max_w = pieces.iter().map(|p| p.width_mm).max().unwrap_or(0);
    available_widths_mm
        .iter()
        .copied()
        .find(|w| *w >= max_w)
        .unwrap_or(max_w)
}

/// First-Fit Decreasing Height over a single open shelf.
///
/// Pieces are stable-sorted by drop descending (ties keep emission
/// order). Each piece goes onto the open shelf if its width fits the
/// remaining roll width, otherwise the shelf is closed and a new one is
/// opened at the current length cursor, pushed past the next 5900 mm
/// marker boundary if it would straddle it.
pub fn pack(pieces: &[Piece], roll_width_mm: u32, lines: &[OrderLine]) -> Result<Layout> {
    let mut order: Vec<usize> = (0..pieces.len()).collect();
    order.sort_by_key(|&i| (std::cmp::Reverse(pieces[i].drop_mm), i));

    let mut shelves: Vec<Shelf> = Vec::new();
    for idx in order {
        let piece = pieces[idx];
        if piece.width_mm > roll_width_mm {
            return Err(EngineError::PieceExceedsRoll {
                line_id: lines[piece.line_idx].line_id.clone(),
                width_mm: piece.width_mm,
                roll_width_mm,
            });
        }

        match shelves.last_mut() {
            Some(open) if open.width_used_mm + piece.width_mm <= roll_width_mm => {
                open.width_used_mm += piece.width_mm;
                open.pieces.push(idx);
            }
            _ => {
                shelves.push(Shelf {
                    height_mm: piece.drop_mm,
                    start_mm: 0,
                    gap_before_mm: 0,
                    width_used_mm: piece.width_mm,
                    pieces: vec![idx],
                });
            }
        }
    }

    let used_length_mm = align(&mut shelves);
    tracing::debug!(
        pieces = pieces.len(),
        shelves = shelves.len(),
        roll_width_mm,
        used_length_mm,
        "packed order"
    );

    Ok(Layout {
        roll_width_mm,
        shelves,
        used_length_mm,
    })
}

/// Recomputes shelf offsets and boundary gaps for a shelf sequence and
/// returns the used length. A shelf that would straddle the next 5900 mm
/// boundary gets a pure-waste gap pushing it to the boundary.
pub fn align(shelves: &mut [Shelf]) -> u64 {
    let mut cursor = 0u64;
    for shelf in shelves.iter_mut() {
        let boundary = (cursor / MARKER_LENGTH_MM + 1) * MARKER_LENGTH_MM;
        let gap = if cursor + shelf.height_mm as u64 > boundary {
            boundary - cursor
        } else {
            0
        };
        shelf.gap_before_mm = gap;
        shelf.start_mm = cursor + gap;
        cursor = shelf.end_mm();
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MARKER_LENGTH_MM;
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

    fn shelf_width_invariant(layout: &Layout, pieces: &[Piece]) {
        for shelf in &layout.shelves {
            let total: u32 = shelf.pieces.iter().map(|&i| pieces[i].width_mm).sum();
            assert!(total <= layout.roll_width_mm);
            assert_eq!(total, shelf.width_used_mm);
        }
    }

    fn boundary_invariant(layout: &Layout) {
        for shelf in &layout.shelves {
            let next = (shelf.start_mm / MARKER_LENGTH_MM + 1) * MARKER_LENGTH_MM;
            assert!(
                shelf.end_mm() <= next,
                "shelf [{}, {}) straddles {}",
                shelf.start_mm,
                shelf.end_mm(),
                next
            );
        }
    }

    #[test]
    fn expand_follows_line_order() {
        let lines = vec![line("L1", 1000, 2000, 2), line("L2", 800, 1500, 1)];
        let pieces = expand_pieces(&lines);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].line_idx, 0);
        assert_eq!(pieces[1].line_idx, 0);
        assert_eq!(pieces[2].line_idx, 1);
    }

    #[test]
    fn selects_smallest_fitting_candidate() {
        let pieces = expand_pieces(&[line("L1", 2400, 2100, 1)]);
        assert_eq!(select_roll_width(&pieces, &[1900, 2050, 2400, 3000]), 2400);
        assert_eq!(select_roll_width(&pieces, &[2500, 3000]), 2500);
    }

    #[test]
    fn falls_back_to_custom_roll() {
        let pieces = expand_pieces(&[line("L1", 3100, 2100, 1)]);
        // No candidate fits
        assert_eq!(select_roll_width(&pieces, &[1900, 2050]), 3100);
        // Empty candidate list
        assert_eq!(select_roll_width(&pieces, &[]), 3100);
    }

    #[test]
    fn packs_side_by_side_until_width_runs_out() {
        let lines = vec![line("L1", 900, 2000, 3)];
        let pieces = expand_pieces(&lines);
        let layout = pack(&pieces, 2000, &lines).unwrap();
        // Two fit per shelf, the third opens a new one
        assert_eq!(layout.levels(), 2);
        assert_eq!(layout.used_length_mm, 4000);
        shelf_width_invariant(&layout, &pieces);
        boundary_invariant(&layout);
    }

    #[test]
    fn taller_pieces_pack_first() {
        let lines = vec![line("SHORT", 1000, 1200, 1), line("TALL", 1000, 3000, 1)];
        let pieces = expand_pieces(&lines);
        let layout = pack(&pieces, 1500, &lines).unwrap();
        assert_eq!(layout.shelves[0].height_mm, 3000);
        assert_eq!(layout.shelves[1].height_mm, 1200);
    }

    #[test]
    fn equal_drops_keep_emission_order() {
        let lines = vec![line("L1", 700, 2000, 1), line("L2", 600, 2000, 1)];
        let pieces = expand_pieces(&lines);
        let layout = pack(&pieces, 2000, &lines).unwrap();
        assert_eq!(layout.levels(), 1);
        assert_eq!(layout.shelves[0].pieces, vec![0, 1]);
    }

    #[test]
    fn gap_inserted_before_boundary_straddle() {
        // Shelves of 2950 + 2940 put the cursor at 5890; a 60mm shelf
        // would end at 5950, across the 5900 boundary.
        let lines = vec![
            line("A", 1000, 2950, 1),
            line("B", 1000, 2940, 1),
            line("C", 1000, 60, 1),
        ];
        let pieces = expand_pieces(&lines);
        let layout = pack(&pieces, 1000, &lines).unwrap();
        assert_eq!(layout.levels(), 3);
        let third = &layout.shelves[2];
        assert_eq!(third.gap_before_mm, 10);
        assert_eq!(third.start_mm, 5900);
        assert_eq!(layout.used_length_mm, 5960);
        assert_eq!(layout.gap_total_mm(), 10);
        boundary_invariant(&layout);
    }

    #[test]
    fn no_gap_when_shelf_fits_before_boundary() {
        let lines = vec![line("A", 1000, 2950, 2)];
        let pieces = expand_pieces(&lines);
        let layout = pack(&pieces, 1000, &lines).unwrap();
        assert_eq!(layout.used_length_mm, 5900);
        assert_eq!(layout.gap_total_mm(), 0);
        boundary_invariant(&layout);
    }

    #[test]
    fn oversized_piece_names_its_line() {
        let lines = vec![line("L1", 900, 2000, 1), line("WIDE", 1800, 1000, 1)];
        let pieces = expand_pieces(&lines);
        let err = pack(&pieces, 1500, &lines).unwrap_err();
        assert_eq!(
            err,
            EngineError::PieceExceedsRoll {
                line_id: "WIDE".to_string(),
                width_mm: 1800,
                roll_width_mm: 1500,
            }
        );
    }

    #[test]
    fn pack_is_deterministic() {
        let lines = vec![
            line("L1", 1200, 2100, 3),
            line("L2", 800, 2100, 2),
            line("L3", 600, 900, 5),
        ];
        let pieces = expand_pieces(&lines);
        let a = pack(&pieces, 2400, &lines).unwrap();
        let b = pack(&pieces, 2400, &lines).unwrap();
        assert_eq!(a, b);
    }
}
