//! Post-pack compaction: merge adjacent equal-height shelves when their
//! combined piece width still fits the roll.

use crate::shelf::align;
use crate::types::Layout;

/// Merges adjacent shelf pairs of identical height whose combined used
/// width fits the roll, repeating until no pair qualifies. After every
/// merge the whole sequence is re-aligned, which recomputes offsets and
/// marker-boundary gaps; shifting shelves left by a raw height delta
/// could slide a later shelf across a boundary, re-alignment cannot.
/// Never increases the used length.
pub fn compact(layout: &mut Layout) {
    let mut merges = 0usize;
    let mut i = 0;
    while i + 1 < layout.shelves.len() {
        let fits = layout.shelves[i].height_mm == layout.shelves[i + 1].height_mm
            && layout.shelves[i].width_used_mm + layout.shelves[i + 1].width_used_mm
                <= layout.roll_width_mm;
        if fits {
            let removed = layout.shelves.remove(i + 1);
            let kept = &mut layout.shelves[i];
            kept.width_used_mm += removed.width_used_mm;
            kept.pieces.extend(removed.pieces);
            merges += 1;
            // Re-check the same position: the next shelf may merge too.
        } else {
            i += 1;
        }
    }

    if merges > 0 {
        let before = layout.used_length_mm;
        layout.used_length_mm = align(&mut layout.shelves);
        debug_assert!(layout.used_length_mm <= before);
        tracing::debug!(
            merges,
            shelves = layout.shelves.len(),
            used_length_mm = layout.used_length_mm,
            "compacted layout"
        );
    }
}
