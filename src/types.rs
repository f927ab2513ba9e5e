use serde::{Deserialize, Serialize};

pub const MAX_WIDTH_MM: u32 = 3200;
pub const MAX_DROP_MM: u32 = 5000;
pub const MAX_LINES: usize = 1000;
pub const MAX_QTY_PER_LINE: u32 = 1000;

/// Marker segment length along the roll. No shelf may straddle a
/// multiple of this.
pub const MARKER_LENGTH_MM: u64 = 5900;

/// Product family for an order. The engine packs both the same way;
/// the field is part of the order contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Blinds,
    Header,
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Model::Blinds => write!(f, "blinds"),
            Model::Header => write!(f, "header"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: String,
    pub width_mm: u32,
    pub drop_mm: u32,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub quote_id: String,
    pub model: Model,
    /// Candidate roll widths. Order-irrelevant; normalization dedupes
    /// and sorts ascending.
    #[serde(default)]
    pub available_widths_mm: Vec<u32>,
    /// Ordered: line position is the packing tie-break key.
    pub lines: Vec<OrderLine>,
}

/// One physical rectangle to cut, produced by expanding a line's qty.
/// `line_idx` indexes the order's line array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub width_mm: u32,
    pub drop_mm: u32,
    pub line_idx: usize,
}

impl Piece {
    pub fn area_mm2(&self) -> u64 {
        self.width_mm as u64 * self.drop_mm as u64
    }
}

/// A fixed-height band across the roll width. Pieces sit side by side;
/// `height_mm` is the drop of the first piece placed and never grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shelf {
    pub height_mm: u32,
    /// Offset along the roll, gaps included.
    pub start_mm: u64,
    /// Pure-waste gap inserted before this shelf so it does not
    /// straddle a marker boundary.
    pub gap_before_mm: u64,
    pub width_used_mm: u32,
    /// Indices into the packing run's piece arena.
    pub pieces: Vec<usize>,
}

impl Shelf {
    pub fn end_mm(&self) -> u64 {
        self.start_mm + self.height_mm as u64
    }
}

/// Final shelf sequence for one order on one roll width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub roll_width_mm: u32,
    pub shelves: Vec<Shelf>,
    /// Sum of shelf heights plus inserted boundary gaps.
    pub used_length_mm: u64,
}

impl Layout {
    pub fn levels(&self) -> usize {
        self.shelves.len()
    }

    pub fn gap_total_mm(&self) -> u64 {
        self.shelves.iter().map(|s| s.gap_before_mm).sum()
    }
}

/// Per-line efficiency metrics. Areas in m², lengths in mm,
/// percentages 0..=100. Values are unrounded; rounding is presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    pub line_id: String,
    pub waste_factor_pct: f64,
    pub utilization: f64,
    pub used_length_mm: f64,
    pub blind_area_m2: f64,
    pub roll_area_m2: f64,
    pub waste_area_m2: f64,
    pub roll_width_mm: u32,
    pub pieces: usize,
    pub levels: usize,
}

/// Order-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub eff_pct: f64,
    pub waste_pct: f64,
    pub total_area_m2: f64,
    pub total_used_area_m2: f64,
    pub total_waste_area_m2: f64,
    pub total_pieces: usize,
    pub total_levels: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyResult {
    pub results: Vec<LineResult>,
    pub totals: Totals,
}
