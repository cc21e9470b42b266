//! Base penalties of label candidates and crossing weights.

use crate::geometry::PortSide;
use crate::model::LabelAlignment;

pub const CENTERED: f64 = 0.0;
pub const LEADING_EDGE: f64 = 0.5;
pub const TRAILING_EDGE: f64 = 0.5;

/// Added to candidates on a segment that does not span a whole side.
pub const SHORT_SEGMENT: f64 = 1.0;

pub const NODE_CROSSING: f64 = 100.0;
pub const LABEL_CROSSING: f64 = 40.0;
pub const EDGE_CROSSING: f64 = 10.0;

/// Labels above the node read best, labels at its sides worst.
pub fn side_penalty(side: PortSide) -> f64 {
    match side {
        PortSide::North => 0.0,
        PortSide::South => 0.25,
        PortSide::East | PortSide::West => 0.5,
    }
}

pub fn alignment_penalty(alignment: LabelAlignment) -> f64 {
    match alignment {
        LabelAlignment::Centered => CENTERED,
        LabelAlignment::LeadingEdge => LEADING_EDGE,
        LabelAlignment::TrailingEdge => TRAILING_EDGE,
    }
}
