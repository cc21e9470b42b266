//! Candidate label positions per loop shape.
//!
//! A loop is traced as a chain of axis-parallel segments: from the bend point in front of its
//! first port, around the corners of every side it passes, to the bend point in front of its last
//! port. Every segment offers a centered, a leading-edge and a trailing-edge placement.

use crate::error::{Error, Result};
use crate::geometry::{
    Point, PortSide, Size, opposing_corner_point, sides_between, single_corner_point,
};
use crate::labeling::penalties;
use crate::model::{
    ComponentId, LabelAlignment, LabelCandidate, SelfLoopNode, SelfLoopPort, SelfLoopType,
    TextAlignment,
};

const ALIGNMENTS: [LabelAlignment; 3] = [
    LabelAlignment::Centered,
    LabelAlignment::LeadingEdge,
    LabelAlignment::TrailingEdge,
];

/// One straight piece of a loop a label can be placed along.
#[derive(Debug, Clone, Copy)]
struct Segment {
    from: Point,
    to: Point,
    /// Side of the node the segment runs in front of.
    side: PortSide,
    /// Side of the segment the label is moved to.
    label_side: PortSide,
    penalty_side: PortSide,
    short: bool,
}

impl Segment {
    fn along(from: Point, to: Point, side: PortSide, short: bool) -> Self {
        Self {
            from,
            to,
            side,
            label_side: side,
            penalty_side: side,
            short,
        }
    }
}

/// Candidate positions for the label of `component`, computed from the current port levels and
/// segment offsets. Does not touch the node; components without a label yield no candidates.
pub fn generate_positions(
    node: &SelfLoopNode,
    component: ComponentId,
) -> Result<Vec<LabelCandidate>> {
    let c = node.component(component);
    let (Some(&first), Some(&last)) = (c.ports.first(), c.ports.last()) else {
        return Err(Error::EmptyComponent { component });
    };
    let Some(label) = c.label else {
        return Ok(Vec::new());
    };
    let size = node.label(label).size;
    let start = node.port(first);
    let end = node.port(last);
    let first_bend = bend_point(node, start);
    let last_bend = bend_point(node, end);

    let segments = match c.loop_type {
        SelfLoopType::Side => {
            let side = start.side;
            vec![
                Segment::along(first_bend, last_bend, side, false),
                Segment {
                    label_side: side.left(),
                    ..Segment::along(start.anchor, first_bend, side, true)
                },
                Segment {
                    label_side: side.right(),
                    ..Segment::along(end.anchor, last_bend, side, true)
                },
            ]
        }
        loop_type => {
            let clockwise = node.runs_clockwise(component);
            let passed = if start.side == end.side {
                sides_between(start.side, start.side, clockwise)
            } else {
                sides_between(start.side, end.side, clockwise)
            };

            let mut points = vec![first_bend];
            let mut previous = first_bend;
            for &side in &passed {
                let padding = corner_padding(node, component, side, start.maximum_level);
                previous = opposing_corner_point(previous, side, node.size, padding);
                points.push(previous);
            }
            points.push(single_corner_point(previous, last_bend, end.side));
            points.push(last_bend);

            let mut sides = Vec::with_capacity(passed.len() + 2);
            sides.push(start.side);
            sides.extend(passed);
            sides.push(end.side);

            let count = sides.len();
            sides
                .into_iter()
                .enumerate()
                .map(|(k, side)| {
                    let short = loop_type != SelfLoopType::Corner && (k == 0 || k + 1 == count);
                    Segment::along(points[k], points[k + 1], side, short)
                })
                .collect()
        }
    };

    let mut candidates = Vec::with_capacity(segments.len() * ALIGNMENTS.len());
    for segment in &segments {
        for alignment in ALIGNMENTS {
            candidates.push(candidate(size, segment, alignment));
        }
    }
    tracing::trace!(%component, candidates = candidates.len(), "label candidates");
    Ok(candidates)
}

/// Replaces the candidates of every label with freshly generated ones.
pub fn assign_label_candidates(node: &mut SelfLoopNode) -> Result<()> {
    for component in node.labeled_components() {
        let candidates = generate_positions(node, component)?;
        if let Some(label) = node.component(component).label {
            node.label_mut(label).set_candidates(candidates);
        }
    }
    Ok(())
}

fn bend_point(node: &SelfLoopNode, port: &SelfLoopPort) -> Point {
    let distance = f64::from(port.maximum_level) * node.options.edge_edge_spacing
        + node.options.edge_label_spacing;
    port.anchor.translate(port.side.normal(), distance)
}

/// Distance from the node at which the loop of `component` runs past `side`.
fn corner_padding(
    node: &SelfLoopNode,
    component: ComponentId,
    side: PortSide,
    fallback_level: u32,
) -> f64 {
    let segment = node
        .component(component)
        .edges
        .first()
        .and_then(|edge| node.side(side).opposing_segments.get(edge))
        .map(|&s| node.segment(s));
    let (level, label_offset) = match segment {
        Some(segment) => (segment.level, segment.label_offset),
        None => (fallback_level, 0.0),
    };
    node.options.edge_edge_spacing * f64::from(level)
        + node.options.edge_label_spacing
        + label_offset
}

fn candidate(size: Size, segment: &Segment, alignment: LabelAlignment) -> LabelCandidate {
    let (start, end) = left_or_top_first(segment.from, segment.to);
    let position = match alignment {
        LabelAlignment::Centered => centered(size, segment.label_side, start, end),
        LabelAlignment::LeadingEdge => leading(size, segment.label_side, start),
        LabelAlignment::TrailingEdge => trailing(size, segment.label_side, start, end),
    }
    .finite_or(start);

    let text_alignment = match (segment.label_side, alignment) {
        (PortSide::East, _) => TextAlignment::Left,
        (PortSide::West, _) => TextAlignment::Right,
        (_, LabelAlignment::Centered) => TextAlignment::Center,
        (_, LabelAlignment::LeadingEdge) => TextAlignment::Left,
        (_, LabelAlignment::TrailingEdge) => TextAlignment::Right,
    };

    let mut base_penalty =
        penalties::side_penalty(segment.penalty_side) + penalties::alignment_penalty(alignment);
    if segment.short {
        base_penalty += penalties::SHORT_SEGMENT;
    }

    LabelCandidate {
        position,
        side: segment.side,
        alignment,
        text_alignment,
        base_penalty,
    }
}

fn left_or_top_first(a: Point, b: Point) -> (Point, Point) {
    if b.x < a.x || (b.x == a.x && b.y < a.y) {
        (b, a)
    } else {
        (a, b)
    }
}

fn centered(size: Size, label_side: PortSide, start: Point, end: Point) -> Point {
    let length = start.distance(end);
    match label_side {
        PortSide::North => Point::new(start.x + (length - size.width) / 2.0, start.y - size.height),
        PortSide::East => Point::new(start.x, start.y + (length - size.height) / 2.0),
        PortSide::South => Point::new(start.x + (length - size.width) / 2.0, start.y),
        PortSide::West => Point::new(start.x - size.width, start.y + (length - size.height) / 2.0),
    }
}

fn leading(size: Size, label_side: PortSide, start: Point) -> Point {
    match label_side {
        PortSide::North => Point::new(start.x, start.y - size.height),
        PortSide::West => Point::new(start.x - size.width, start.y),
        PortSide::East | PortSide::South => start,
    }
}

fn trailing(size: Size, label_side: PortSide, start: Point, end: Point) -> Point {
    let back = end.direction_to(start);
    match label_side {
        PortSide::North => Point::new(end.x, end.y - size.height).translate(back, size.width),
        PortSide::East => end.translate(back, size.height),
        PortSide::South => end.translate(back, size.width),
        PortSide::West => Point::new(end.x - size.width, end.y).translate(back, size.height),
    }
}
