//! Orthogonal bend points for every self-loop edge.

use serde::Serialize;

use crate::geometry::{Point, opposing_corner_point, single_corner_point};
use crate::model::{EdgeId, SelfLoopNode, SelfLoopPort};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRoute {
    pub edge: EdgeId,
    /// Source anchor, bend points, target anchor.
    pub points: Vec<Point>,
}

impl EdgeRoute {
    pub fn bend_points(&self) -> &[Point] {
        match self.points.len() {
            0..=2 => &[],
            n => &self.points[1..n - 1],
        }
    }
}

/// Routes every edge from its levels and offsets. Edge levels should be assigned first.
pub fn route_edges(node: &SelfLoopNode) -> Vec<EdgeRoute> {
    node.edge_ids().map(|edge| route_edge(node, edge)).collect()
}

pub fn route_edge(node: &SelfLoopNode, edge: EdgeId) -> EdgeRoute {
    let e = node.edge(edge);
    let source = node.port(e.source);
    let target = node.port(e.target);
    let source_bend = endpoint_bend(node, edge, source);
    let target_bend = endpoint_bend(node, edge, target);

    let mut points = vec![source.anchor, source_bend];
    if e.source == e.target {
        points.push(target.anchor);
        return EdgeRoute { edge, points };
    }

    let passed = node.edge_passed_sides(edge);
    if passed.is_empty() && source.side == target.side {
        points.extend([target_bend, target.anchor]);
        return EdgeRoute { edge, points };
    }

    let options = &node.options;
    let mut previous = source_bend;
    for side in passed {
        let (level, label_offset) = match node.side(side).opposing_segments.get(&edge) {
            Some(&s) => (node.segment(s).level, node.segment(s).label_offset),
            None => (e.levels[side].unwrap_or(source.maximum_level), 0.0),
        };
        let padding = f64::from(level) * options.edge_edge_spacing
            + label_offset
            + options.edge_label_spacing;
        previous = opposing_corner_point(previous, side, node.size, padding);
        points.push(previous);
    }
    points.push(single_corner_point(previous, target_bend, target.side));
    points.extend([target_bend, target.anchor]);
    EdgeRoute { edge, points }
}

fn endpoint_bend(node: &SelfLoopNode, edge: EdgeId, port: &SelfLoopPort) -> Point {
    let level = node.edge(edge).levels[port.side].unwrap_or(port.maximum_level);
    let distance = f64::from(level) * node.options.edge_edge_spacing + port.other_edge_offset;
    port.anchor.translate(port.side.normal(), distance)
}
