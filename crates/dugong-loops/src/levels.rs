//! Routing levels of ports, opposing segments and edges.
//!
//! A level is the routing band a loop occupies on a side: level 1 runs closest to the node,
//! every enclosing loop gets a strictly higher band.

use std::cmp::Reverse;

use crate::geometry::PortSide;
use crate::model::{ComponentId, EdgeId, PerSide, RoutingDirection, SegmentId, SelfLoopNode};

/// Assigns port levels from the component dependency forest of every side.
///
/// With hyperedges disabled, every port additionally reserves one band per extra edge so that
/// parallel loops sharing a port never share a band, and enclosing components move above them.
pub fn calculate_port_levels(node: &mut SelfLoopNode) {
    let widen = !node.supports_hyperedges();
    for port in &mut node.ports {
        port.maximum_level = 0;
    }
    for side in PortSide::ALL {
        let top = node.side(side).component_dependencies.clone();
        let maximum = if top.is_empty() {
            0
        } else {
            component_port_levels(node, side, &top, widen, 0)
        };
        tracing::debug!(%side, maximum, "port levels");
        node.side_mut(side).maximum_port_level = maximum;
    }
}

/// Levels `components` and everything nested inside them, returning the highest port level.
fn component_port_levels(
    node: &mut SelfLoopNode,
    side: PortSide,
    components: &[ComponentId],
    widen: bool,
    depth: usize,
) -> u32 {
    let mut maximum = 0;
    for &component in components {
        let deps = node.component(component).dependencies[side].clone();
        // Bounded by the component count.
        let inner = if deps.is_empty() || depth >= node.components.len() {
            0
        } else {
            component_port_levels(node, side, &deps, widen, depth + 1)
        };
        let level = inner + 1;
        for port in node.component_ports_on(component, side) {
            let extra = if widen {
                node.port(port).edges.len().saturating_sub(1) as u32
            } else {
                0
            };
            node.port_mut(port).maximum_level = level + extra;
            maximum = maximum.max(level + extra);
        }
    }
    maximum
}

/// Numbers opposing segments upward from each side's maximum port level.
pub fn calculate_opposing_segment_levels(node: &mut SelfLoopNode) {
    let hyperedges = node.supports_hyperedges();
    for side in PortSide::ALL {
        let mut level = node.side(side).maximum_port_level;

        if hyperedges {
            let mut segments = node.side(side).distinct_segments();
            segments.sort_by_key(|&s| (component_key(node, node.segment(s).component), s));
            for segment in segments {
                let assigned = match node.segment(segment).level_giving_port {
                    Some(port) => node.port(port).maximum_level,
                    None => {
                        level += 1;
                        level
                    }
                };
                node.segment_mut(segment).level = assigned;
            }
        } else {
            let mut entries: Vec<(EdgeId, SegmentId)> = node
                .side(side)
                .opposing_segments
                .iter()
                .map(|(&e, &s)| (e, s))
                .collect();
            entries.sort_by_key(|&(edge, segment)| {
                (
                    edge_order_near(node, edge, side),
                    component_key(node, node.segment(segment).component),
                    edge,
                )
            });
            for (_, segment) in entries {
                level += 1;
                node.segment_mut(segment).level = level;
            }
        }

        node.side_mut(side).maximum_segment_level = level;
    }
}

/// Segments of components opening in the same direction are ordered by descending port index.
fn component_key(
    node: &SelfLoopNode,
    component: ComponentId,
) -> (Option<RoutingDirection>, Reverse<usize>) {
    match node.component(component).ports.first() {
        Some(&first) => {
            let port = node.port(first);
            (port.direction, Reverse(port.original_index))
        }
        None => (None, Reverse(0)),
    }
}

/// Edge order on `side`, or on the closest side counter-clockwise that has one.
fn edge_order_near(node: &SelfLoopNode, edge: EdgeId, side: PortSide) -> u32 {
    let orders = &node.edge(edge).orders;
    let mut current = side;
    for _ in 0..PortSide::ALL.len() {
        if let Some(order) = orders[current] {
            return order;
        }
        current = current.left();
    }
    0
}

/// Per side, orders every edge as `1 + max(order of its nested edges)`.
pub fn calculate_edge_orders(node: &mut SelfLoopNode) {
    for edge in &mut node.edges {
        edge.orders = PerSide::default();
    }
    for side in PortSide::ALL {
        for component in node.component_ids() {
            let edges = node.component(component).edge_dependencies[side].clone();
            edge_orders(node, side, &edges, 0);
        }
    }
}

fn edge_orders(
    node: &mut SelfLoopNode,
    side: PortSide,
    edges: &[EdgeId],
    depth: usize,
) -> u32 {
    let mut maximum = 0;
    for &edge in edges {
        let nested = node.edge(edge).dependencies[side].clone();
        let order = if nested.is_empty() || depth >= node.edges.len() {
            1
        } else {
            edge_orders(node, side, &nested, depth + 1) + 1
        };
        node.edge_mut(edge).orders[side] = Some(order);
        maximum = maximum.max(order);
    }
    maximum
}

/// Records for every edge the level it is routed at on each side.
///
/// Endpoint sides take the port level; with hyperedges disabled the edges sharing a port are
/// spread over that port's bands by edge order. Passed sides take the opposing segment level.
pub fn assign_edge_levels(node: &mut SelfLoopNode) {
    let hyperedges = node.supports_hyperedges();
    for edge in node.edge_ids() {
        for side in PortSide::ALL {
            let level = endpoint_level(node, edge, side, hyperedges).or_else(|| {
                node.side(side)
                    .opposing_segments
                    .get(&edge)
                    .map(|&s| node.segment(s).level)
            });
            node.edge_mut(edge).levels[side] = level;
        }
    }
}

fn endpoint_level(
    node: &SelfLoopNode,
    edge: EdgeId,
    side: PortSide,
    hyperedges: bool,
) -> Option<u32> {
    let e = node.edge(edge);
    [e.source, e.target]
        .into_iter()
        .filter(|&p| node.port(p).side == side)
        .map(|p| {
            let port = node.port(p);
            if hyperedges {
                port.maximum_level
            } else {
                let order = i64::from(e.orders[side].unwrap_or(1));
                let level = i64::from(port.maximum_level) - port.edges.len() as i64 + order;
                level.max(1) as u32
            }
        })
        .max()
}
