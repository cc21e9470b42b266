//! Outward space reserved for labels.
//!
//! Offsets depend on which candidate every label has chosen, so both stages start from a clean
//! slate and can be rerun after any label changes its position.

use crate::geometry::PortSide;
use crate::model::{ComponentId, PerSide, SelfLoopLabel, SelfLoopNode};
use crate::options::SelfLoopOptions;

/// Clearance a label needs in front of `side`: its outward extent beyond the band spacing.
pub fn simple_label_offset(
    label: Option<&SelfLoopLabel>,
    side: PortSide,
    options: &SelfLoopOptions,
) -> f64 {
    match label {
        Some(label) => (label.size.outward_extent(side) - options.edge_edge_spacing
            + options.edge_label_spacing)
            .max(0.0),
        None => 0.0,
    }
}

/// Walks every side's dependency forest innermost-first, storing the space nested components
/// need on their container's ports and the per-side maximum label offset.
pub fn calculate_port_label_offsets(node: &mut SelfLoopNode) -> PerSide<f64> {
    for port in &mut node.ports {
        port.other_edge_offset = 0.0;
    }
    for segment in &mut node.segments {
        segment.label_offset = 0.0;
    }
    for label in &mut node.labels {
        label.shift = 0.0;
    }

    let mut offsets = PerSide::default();
    for side in PortSide::ALL {
        let top = node.side(side).component_dependencies.clone();
        let maximum = component_offsets(node, side, &top, None, 0);
        node.side_mut(side).maximum_label_offset = maximum;
        offsets[side] = maximum;
    }
    offsets
}

fn component_offsets(
    node: &mut SelfLoopNode,
    side: PortSide,
    components: &[ComponentId],
    parent_level: Option<u32>,
    depth: usize,
) -> f64 {
    let mut maximum = 0.0_f64;
    for &component in components {
        let level = node.component_level_on(component, side).unwrap_or(0);
        let at_level = parent_level.is_none_or(|parent| level + 1 == parent);
        let label_offset = label_offset_on(node, component, side);
        let deps = node.component(component).dependencies[side].clone();

        let contribution = if deps.is_empty() || depth >= node.components.len() {
            if at_level { label_offset } else { 0.0 }
        } else {
            let base = base_level_on(node, component, side).unwrap_or(level);
            let inner = component_offsets(node, side, &deps, Some(base), depth + 1);
            for port in node.component_ports_on(component, side) {
                node.port_mut(port).other_edge_offset = inner;
            }
            if let Some(label) = node.component(component).label {
                let label = node.label_mut(label);
                if label.side() == Some(side) {
                    label.shift += inner;
                }
            }
            if at_level { label_offset + inner } else { inner }
        };
        maximum = maximum.max(contribution);
    }
    maximum
}

/// Band of `component` on `side` before shared ports were widened by their extra edges.
fn base_level_on(node: &SelfLoopNode, component: ComponentId, side: PortSide) -> Option<u32> {
    let widened = !node.supports_hyperedges();
    node.component_ports_on(component, side)
        .into_iter()
        .map(|p| {
            let port = node.port(p);
            let extra = if widened {
                port.edges.len().saturating_sub(1) as u32
            } else {
                0
            };
            port.maximum_level.saturating_sub(extra)
        })
        .min()
}

/// Label clearance of `component` on `side`, unless its label sits elsewhere or the component
/// only passes this side.
fn label_offset_on(node: &SelfLoopNode, component: ComponentId, side: PortSide) -> f64 {
    let Some(label) = node.component(component).label.map(|l| node.label(l)) else {
        return 0.0;
    };
    if label.side() != Some(side) {
        return 0.0;
    }
    let passes_side = node
        .side(side)
        .opposing_segments
        .values()
        .any(|&s| node.segment(s).component == component);
    if passes_side {
        return 0.0;
    }
    simple_label_offset(Some(label), side, &node.options)
}

/// Stacks the labels of opposing segments outside everything the side's ports reserved.
pub fn calculate_opposing_segment_label_offsets(node: &mut SelfLoopNode) {
    let spacing = node.options.edge_edge_spacing + node.options.edge_label_spacing;
    for side in PortSide::ALL {
        let mut segments = node.side(side).distinct_segments();
        segments.sort_by_key(|&s| (node.segment(s).level, s));

        let mut running = node.side(side).maximum_label_offset;
        for segment in segments {
            node.segment_mut(segment).label_offset = running;
            let component = node.segment(segment).component;
            let Some(label) = node.component(component).label else {
                continue;
            };
            let label = node.label_mut(label);
            if label.side() == Some(side) {
                label.shift += running;
                running += label.size.along_extent(side) + spacing;
            }
        }
    }
}
