use serde::Serialize;

use crate::error::Result;
use crate::geometry::{Point, PortSide};
use crate::labeling::{self, LabelEvaluation};
use crate::model::{ComponentId, EdgeId, LabelAlignment, PerSide, SelfLoopNode, TextAlignment};
use crate::report::{LoopReporter, TraceEvent};
use crate::{dependencies, levels, offsets, routing};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLayout {
    pub edge: EdgeId,
    pub levels: PerSide<Option<u32>>,
    pub dependencies: PerSide<Vec<EdgeId>>,
    pub bend_points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLayout {
    pub component: ComponentId,
    /// Top-left corner in node-local coordinates.
    pub position: Point,
    pub side: PortSide,
    pub alignment: LabelAlignment,
    pub text_alignment: TextAlignment,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SelfLoopLayout {
    pub edges: Vec<EdgeLayout>,
    pub labels: Vec<LabelLayout>,
    pub evaluation: LabelEvaluation,
}

/// Runs every self-loop stage on `node` and collects the resulting geometry.
///
/// Set `DUGONG_LOOPS_TIMING=1` to log per-stage durations.
pub fn layout_self_loops(
    node: &mut SelfLoopNode,
    reporter: &mut dyn LoopReporter,
) -> Result<SelfLoopLayout> {
    let timing_enabled = std::env::var("DUGONG_LOOPS_TIMING")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    #[derive(Debug, Default, Clone)]
    struct LoopTimings {
        total: std::time::Duration,
        dependencies: std::time::Duration,
        levels: std::time::Duration,
        offsets: std::time::Duration,
        candidates: std::time::Duration,
        evaluation: std::time::Duration,
        routing: std::time::Duration,
    }

    let total_start = timing_enabled.then(std::time::Instant::now);
    let mut timings = LoopTimings::default();

    let dependencies_start = timing_enabled.then(std::time::Instant::now);
    dependencies::calculate_component_dependencies(node);
    dependencies::calculate_edge_dependencies(node)?;
    if let Some(s) = dependencies_start {
        timings.dependencies = s.elapsed();
    }

    let levels_start = timing_enabled.then(std::time::Instant::now);
    levels::calculate_port_levels(node);
    levels::calculate_edge_orders(node);
    levels::calculate_opposing_segment_levels(node);
    levels::assign_edge_levels(node);
    if let Some(s) = levels_start {
        timings.levels = s.elapsed();
    }

    let offsets_start = timing_enabled.then(std::time::Instant::now);
    offsets::calculate_port_label_offsets(node);
    offsets::calculate_opposing_segment_label_offsets(node);
    if let Some(s) = offsets_start {
        timings.offsets = s.elapsed();
    }

    let mut evaluation = LabelEvaluation::default();
    if node.has_labels() {
        let candidates_start = timing_enabled.then(std::time::Instant::now);
        labeling::assign_label_candidates(node)?;
        for component in node.labeled_components() {
            if let Some(label) = node.component(component).label {
                reporter.report(&TraceEvent::Candidates {
                    component,
                    count: node.label(label).candidates.len(),
                });
            }
        }
        if let Some(s) = candidates_start {
            timings.candidates = s.elapsed();
        }

        let evaluation_start = timing_enabled.then(std::time::Instant::now);
        evaluation = labeling::evaluate_positions(node, reporter);
        if let Some(s) = evaluation_start {
            timings.evaluation = s.elapsed();
        }
    }

    let routing_start = timing_enabled.then(std::time::Instant::now);
    let routes = routing::route_edges(node);
    if let Some(s) = routing_start {
        timings.routing = s.elapsed();
    }

    let edges = routes
        .into_iter()
        .map(|route| {
            let e = node.edge(route.edge);
            EdgeLayout {
                edge: route.edge,
                levels: e.levels.clone(),
                dependencies: e.dependencies.clone(),
                bend_points: route.bend_points().to_vec(),
            }
        })
        .collect();

    let labels = node
        .labels
        .iter()
        .filter_map(|label| {
            let chosen = label.chosen()?;
            Some(LabelLayout {
                component: label.component,
                position: label.position()?,
                side: chosen.side,
                alignment: chosen.alignment,
                text_alignment: chosen.text_alignment,
            })
        })
        .collect();

    if let Some(s) = total_start {
        timings.total = s.elapsed();
        tracing::info!(
            total = ?timings.total,
            dependencies = ?timings.dependencies,
            levels = ?timings.levels,
            offsets = ?timings.offsets,
            candidates = ?timings.candidates,
            evaluation = ?timings.evaluation,
            routing = ?timings.routing,
            "self-loop layout timings"
        );
    }

    Ok(SelfLoopLayout {
        edges,
        labels,
        evaluation,
    })
}
