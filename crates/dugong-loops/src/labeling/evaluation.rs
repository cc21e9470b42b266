//! Hill-climbing choice of one candidate per label.
//!
//! Every trial runs on its own copy of the node: the candidate is selected, offsets are
//! recomputed and the penalty is measured. Only the best trial of a component is committed.

use serde::Serialize;

use crate::geometry::{PortSide, Rect};
use crate::labeling::penalties;
use crate::model::{ComponentId, SelfLoopNode};
use crate::offsets::{calculate_opposing_segment_label_offsets, calculate_port_label_offsets};
use crate::report::{LoopReporter, TraceEvent};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PenaltyBreakdown {
    pub base: f64,
    pub node_crossings: usize,
    pub label_crossings: usize,
    pub edge_crossings: usize,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LabelEvaluation {
    pub rounds: usize,
    pub penalty: f64,
}

/// Reruns both offset stages for the current label choices.
pub fn recompute_offsets(node: &mut SelfLoopNode) {
    calculate_port_label_offsets(node);
    calculate_opposing_segment_label_offsets(node);
}

/// Penalty of the node's current label choices. Offsets must be up to date.
pub fn penalty(node: &SelfLoopNode) -> PenaltyBreakdown {
    let placed: Vec<(ComponentId, PortSide, Rect)> = node
        .labels
        .iter()
        .filter_map(|label| {
            let side = label.side()?;
            let rect = label.rect()?;
            Some((label.component, side, rect))
        })
        .collect();

    let base: f64 = node
        .labels
        .iter()
        .filter_map(|label| label.chosen())
        .map(|candidate| candidate.base_penalty)
        .sum();

    let node_rect = node.node_rect();
    let node_crossings = placed
        .iter()
        .filter(|(_, _, rect)| rect.intersects(&node_rect))
        .count();

    let mut label_crossings = 0;
    for (i, (_, _, a)) in placed.iter().enumerate() {
        for (_, _, b) in &placed[i + 1..] {
            if a.intersects(b) {
                label_crossings += 1;
            }
        }
    }

    let edge_crossings = placed
        .iter()
        .map(|&(component, side, rect)| {
            edge_crossings(node, component, side, &rect)
        })
        .sum();

    let total = base
        + penalties::NODE_CROSSING * node_crossings as f64
        + penalties::LABEL_CROSSING * label_crossings as f64
        + penalties::EDGE_CROSSING * edge_crossings as f64;

    PenaltyBreakdown {
        base,
        node_crossings,
        label_crossings,
        edge_crossings,
        total,
    }
}

/// Ports of other components on `side` whose loops run outside this label's loop and leave the
/// node within the label's extent.
fn edge_crossings(
    node: &SelfLoopNode,
    component: ComponentId,
    side: PortSide,
    rect: &Rect,
) -> usize {
    let Some(level) = edge_level(node, component, side) else {
        return 0;
    };
    let (low, high) = if side.is_horizontal() {
        (rect.x, rect.max_x())
    } else {
        (rect.y, rect.max_y())
    };
    node.side(side)
        .ports
        .iter()
        .map(|&p| node.port(p))
        .filter(|port| {
            port.component != component && port.maximum_level > level
        })
        .filter(|port| {
            let along = if side.is_horizontal() {
                port.anchor.x
            } else {
                port.anchor.y
            };
            low < along && along < high
        })
        .count()
}

/// Level the loop of `component` runs at on `side`: its own port there, or else the highest
/// opposing segment of its edges.
pub fn edge_level(node: &SelfLoopNode, component: ComponentId, side: PortSide) -> Option<u32> {
    if let Some(&port) = node.component_ports_on(component, side).first() {
        return Some(node.port(port).maximum_level);
    }
    let segments = &node.side(side).opposing_segments;
    node.component(component)
        .edges
        .iter()
        .filter_map(|edge| segments.get(edge))
        .map(|&s| node.segment(s).level)
        .max()
}

/// Copy of `node` with `candidate` chosen for the label of `component`, and its penalty.
pub fn trial(
    node: &SelfLoopNode,
    component: ComponentId,
    candidate: usize,
) -> (SelfLoopNode, PenaltyBreakdown) {
    let mut state = node.clone();
    if let Some(label) = state.component(component).label {
        state.label_mut(label).choose(candidate);
    }
    recompute_offsets(&mut state);
    let breakdown = penalty(&state);
    (state, breakdown)
}

/// Chooses a candidate for every label, lowering the penalty until a full round brings no
/// improvement.
pub fn evaluate_positions(
    node: &mut SelfLoopNode,
    reporter: &mut dyn LoopReporter,
) -> LabelEvaluation {
    let components: Vec<ComponentId> = node
        .labeled_components()
        .into_iter()
        .filter(|&c| {
            node.component(c)
                .label
                .is_some_and(|l| !node.label(l).candidates.is_empty())
        })
        .collect();

    for &component in &components {
        if let Some(label) = node.component(component).label {
            node.label_mut(label).choose(0);
        }
    }
    recompute_offsets(node);
    let mut best = penalty(node);
    if components.is_empty() {
        return LabelEvaluation {
            rounds: 0,
            penalty: best.total,
        };
    }

    let max_rounds = node.options.evaluator.max_rounds;
    let mut rounds = 0;
    loop {
        rounds += 1;
        let round_start = best.total;

        for &component in &components {
            let count = node
                .component(component)
                .label
                .map_or(0, |l| node.label(l).candidates.len());
            let mut winner = None;
            for candidate in 0..count {
                let (state, breakdown) = trial(node, component, candidate);
                reporter.report(&TraceEvent::Trial {
                    round: rounds,
                    component,
                    candidate,
                    penalty: breakdown,
                });
                if breakdown.total < best.total {
                    best = breakdown;
                    winner = Some(state);
                }
            }
            if let Some(state) = winner {
                *node = state;
            }
        }

        let improved = best.total < round_start;
        reporter.report(&TraceEvent::Round {
            round: rounds,
            penalty: best.total,
            improved,
        });
        tracing::trace!(round = rounds, penalty = best.total, improved, "label evaluation round");
        if !improved || max_rounds.is_some_and(|max| rounds >= max) {
            break;
        }
    }

    for &component in &components {
        let Some(label) = node.component(component).label.map(|l| node.label(l)) else {
            continue;
        };
        if let (Some(candidate), Some(chosen)) = (label.chosen_index(), label.chosen()) {
            reporter.report(&TraceEvent::Chosen {
                component,
                candidate,
                side: chosen.side,
                alignment: chosen.alignment,
            });
        }
    }

    LabelEvaluation {
        rounds,
        penalty: best.total,
    }
}
