use serde::{Deserialize, Serialize};

/// Edge routing style of the surrounding layout. Only used to decide whether several self-loops
/// sharing a component may be merged into one hyperedge-like route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRouting {
    #[default]
    Orthogonal,
    Polyline,
    Splines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfLoopOptions {
    /// Distance between two neighbouring routing levels.
    pub edge_edge_spacing: f64,
    /// Distance between an edge segment and a label placed next to it.
    pub edge_label_spacing: f64,
    pub edge_routing: EdgeRouting,
    pub evaluator: EvaluatorOptions,
}

impl Default for SelfLoopOptions {
    fn default() -> Self {
        Self {
            edge_edge_spacing: 10.0,
            edge_label_spacing: 2.0,
            edge_routing: EdgeRouting::Orthogonal,
            evaluator: EvaluatorOptions::default(),
        }
    }
}

impl SelfLoopOptions {
    pub fn supports_hyperedges(&self) -> bool {
        self.edge_routing != EdgeRouting::Splines
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorOptions {
    /// Upper bound on improvement rounds. `None` runs until a round stops improving.
    pub max_rounds: Option<usize>,
}
