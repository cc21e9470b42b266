//! Label placement: candidate generation and evaluation.

pub mod candidates;
pub mod evaluation;
pub mod penalties;

pub use candidates::{assign_label_candidates, generate_positions};
pub use evaluation::{
    LabelEvaluation, PenaltyBreakdown, edge_level, evaluate_positions, penalty, recompute_offsets,
    trial,
};
