//! Structured trace events for debugging label placement.
//!
//! Reporters only observe; layout results are identical with or without one.

use serde::Serialize;

use crate::geometry::PortSide;
use crate::labeling::PenaltyBreakdown;
use crate::model::{ComponentId, LabelAlignment};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Candidates {
        component: ComponentId,
        count: usize,
    },
    Trial {
        round: usize,
        component: ComponentId,
        candidate: usize,
        penalty: PenaltyBreakdown,
    },
    Round {
        round: usize,
        penalty: f64,
        improved: bool,
    },
    Chosen {
        component: ComponentId,
        candidate: usize,
        side: PortSide,
        alignment: LabelAlignment,
    },
}

pub trait LoopReporter {
    fn report(&mut self, event: &TraceEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl LoopReporter for NoopReporter {
    fn report(&mut self, _event: &TraceEvent) {}
}

/// Forwards every event as a `tracing` debug event carrying its JSON rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl LoopReporter for TracingReporter {
    fn report(&mut self, event: &TraceEvent) {
        match serde_json::to_string(event) {
            Ok(json) => tracing::debug!(target: "dugong_loops::trace", event = %json),
            Err(err) => {
                tracing::warn!(target: "dugong_loops::trace", %err, "unserializable trace event")
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    pub events: Vec<TraceEvent>,
}

impl LoopReporter for RecordingReporter {
    fn report(&mut self, event: &TraceEvent) {
        self.events.push(event.clone());
    }
}
