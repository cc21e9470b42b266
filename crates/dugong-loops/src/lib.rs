//! Self-loop routing and label placement for layered graph layouts.
//!
//! A self-loop is an edge whose source and target attach to the same node. For one node at a
//! time this crate computes how loops sharing a side nest inside each other, assigns every loop
//! a routing level per side, reserves room for labels, generates candidate label positions per
//! loop shape and picks one per label with a hill-climbing search.
//!
//! ```text
//! component dependencies -> edge dependencies -> port levels -> edge orders
//!   -> opposing segment levels -> label offsets -> candidates -> evaluation -> routes
//! ```
//!
//! Everything works in node-local coordinates: the node spans `(0, 0, width, height)` and `y`
//! grows downwards.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builder;
pub mod dependencies;
pub mod error;
pub mod geometry;
pub mod labeling;
pub mod levels;
pub mod model;
pub mod offsets;
pub mod options;
pub mod pipeline;
pub mod report;
pub mod routing;

pub use builder::SelfLoopNodeBuilder;
pub use error::{Error, Result};
pub use geometry::{Point, PortSide, Rect, Size};
pub use model::{
    ComponentId, EdgeId, LabelAlignment, LabelCandidate, LabelId, PerSide, PortId,
    RoutingDirection, SegmentId, SelfLoopNode, SelfLoopType, TextAlignment,
};
pub use options::{EdgeRouting, EvaluatorOptions, SelfLoopOptions};
pub use pipeline::{EdgeLayout, LabelLayout, SelfLoopLayout, layout_self_loops};
pub use report::{LoopReporter, NoopReporter, RecordingReporter, TraceEvent, TracingReporter};
