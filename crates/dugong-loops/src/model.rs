//! Per-node self-loop data model.
//!
//! Every port, component, edge, opposing segment and label lives in a flat vector owned by
//! [`SelfLoopNode`]; relationships are stored as typed indices into those vectors. The node is
//! `Clone`, which lets the label evaluator run each trial on its own copy of the state.

use std::fmt;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::geometry::{Point, PortSide, Rect, Size, sides_between};
use crate::options::SelfLoopOptions;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(PortId, "p");
arena_id!(ComponentId, "c");
arena_id!(EdgeId, "e");
arena_id!(SegmentId, "s");
arena_id!(LabelId, "l");

/// One value per node side, indexed by [`PortSide`].
#[derive(Debug, Clone, PartialEq)]
pub struct PerSide<T>([T; 4]);

impl<T> PerSide<T> {
    pub fn from_fn(mut f: impl FnMut(PortSide) -> T) -> Self {
        Self(std::array::from_fn(|i| f(PortSide::ALL[i])))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PortSide, &T)> {
        PortSide::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }
}

impl<T: Default> Default for PerSide<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<PortSide> for PerSide<T> {
    type Output = T;

    fn index(&self, side: PortSide) -> &T {
        &self.0[side.index()]
    }
}

impl<T> IndexMut<PortSide> for PerSide<T> {
    fn index_mut(&mut self, side: PortSide) -> &mut T {
        &mut self.0[side.index()]
    }
}

impl<T: Serialize> Serialize for PerSide<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for (side, value) in self.iter() {
            map.serialize_entry(&side, value)?;
        }
        map.end()
    }
}

/// Which way a loop leaves a port, relative to the clockwise port order of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RoutingDirection {
    /// Opens towards ports with a lower original index.
    OpenLeft,
    /// Opens towards ports with a higher original index.
    OpenRight,
    /// The loop starts and ends at this port.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SelfLoopType {
    Side,
    Corner,
    Opposing,
    ThreeCorner,
    FourCorner,
}

impl SelfLoopType {
    /// Loop shape spanned between a component's first and last port.
    pub fn classify(first: &SelfLoopPort, last: &SelfLoopPort) -> Self {
        let direction = first.direction;
        if first.side == last.side {
            let wraps = match direction {
                Some(RoutingDirection::OpenLeft) => first.original_index < last.original_index,
                Some(RoutingDirection::OpenRight) => last.original_index < first.original_index,
                _ => false,
            };
            if wraps {
                SelfLoopType::FourCorner
            } else {
                SelfLoopType::Side
            }
        } else if first.side.is_adjacent(last.side) {
            let long_way = match direction {
                Some(RoutingDirection::OpenLeft) => first.side.right() == last.side,
                Some(RoutingDirection::OpenRight) => first.side.left() == last.side,
                _ => false,
            };
            if long_way {
                SelfLoopType::ThreeCorner
            } else {
                SelfLoopType::Corner
            }
        } else {
            SelfLoopType::Opposing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelAlignment {
    Centered,
    LeadingEdge,
    TrailingEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCandidate {
    /// Top-left corner of the label box.
    pub position: Point,
    pub side: PortSide,
    pub alignment: LabelAlignment,
    pub text_alignment: TextAlignment,
    pub base_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfLoopLabel {
    pub component: ComponentId,
    pub size: Size,
    pub candidates: Vec<LabelCandidate>,
    chosen: Option<usize>,
    /// Outward shift applied on top of the chosen candidate by the offset stages.
    pub shift: f64,
}

impl SelfLoopLabel {
    pub fn new(component: ComponentId, size: Size) -> Self {
        Self {
            component,
            size,
            candidates: Vec::new(),
            chosen: None,
            shift: 0.0,
        }
    }

    /// Replaces the candidate list and clears the selection.
    pub fn set_candidates(&mut self, candidates: Vec<LabelCandidate>) {
        self.candidates = candidates;
        self.chosen = None;
    }

    pub fn chosen_index(&self) -> Option<usize> {
        self.chosen
    }

    pub fn chosen(&self) -> Option<&LabelCandidate> {
        self.chosen.and_then(|i| self.candidates.get(i))
    }

    /// Selects candidate `index`. Out-of-range indices leave the selection untouched.
    pub fn choose(&mut self, index: usize) -> bool {
        if index < self.candidates.len() {
            self.chosen = Some(index);
            true
        } else {
            false
        }
    }

    pub fn side(&self) -> Option<PortSide> {
        self.chosen().map(|c| c.side)
    }

    /// Final top-left corner: the chosen candidate pushed outward by `shift`.
    pub fn position(&self) -> Option<Point> {
        self.chosen()
            .map(|c| c.position.translate(c.side.normal(), self.shift))
    }

    pub fn rect(&self) -> Option<Rect> {
        self.position().map(|p| Rect::new(p, self.size))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpposingSegment {
    pub component: ComponentId,
    pub side: PortSide,
    pub level: u32,
    pub label_offset: f64,
    pub level_giving_port: Option<PortId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfLoopEdge {
    pub source: PortId,
    pub target: PortId,
    pub component: ComponentId,
    pub thickness: f64,
    pub levels: PerSide<Option<u32>>,
    /// Edges of the same component nested inside this one, per side.
    pub dependencies: PerSide<Vec<EdgeId>>,
    pub orders: PerSide<Option<u32>>,
}

impl SelfLoopEdge {
    pub fn is_incident(&self, port: PortId) -> bool {
        self.source == port || self.target == port
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfLoopPort {
    pub side: PortSide,
    pub component: ComponentId,
    pub original_index: usize,
    /// Attachment point on the node boundary.
    pub anchor: Point,
    pub direction: Option<RoutingDirection>,
    pub maximum_level: u32,
    pub other_edge_offset: f64,
    pub edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfLoopComponent {
    /// Member ports, starting at the port the loop opens from.
    pub ports: Vec<PortId>,
    pub edges: Vec<EdgeId>,
    /// Components that route strictly inside this one, per side.
    pub dependencies: PerSide<Vec<ComponentId>>,
    /// This component's own edges in nesting order, per side.
    pub edge_dependencies: PerSide<Vec<EdgeId>>,
    pub label: Option<LabelId>,
    pub loop_type: SelfLoopType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSide {
    pub side: PortSide,
    /// Ports ordered by original index.
    pub ports: Vec<PortId>,
    /// Outermost components on this side.
    pub component_dependencies: Vec<ComponentId>,
    pub opposing_segments: IndexMap<EdgeId, SegmentId>,
    pub maximum_port_level: u32,
    pub maximum_segment_level: u32,
    pub maximum_label_offset: f64,
}

impl NodeSide {
    pub fn new(side: PortSide) -> Self {
        Self {
            side,
            ports: Vec::new(),
            component_dependencies: Vec::new(),
            opposing_segments: IndexMap::new(),
            maximum_port_level: 0,
            maximum_segment_level: 0,
            maximum_label_offset: 0.0,
        }
    }

    /// Distinct segments in first-seen order.
    pub fn distinct_segments(&self) -> Vec<SegmentId> {
        let mut out: Vec<SegmentId> = Vec::new();
        for &segment in self.opposing_segments.values() {
            if !out.contains(&segment) {
                out.push(segment);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfLoopNode {
    pub size: Size,
    pub options: SelfLoopOptions,
    pub sides: PerSide<NodeSide>,
    pub ports: Vec<SelfLoopPort>,
    pub components: Vec<SelfLoopComponent>,
    pub edges: Vec<SelfLoopEdge>,
    pub segments: Vec<OpposingSegment>,
    pub labels: Vec<SelfLoopLabel>,
}

impl SelfLoopNode {
    pub fn port(&self, id: PortId) -> &SelfLoopPort {
        &self.ports[id.0]
    }

    pub fn port_mut(&mut self, id: PortId) -> &mut SelfLoopPort {
        &mut self.ports[id.0]
    }

    pub fn component(&self, id: ComponentId) -> &SelfLoopComponent {
        &self.components[id.0]
    }

    pub fn component_mut(&mut self, id: ComponentId) -> &mut SelfLoopComponent {
        &mut self.components[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &SelfLoopEdge {
        &self.edges[id.0]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut SelfLoopEdge {
        &mut self.edges[id.0]
    }

    pub fn segment(&self, id: SegmentId) -> &OpposingSegment {
        &self.segments[id.0]
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> &mut OpposingSegment {
        &mut self.segments[id.0]
    }

    pub fn label(&self, id: LabelId) -> &SelfLoopLabel {
        &self.labels[id.0]
    }

    pub fn label_mut(&mut self, id: LabelId) -> &mut SelfLoopLabel {
        &mut self.labels[id.0]
    }

    pub fn side(&self, side: PortSide) -> &NodeSide {
        &self.sides[side]
    }

    pub fn side_mut(&mut self, side: PortSide) -> &mut NodeSide {
        &mut self.sides[side]
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + use<> {
        (0..self.components.len()).map(ComponentId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + use<> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn supports_hyperedges(&self) -> bool {
        self.options.supports_hyperedges()
    }

    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Components carrying a label, in component order.
    pub fn labeled_components(&self) -> Vec<ComponentId> {
        self.component_ids()
            .filter(|&c| self.component(c).label.is_some())
            .collect()
    }

    /// Ports of `component` on `side`, in the component's port order.
    pub fn component_ports_on(&self, component: ComponentId, side: PortSide) -> Vec<PortId> {
        self.component(component)
            .ports
            .iter()
            .copied()
            .filter(|&p| self.port(p).side == side)
            .collect()
    }

    /// Highest port level of `component` on `side`, if it has ports there.
    pub fn component_level_on(&self, component: ComponentId, side: PortSide) -> Option<u32> {
        self.component_ports_on(component, side)
            .into_iter()
            .map(|p| self.port(p).maximum_level)
            .max()
    }

    /// The other end of `edge` seen from `port`.
    pub fn opposite_port(&self, port: PortId, edge: EdgeId) -> Result<PortId> {
        let e = self.edge(edge);
        if e.source == port {
            Ok(e.target)
        } else if e.target == port {
            Ok(e.source)
        } else {
            Err(Error::EdgeNotIncident { edge, port })
        }
    }

    /// Whether the loop of `component` travels clockwise around the node.
    pub fn runs_clockwise(&self, component: ComponentId) -> bool {
        let ports = &self.component(component).ports;
        let (Some(&first), Some(&last)) = (ports.first(), ports.last()) else {
            return true;
        };
        match self.port(first).direction {
            Some(RoutingDirection::OpenRight) => true,
            Some(RoutingDirection::OpenLeft) => false,
            _ => self.port(last).direction == Some(RoutingDirection::OpenLeft),
        }
    }

    /// Whether `edge` travels clockwise from its source port.
    pub fn edge_runs_clockwise(&self, edge: EdgeId) -> bool {
        let e = self.edge(edge);
        match self.port(e.source).direction {
            Some(RoutingDirection::OpenRight) => true,
            Some(RoutingDirection::OpenLeft) => false,
            _ => self.port(e.target).direction == Some(RoutingDirection::OpenLeft),
        }
    }

    /// Sides `edge` passes without ending there, in travel order.
    pub fn edge_passed_sides(&self, edge: EdgeId) -> Vec<PortSide> {
        let e = self.edge(edge);
        if e.source == e.target {
            return Vec::new();
        }
        let source = self.port(e.source);
        let target = self.port(e.target);
        let clockwise = self.edge_runs_clockwise(edge);
        if source.side != target.side {
            return sides_between(source.side, target.side, clockwise);
        }
        let wraps = if clockwise {
            target.original_index < source.original_index
        } else {
            target.original_index > source.original_index
        };
        if wraps {
            sides_between(source.side, source.side, clockwise)
        } else {
            Vec::new()
        }
    }

    pub fn node_rect(&self) -> Rect {
        Rect::new(Point::default(), self.size)
    }
}
