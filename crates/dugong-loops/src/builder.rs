//! Construction of the per-node self-loop structure.
//!
//! Ports are declared in clockwise order around the node and their declaration order becomes
//! their original index. [`SelfLoopNodeBuilder::build`] groups them into components, classifies
//! loop shapes, merges labels and creates the opposing segments every later stage relies on.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::geometry::{Point, PortSide, Size, sides_between};
use crate::model::{
    ComponentId, EdgeId, LabelId, NodeSide, OpposingSegment, PerSide, PortId, RoutingDirection,
    SegmentId, SelfLoopComponent, SelfLoopEdge, SelfLoopLabel, SelfLoopNode, SelfLoopPort,
    SelfLoopType,
};
use crate::options::SelfLoopOptions;

#[derive(Debug, Clone)]
struct PendingPort {
    side: PortSide,
    anchor: Point,
    direction: Option<RoutingDirection>,
}

#[derive(Debug, Clone)]
struct PendingEdge {
    source: PortId,
    target: PortId,
    thickness: f64,
}

#[derive(Debug, Clone)]
pub struct SelfLoopNodeBuilder {
    size: Size,
    options: SelfLoopOptions,
    ports: Vec<PendingPort>,
    edges: Vec<PendingEdge>,
    labels: Vec<(EdgeId, Size)>,
    loop_types: FxHashMap<ComponentId, SelfLoopType>,
}

impl SelfLoopNodeBuilder {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            options: SelfLoopOptions::default(),
            ports: Vec::new(),
            edges: Vec::new(),
            labels: Vec::new(),
            loop_types: FxHashMap::default(),
        }
    }

    pub fn options(mut self, options: SelfLoopOptions) -> Self {
        self.options = options;
        self
    }

    /// Adds a port. Ports must be added clockwise: NORTH left to right, EAST top to bottom,
    /// SOUTH right to left, WEST bottom to top.
    pub fn add_port(
        &mut self,
        side: PortSide,
        anchor: Point,
        direction: RoutingDirection,
    ) -> PortId {
        self.push_port(side, anchor, Some(direction))
    }

    /// Adds a port whose routing direction is unknown. Dependency calculation skips it.
    pub fn add_port_without_direction(&mut self, side: PortSide, anchor: Point) -> PortId {
        self.push_port(side, anchor, None)
    }

    fn push_port(
        &mut self,
        side: PortSide,
        anchor: Point,
        direction: Option<RoutingDirection>,
    ) -> PortId {
        self.ports.push(PendingPort {
            side,
            anchor,
            direction,
        });
        PortId(self.ports.len() - 1)
    }

    pub fn add_edge(&mut self, source: PortId, target: PortId) -> EdgeId {
        self.add_edge_with_thickness(source, target, 1.0)
    }

    pub fn add_edge_with_thickness(
        &mut self,
        source: PortId,
        target: PortId,
        thickness: f64,
    ) -> EdgeId {
        self.edges.push(PendingEdge {
            source,
            target,
            thickness,
        });
        EdgeId(self.edges.len() - 1)
    }

    /// Attaches a label to `edge`. Labels of edges in the same component are merged.
    pub fn add_label(&mut self, edge: EdgeId, size: Size) {
        self.labels.push((edge, size));
    }

    /// Overrides the classified loop shape of `component`. Components are numbered in the order
    /// of their lowest port id.
    pub fn with_loop_type(mut self, component: ComponentId, loop_type: SelfLoopType) -> Self {
        self.loop_types.insert(component, loop_type);
        self
    }

    pub fn build(self) -> Result<SelfLoopNode> {
        for edge in &self.edges {
            for port in [edge.source, edge.target] {
                if port.0 >= self.ports.len() {
                    return Err(Error::UnknownPort { port });
                }
            }
        }
        for &(edge, _) in &self.labels {
            if edge.0 >= self.edges.len() {
                return Err(Error::UnknownEdge { edge });
            }
        }

        let component_of = self.group_components();
        let component_count = component_of.iter().map(|c| c.0 + 1).max().unwrap_or(0);

        let mut ports: Vec<SelfLoopPort> = self
            .ports
            .iter()
            .enumerate()
            .map(|(i, pending)| SelfLoopPort {
                side: pending.side,
                component: component_of[i],
                original_index: i,
                anchor: pending.anchor,
                direction: pending.direction,
                maximum_level: 0,
                other_edge_offset: 0.0,
                edges: Vec::new(),
            })
            .collect();

        let mut components: Vec<SelfLoopComponent> = (0..component_count)
            .map(|_| SelfLoopComponent {
                ports: Vec::new(),
                edges: Vec::new(),
                dependencies: PerSide::default(),
                edge_dependencies: PerSide::default(),
                label: None,
                loop_type: SelfLoopType::Side,
            })
            .collect();

        let mut edges = Vec::with_capacity(self.edges.len());
        for (i, pending) in self.edges.iter().enumerate() {
            let id = EdgeId(i);
            let component = component_of[pending.source.0];
            ports[pending.source.0].edges.push(id);
            if pending.target != pending.source {
                ports[pending.target.0].edges.push(id);
            }
            components[component.0].edges.push(id);
            edges.push(SelfLoopEdge {
                source: pending.source,
                target: pending.target,
                component,
                thickness: pending.thickness,
                levels: PerSide::default(),
                dependencies: PerSide::default(),
                orders: PerSide::default(),
            });
        }

        for port in &ports {
            let c = &mut components[port.component.0];
            c.ports.push(PortId(port.original_index));
        }
        for c in &mut components {
            if let Some(start) = c
                .ports
                .iter()
                .position(|p| {
                    ports[p.0].direction == Some(RoutingDirection::OpenRight)
                })
            {
                c.ports.rotate_left(start);
            }
        }

        let mut sides = PerSide::from_fn(NodeSide::new);
        for port in &ports {
            sides[port.side].ports.push(PortId(port.original_index));
        }

        for (i, c) in components.iter_mut().enumerate() {
            let classified = match (c.ports.first(), c.ports.last()) {
                (Some(first), Some(last)) => {
                    SelfLoopType::classify(&ports[first.0], &ports[last.0])
                }
                _ => SelfLoopType::Side,
            };
            c.loop_type = self
                .loop_types
                .get(&ComponentId(i))
                .copied()
                .unwrap_or(classified);
        }

        let mut labels: Vec<SelfLoopLabel> = Vec::new();
        for &(edge, size) in &self.labels {
            let component = edges[edge.0].component;
            match components[component.0].label {
                Some(existing) => {
                    let merged = &mut labels[existing.0].size;
                    merged.width = merged.width.max(size.width);
                    merged.height += size.height;
                }
                None => {
                    components[component.0].label = Some(LabelId(labels.len()));
                    labels.push(SelfLoopLabel::new(component, size));
                }
            }
        }

        let mut node = SelfLoopNode {
            size: self.size,
            options: self.options,
            sides,
            ports,
            components,
            edges,
            segments: Vec::new(),
            labels,
        };
        if node.supports_hyperedges() {
            create_component_segments(&mut node);
        } else {
            create_edge_segments(&mut node);
        }
        tracing::debug!(
            ports = node.ports.len(),
            components = node.components.len(),
            edges = node.edges.len(),
            segments = node.segments.len(),
            "built self-loop node"
        );
        Ok(node)
    }

    /// Connected components of the port/edge graph, numbered by lowest port id.
    fn group_components(&self) -> Vec<ComponentId> {
        let mut parent: Vec<usize> = (0..self.ports.len()).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for edge in &self.edges {
            let a = find(&mut parent, edge.source.0);
            let b = find(&mut parent, edge.target.0);
            if a != b {
                parent[a.max(b)] = a.min(b);
            }
        }

        let mut numbering: FxHashMap<usize, ComponentId> = FxHashMap::default();
        (0..self.ports.len())
            .map(|p| {
                let root = find(&mut parent, p);
                let next = ComponentId(numbering.len());
                *numbering.entry(root).or_insert(next)
            })
            .collect()
    }
}

/// One segment per component on every side it spans without ending there.
fn create_component_segments(node: &mut SelfLoopNode) {
    for component in node.component_ids() {
        let c = node.component(component);
        let (Some(&first), Some(&last)) = (c.ports.first(), c.ports.last()) else {
            continue;
        };
        let passed = match c.loop_type {
            SelfLoopType::Side => Vec::new(),
            SelfLoopType::FourCorner => {
                let side = node.port(first).side;
                sides_between(side, side, node.runs_clockwise(component))
            }
            _ => sides_between(
                node.port(first).side,
                node.port(last).side,
                node.runs_clockwise(component),
            ),
        };
        let edges = c.edges.clone();
        for side in passed {
            let level_giving_port = node.component_ports_on(component, side).first().copied();
            let segment = SegmentId(node.segments.len());
            node.segments.push(OpposingSegment {
                component,
                side,
                level: 0,
                label_offset: 0.0,
                level_giving_port,
            });
            for &edge in &edges {
                node.side_mut(side).opposing_segments.insert(edge, segment);
            }
        }
    }
}

/// One segment per edge on every side the edge passes.
fn create_edge_segments(node: &mut SelfLoopNode) {
    for edge in node.edge_ids() {
        let component = node.edge(edge).component;
        for side in node.edge_passed_sides(edge) {
            let segment = SegmentId(node.segments.len());
            node.segments.push(OpposingSegment {
                component,
                side,
                level: 0,
                label_offset: 0.0,
                level_giving_port: None,
            });
            node.side_mut(side).opposing_segments.insert(edge, segment);
        }
    }
}
