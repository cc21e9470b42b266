//! Nesting structure of the self-loops on each side of a node.
//!
//! Component dependencies say which components have to be routed inside which others on a
//! side. Edge dependencies do the same for the edges of a single component.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::geometry::PortSide;
use crate::model::{ComponentId, EdgeId, PerSide, PortId, RoutingDirection, SelfLoopNode};

/// Computes per-side component dependencies and the outermost components of every side.
pub fn calculate_component_dependencies(node: &mut SelfLoopNode) {
    for component in &mut node.components {
        component.dependencies = PerSide::default();
    }
    for side in PortSide::ALL {
        let ports = participating_ports(node, side);
        let mut visited = FxHashSet::default();
        let top = side_dependencies(node, side, &ports, 0, ports.len(), &mut visited);
        tracing::debug!(%side, ports = ports.len(), top = top.len(), "component dependencies");
        node.side_mut(side).component_dependencies = top;
    }
}

/// Ports of `side` that take part in routing: those with self-loop edges, plus ports of
/// components spanning several ports.
pub fn participating_ports(node: &SelfLoopNode, side: PortSide) -> Vec<PortId> {
    node.side(side)
        .ports
        .iter()
        .copied()
        .filter(|&p| {
            let port = node.port(p);
            !port.edges.is_empty() || node.component(port.component).ports.len() > 1
        })
        .collect()
}

fn side_dependencies(
    node: &mut SelfLoopNode,
    side: PortSide,
    ports: &[PortId],
    start: usize,
    end: usize,
    visited: &mut FxHashSet<PortId>,
) -> Vec<ComponentId> {
    let mut accumulated: IndexSet<ComponentId> = IndexSet::new();

    for i in start..end {
        let port = ports[i];
        if visited.contains(&port) {
            continue;
        }
        let component = node.port(port).component;
        let direction = node.port(port).direction;
        let last = last_position_on_side(node, ports, component);

        match direction {
            None => {
                tracing::debug!(%port, %side, "port without routing direction skipped");
                visited.insert(port);
                continue;
            }
            Some(RoutingDirection::OpenLeft) => {
                let nested: Vec<ComponentId> = accumulated.drain(..).collect();
                set_dependencies(node, component, side, nested);
                accumulated.insert(component);
            }
            Some(RoutingDirection::OpenRight) => {
                mark_visited(node, component, side, visited);
                accumulated.insert(component);
                let wrapped_end = match last {
                    Some(j) if j > i => j.min(end),
                    _ => end,
                };
                let nested = side_dependencies(node, side, ports, i + 1, wrapped_end, visited);
                set_dependencies(node, component, side, nested);
            }
            Some(RoutingDirection::Both) => {
                if last != Some(i) {
                    visited.insert(port);
                    continue;
                }
                let nested: Vec<ComponentId> = accumulated.drain(..).collect();
                set_dependencies(node, component, side, nested);
                accumulated.insert(component);
            }
        }
        mark_visited(node, component, side, visited);
    }

    accumulated.into_iter().collect()
}

fn last_position_on_side(
    node: &SelfLoopNode,
    ports: &[PortId],
    component: ComponentId,
) -> Option<usize> {
    ports
        .iter()
        .rposition(|&p| node.port(p).component == component)
}

fn mark_visited(
    node: &SelfLoopNode,
    component: ComponentId,
    side: PortSide,
    visited: &mut FxHashSet<PortId>,
) {
    visited.extend(node.component_ports_on(component, side));
}

fn set_dependencies(
    node: &mut SelfLoopNode,
    component: ComponentId,
    side: PortSide,
    nested: Vec<ComponentId>,
) {
    let deps = &mut node.component_mut(component).dependencies[side];
    for c in nested {
        if c != component && !deps.contains(&c) {
            deps.push(c);
        }
    }
}

/// Orders the edges of every multi-port component by nesting, per side.
pub fn calculate_edge_dependencies(node: &mut SelfLoopNode) -> Result<()> {
    for edge in &mut node.edges {
        edge.dependencies = PerSide::default();
    }
    for component in &mut node.components {
        component.edge_dependencies = PerSide::default();
    }
    for component in node.component_ids() {
        let all_ports = node.component(component).ports.clone();
        let Some(&first) = all_ports.first() else {
            continue;
        };
        let mut side = node.port(first).side;
        for _ in 0..PortSide::ALL.len() {
            let order = if all_ports.len() > 1 {
                let side_ports = node.component_ports_on(component, side);
                let mut search = EdgeOrderSearch {
                    node: &mut *node,
                    all_ports: &all_ports,
                    side,
                    visited: FxHashSet::default(),
                };
                search.edge_order(&side_ports, false)?
            } else {
                Vec::new()
            };
            node.component_mut(component).edge_dependencies[side] = order;
            side = side.right();
        }
    }
    Ok(())
}

struct EdgeOrderSearch<'a> {
    node: &'a mut SelfLoopNode,
    all_ports: &'a [PortId],
    side: PortSide,
    visited: FxHashSet<EdgeId>,
}

impl EdgeOrderSearch<'_> {
    fn edge_order(&mut self, to_visit: &[PortId], ignore_left: bool) -> Result<Vec<EdgeId>> {
        let mut dependency_edges: Vec<EdgeId> = Vec::new();
        let mut i = 0;

        while i < to_visit.len() {
            let port = to_visit[i];
            let port_edges = self.unvisited_edges(port);

            match port_edges.as_slice() {
                [] => {}
                &[edge] => {
                    self.visited.insert(edge);
                    let target = self.node.opposite_port(port, edge)?;
                    let target_index = self.position(target);
                    let port_index = self.position(port);
                    let target_side = self.node.port(target).side;

                    if target_side != self.side && target_index < port_index {
                        if !ignore_left {
                            self.add_dependencies(edge, std::mem::take(&mut dependency_edges));
                            dependency_edges.push(edge);
                            continue;
                        }
                    } else if target_side != self.side {
                        let end = to_visit.len().saturating_sub(1);
                        let inner = self.edge_order(sub(to_visit, i, end), true)?;
                        self.add_dependencies(edge, inner);
                        dependency_edges.push(edge);
                    } else if target_index == port_index + 1 {
                        dependency_edges.push(edge);
                    } else {
                        let end = to_visit
                            .iter()
                            .position(|&p| p == target)
                            .unwrap_or(to_visit.len());
                        let inner = self.edge_order(sub(to_visit, i, end), true)?;
                        self.add_dependencies(edge, inner);
                        dependency_edges.push(edge);
                    }
                }
                _ => {
                    let mut targets = Vec::with_capacity(port_edges.len());
                    for &edge in &port_edges {
                        let target = self.node.opposite_port(port, edge)?;
                        targets.push((edge, target, self.position(target)));
                    }
                    let port_index = self.position(port);
                    let leftward: Vec<_> = targets
                        .iter()
                        .filter(|(_, _, index)| *index < port_index)
                        .copied()
                        .collect();

                    if leftward.is_empty() {
                        let Some(&(outermost, other, _)) =
                            targets.iter().max_by_key(|(_, _, index)| *index)
                        else {
                            i += 1;
                            continue;
                        };
                        self.visited.insert(outermost);
                        dependency_edges.push(outermost);

                        let next = if self.node.port(other).side == self.side {
                            let other_index = to_visit
                                .iter()
                                .position(|&p| p == other)
                                .unwrap_or(to_visit.len());
                            if self.leftward_edges(other)?.is_empty() {
                                sub(to_visit, 0, other_index)
                            } else {
                                sub(to_visit, 0, other_index + 1)
                            }
                        } else {
                            to_visit
                        };
                        let inner = self.edge_order(next, false)?;
                        self.add_dependencies(outermost, inner);
                    } else if !ignore_left {
                        let Some(&(innermost, _, _)) =
                            leftward.iter().max_by_key(|(_, _, index)| *index)
                        else {
                            i += 1;
                            continue;
                        };
                        self.visited.insert(innermost);
                        self.add_dependencies(innermost, std::mem::take(&mut dependency_edges));
                        dependency_edges.push(innermost);
                        continue;
                    }
                }
            }
            i += 1;
        }

        Ok(dependency_edges)
    }

    fn unvisited_edges(&self, port: PortId) -> Vec<EdgeId> {
        self.node
            .port(port)
            .edges
            .iter()
            .copied()
            .filter(|e| !self.visited.contains(e))
            .collect()
    }

    /// Unvisited edges of `port` leading to a port earlier in the component's port order.
    fn leftward_edges(&self, port: PortId) -> Result<Vec<EdgeId>> {
        let port_index = self.position(port);
        let mut out = Vec::new();
        for edge in self.unvisited_edges(port) {
            let other = self.node.opposite_port(port, edge)?;
            if self.position(other) < port_index {
                out.push(edge);
            }
        }
        Ok(out)
    }

    fn position(&self, port: PortId) -> usize {
        self.all_ports
            .iter()
            .position(|&p| p == port)
            .unwrap_or(self.all_ports.len())
    }

    fn add_dependencies(&mut self, edge: EdgeId, nested: Vec<EdgeId>) {
        self.node.edge_mut(edge).dependencies[self.side].extend(nested);
    }
}

fn sub(ports: &[PortId], from: usize, to: usize) -> &[PortId] {
    let to = to.min(ports.len());
    let from = from.min(to);
    &ports[from..to]
}
