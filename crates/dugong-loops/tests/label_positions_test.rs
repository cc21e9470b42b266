use dugong_loops::dependencies::{calculate_component_dependencies, calculate_edge_dependencies};
use dugong_loops::labeling::generate_positions;
use dugong_loops::levels::{
    assign_edge_levels, calculate_edge_orders, calculate_opposing_segment_levels,
    calculate_port_levels,
};
use dugong_loops::model::SelfLoopNode;
use dugong_loops::{
    ComponentId, Error, LabelAlignment, Point, PortSide, RoutingDirection, SelfLoopNodeBuilder,
    SelfLoopType, Size, TextAlignment,
};

use RoutingDirection::{OpenLeft, OpenRight};

fn prepare(node: &mut SelfLoopNode) {
    calculate_component_dependencies(node);
    calculate_edge_dependencies(node).unwrap();
    calculate_port_levels(node);
    calculate_edge_orders(node);
    calculate_opposing_segment_levels(node);
    assign_edge_levels(node);
}

fn labelled(ports: &[(PortSide, Point, RoutingDirection)], label: Size) -> SelfLoopNode {
    let mut b = SelfLoopNodeBuilder::new(Size::new(100.0, 60.0));
    let ids: Vec<_> = ports
        .iter()
        .map(|&(side, anchor, direction)| {
            b.add_port(side, anchor, direction)
        })
        .collect();
    let edge = b.add_edge(ids[0], ids[ids.len() - 1]);
    b.add_label(edge, label);
    let mut node = b.build().unwrap();
    prepare(&mut node);
    node
}

#[test]
fn corner_loop_offers_two_segments() {
    let node = labelled(
        &[
            (PortSide::North, Point::new(80.0, 0.0), OpenRight),
            (PortSide::East, Point::new(100.0, 20.0), OpenLeft),
        ],
        Size::new(10.0, 10.0),
    );
    assert_eq!(
        node.component(ComponentId(0)).loop_type,
        SelfLoopType::Corner
    );

    let candidates = generate_positions(&node, ComponentId(0)).unwrap();
    assert_eq!(candidates.len(), 6);
    for (i, a) in candidates.iter().enumerate() {
        assert!(a.position.is_finite(), "candidate {i}");
        for b in &candidates[i + 1..] {
            assert_ne!(a.position, b.position);
        }
    }

    let north = &candidates[0];
    assert_eq!(north.side, PortSide::North);
    assert_eq!(north.alignment, LabelAlignment::Centered);
    assert_eq!(north.text_alignment, TextAlignment::Center);
    assert_eq!(north.position, Point::new(91.0, -22.0));
    assert_eq!(north.base_penalty, 0.0);

    assert_eq!(candidates[1].position, Point::new(80.0, -22.0));
    assert_eq!(candidates[2].position, Point::new(102.0, -22.0));

    let east = &candidates[3];
    assert_eq!(east.side, PortSide::East);
    assert_eq!(east.text_alignment, TextAlignment::Left);
    assert_eq!(east.position, Point::new(112.0, -1.0));
    assert_eq!(east.base_penalty, 0.5);
    assert_eq!(candidates[4].position, Point::new(112.0, -12.0));
    assert_eq!(candidates[5].position, Point::new(112.0, 10.0));
}

#[test]
fn side_loop_prefers_its_middle_segment() {
    let node = labelled(
        &[
            (PortSide::North, Point::new(30.0, 0.0), OpenRight),
            (PortSide::North, Point::new(70.0, 0.0), OpenLeft),
        ],
        Size::new(20.0, 16.0),
    );
    let candidates = generate_positions(&node, ComponentId(0)).unwrap();
    assert_eq!(candidates.len(), 9);
    assert_eq!(candidates[0].position, Point::new(40.0, -28.0));
    assert!(candidates.iter().all(|c| c.side == PortSide::North));

    // The two short segments next to the ports carry the short-segment penalty and put the
    // label beside the loop.
    assert!(candidates[3..].iter().all(|c| c.base_penalty >= 1.0));
    assert_eq!(candidates[3].text_alignment, TextAlignment::Right);
    assert_eq!(candidates[6].text_alignment, TextAlignment::Left);
    let best = candidates
        .iter()
        .map(|c| c.base_penalty)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(best, candidates[0].base_penalty);
}

#[test]
fn candidate_count_follows_the_loop_shape() {
    let opposing = labelled(
        &[
            (PortSide::North, Point::new(60.0, 0.0), OpenRight),
            (PortSide::South, Point::new(60.0, 60.0), OpenLeft),
        ],
        Size::new(10.0, 10.0),
    );
    assert_eq!(
        opposing.component(ComponentId(0)).loop_type,
        SelfLoopType::Opposing
    );
    let candidates = generate_positions(&opposing, ComponentId(0)).unwrap();
    assert_eq!(candidates.len(), 9);

    let three_corner = labelled(
        &[
            (PortSide::North, Point::new(20.0, 0.0), OpenRight),
            (PortSide::West, Point::new(0.0, 30.0), OpenLeft),
        ],
        Size::new(10.0, 10.0),
    );
    assert_eq!(
        three_corner.component(ComponentId(0)).loop_type,
        SelfLoopType::ThreeCorner
    );
    let candidates = generate_positions(&three_corner, ComponentId(0)).unwrap();
    assert_eq!(candidates.len(), 12);

    let four_corner = labelled(
        &[
            (PortSide::North, Point::new(20.0, 0.0), OpenLeft),
            (PortSide::North, Point::new(40.0, 0.0), OpenRight),
        ],
        Size::new(10.0, 10.0),
    );
    assert_eq!(
        four_corner.component(ComponentId(0)).loop_type,
        SelfLoopType::FourCorner
    );
    let candidates = generate_positions(&four_corner, ComponentId(0)).unwrap();
    assert_eq!(candidates.len(), 15);
    assert!(candidates.iter().all(|c| c.position.is_finite()));
}

#[test]
fn opposing_candidates_run_past_the_node() {
    let node = labelled(
        &[
            (PortSide::North, Point::new(60.0, 0.0), OpenRight),
            (PortSide::South, Point::new(60.0, 60.0), OpenLeft),
        ],
        Size::new(10.0, 10.0),
    );
    let candidates = generate_positions(&node, ComponentId(0)).unwrap();
    let east: Vec<_> = candidates.iter().filter(|c| c.side == PortSide::East).collect();
    assert_eq!(east.len(), 3);
    // The EAST segment runs at level 1 plus the label spacing.
    assert!(east.iter().all(|c| c.position.x == 112.0));
}

#[test]
fn generation_leaves_the_node_untouched() {
    let node = labelled(
        &[
            (PortSide::North, Point::new(30.0, 0.0), OpenRight),
            (PortSide::North, Point::new(70.0, 0.0), OpenLeft),
        ],
        Size::new(20.0, 16.0),
    );
    let before = node.clone();
    let first = generate_positions(&node, ComponentId(0)).unwrap();
    let second = generate_positions(&node, ComponentId(0)).unwrap();
    assert_eq!(first, second);
    assert_eq!(node, before);
}

#[test]
fn unlabelled_components_have_no_candidates() {
    let mut b = SelfLoopNodeBuilder::new(Size::new(100.0, 60.0));
    let p0 = b.add_port(PortSide::North, Point::new(30.0, 0.0), OpenRight);
    let p1 = b.add_port(PortSide::North, Point::new(70.0, 0.0), OpenLeft);
    b.add_edge(p0, p1);
    let node = b.build().unwrap();
    let candidates = generate_positions(&node, ComponentId(0)).unwrap();
    assert!(candidates.is_empty());
}

#[test]
fn component_without_ports_is_rejected() {
    let mut node = labelled(
        &[
            (PortSide::North, Point::new(30.0, 0.0), OpenRight),
            (PortSide::North, Point::new(70.0, 0.0), OpenLeft),
        ],
        Size::new(20.0, 16.0),
    );
    node.component_mut(ComponentId(0)).ports.clear();
    assert!(matches!(
        generate_positions(&node, ComponentId(0)),
        Err(Error::EmptyComponent { component }) if component == ComponentId(0)
    ));
}
