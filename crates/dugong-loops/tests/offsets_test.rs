use dugong_loops::dependencies::{calculate_component_dependencies, calculate_edge_dependencies};
use dugong_loops::labeling::assign_label_candidates;
use dugong_loops::levels::{
    assign_edge_levels, calculate_edge_orders, calculate_opposing_segment_levels,
    calculate_port_levels,
};
use dugong_loops::model::{SelfLoopLabel, SelfLoopNode};
use dugong_loops::offsets::{
    calculate_opposing_segment_label_offsets, calculate_port_label_offsets, simple_label_offset,
};
use dugong_loops::{
    ComponentId, LabelId, Point, PortSide, RoutingDirection, SegmentId, SelfLoopNodeBuilder,
    SelfLoopOptions, Size,
};

use RoutingDirection::{OpenLeft, OpenRight};

fn prepare(node: &mut SelfLoopNode) {
    calculate_component_dependencies(node);
    calculate_edge_dependencies(node).unwrap();
    calculate_port_levels(node);
    calculate_edge_orders(node);
    calculate_opposing_segment_levels(node);
    assign_edge_levels(node);
    calculate_port_label_offsets(node);
    calculate_opposing_segment_label_offsets(node);
    assign_label_candidates(node).unwrap();
}

/// c0 encloses c1 on NORTH; only the inner loop is labelled.
fn nested_labelled_node() -> SelfLoopNode {
    let mut b = SelfLoopNodeBuilder::new(Size::new(100.0, 60.0));
    let p0 = b.add_port(PortSide::North, Point::new(10.0, 0.0), OpenRight);
    let p1 = b.add_port(PortSide::North, Point::new(30.0, 0.0), OpenRight);
    let p2 = b.add_port(PortSide::North, Point::new(50.0, 0.0), OpenLeft);
    let p3 = b.add_port(PortSide::North, Point::new(70.0, 0.0), OpenLeft);
    b.add_edge(p0, p3);
    let inner = b.add_edge(p1, p2);
    b.add_label(inner, Size::new(20.0, 16.0));
    let mut node = b.build().unwrap();
    prepare(&mut node);
    node
}

#[test]
fn simple_offset_is_the_outward_extent_beyond_the_band() {
    let options = SelfLoopOptions::default();
    let offset = |label: &SelfLoopLabel, side| simple_label_offset(Some(label), side, &options);
    let label = SelfLoopLabel::new(ComponentId(0), Size::new(20.0, 16.0));

    assert_eq!(offset(&label, PortSide::North), 8.0);
    assert_eq!(offset(&label, PortSide::South), 8.0);
    assert_eq!(offset(&label, PortSide::East), 12.0);
    assert_eq!(simple_label_offset(None, PortSide::North, &options), 0.0);

    let small = SelfLoopLabel::new(ComponentId(0), Size::new(4.0, 4.0));
    assert_eq!(offset(&small, PortSide::West), 0.0);
}

#[test]
fn nested_label_pushes_the_enclosing_loop_outwards() {
    let mut node = nested_labelled_node();
    assert!(node.label_mut(LabelId(0)).choose(0));
    let offsets = calculate_port_label_offsets(&mut node);

    assert_eq!(offsets[PortSide::North], 8.0);
    assert_eq!(node.side(PortSide::North).maximum_label_offset, 8.0);
    assert_eq!(node.port(dugong_loops::PortId(0)).other_edge_offset, 8.0);
    assert_eq!(node.port(dugong_loops::PortId(3)).other_edge_offset, 8.0);
    assert_eq!(node.port(dugong_loops::PortId(1)).other_edge_offset, 0.0);
    assert_eq!(offsets[PortSide::East], 0.0);
}

#[test]
fn unchosen_labels_reserve_nothing() {
    let mut node = nested_labelled_node();
    let offsets = calculate_port_label_offsets(&mut node);
    for side in PortSide::ALL {
        assert_eq!(offsets[side], 0.0);
    }
    assert_eq!(node.port(dugong_loops::PortId(0)).other_edge_offset, 0.0);
}

#[test]
fn port_offsets_are_recomputed_from_scratch() {
    let mut node = nested_labelled_node();
    node.label_mut(LabelId(0)).choose(0);
    calculate_port_label_offsets(&mut node);
    let first = node.clone();
    calculate_port_label_offsets(&mut node);
    assert_eq!(node, first);
}

#[test]
fn opposing_labels_stack_outwards_by_level() {
    let mut b = SelfLoopNodeBuilder::new(Size::new(100.0, 60.0));
    let p0 = b.add_port(PortSide::North, Point::new(60.0, 0.0), OpenRight);
    let p1 = b.add_port(PortSide::North, Point::new(80.0, 0.0), OpenRight);
    let p2 = b.add_port(PortSide::South, Point::new(80.0, 60.0), OpenLeft);
    let p3 = b.add_port(PortSide::South, Point::new(60.0, 60.0), OpenLeft);
    let outer = b.add_edge(p0, p3);
    let inner = b.add_edge(p1, p2);
    b.add_label(outer, Size::new(10.0, 4.0));
    b.add_label(inner, Size::new(10.0, 6.0));
    let mut node = b.build().unwrap();
    prepare(&mut node);

    // Candidates 3..6 follow the EAST segment.
    for label in [LabelId(0), LabelId(1)] {
        assert!(node.label_mut(label).choose(3));
        assert_eq!(node.label(label).side(), Some(PortSide::East));
    }
    calculate_port_label_offsets(&mut node);
    calculate_opposing_segment_label_offsets(&mut node);

    assert_eq!(node.segment(SegmentId(1)).label_offset, 0.0);
    assert_eq!(node.segment(SegmentId(0)).label_offset, 18.0);
    assert_eq!(node.label(LabelId(1)).shift, 0.0);
    assert_eq!(node.label(LabelId(0)).shift, 18.0);
    assert_eq!(node.side(PortSide::North).maximum_label_offset, 0.0);
}
