//! Geometry primitives in node-local coordinates.
//!
//! The node occupies the rectangle `(0, 0, width, height)` with `y` growing downwards. Sides are
//! enumerated clockwise starting at the top, and every side has an outward unit normal that
//! self-loops walk along when they leave the node.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    pub fn translate(self, direction: Point, amount: f64) -> Point {
        Point {
            x: self.x + direction.x * amount,
            y: self.y + direction.y * amount,
        }
    }

    /// Unit vector pointing from `self` towards `other`, or the zero vector if both coincide.
    pub fn direction_to(&self, other: Point) -> Point {
        let len = self.distance(other);
        if len == 0.0 || !len.is_finite() {
            return Point::default();
        }
        Point {
            x: (other.x - self.x) / len,
            y: (other.y - self.y) / len,
        }
    }

    /// Returns `self` if both coordinates are finite, `fallback` otherwise.
    pub fn finite_or(self, fallback: Point) -> Point {
        if self.is_finite() { self } else { fallback }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent perpendicular to a side: how far a box sticks out of `side`.
    pub fn outward_extent(&self, side: PortSide) -> f64 {
        if side.is_horizontal() {
            self.height
        } else {
            self.width
        }
    }

    /// Extent parallel to a side.
    pub fn along_extent(&self, side: PortSide) -> f64 {
        if side.is_horizontal() {
            self.width
        } else {
            self.height
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Strict overlap test. Rectangles that merely touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }
}

/// A side of the node. The declaration order is the clockwise order used everywhere else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum PortSide {
    #[default]
    North,
    East,
    South,
    West,
}

impl PortSide {
    pub const ALL: [PortSide; 4] = [
        PortSide::North,
        PortSide::East,
        PortSide::South,
        PortSide::West,
    ];

    pub const fn index(self) -> usize {
        match self {
            PortSide::North => 0,
            PortSide::East => 1,
            PortSide::South => 2,
            PortSide::West => 3,
        }
    }

    /// Next side in clockwise direction.
    pub const fn right(self) -> PortSide {
        match self {
            PortSide::North => PortSide::East,
            PortSide::East => PortSide::South,
            PortSide::South => PortSide::West,
            PortSide::West => PortSide::North,
        }
    }

    /// Next side in counter-clockwise direction.
    pub const fn left(self) -> PortSide {
        match self {
            PortSide::North => PortSide::West,
            PortSide::East => PortSide::North,
            PortSide::South => PortSide::East,
            PortSide::West => PortSide::South,
        }
    }

    pub const fn opposite(self) -> PortSide {
        self.right().right()
    }

    pub fn is_adjacent(self, other: PortSide) -> bool {
        self.left() == other || self.right() == other
    }

    /// `true` for sides whose segments run horizontally.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, PortSide::North | PortSide::South)
    }

    /// Outward unit normal.
    pub const fn normal(self) -> Point {
        match self {
            PortSide::North => Point::new(0.0, -1.0),
            PortSide::East => Point::new(1.0, 0.0),
            PortSide::South => Point::new(0.0, 1.0),
            PortSide::West => Point::new(-1.0, 0.0),
        }
    }
}

impl std::fmt::Display for PortSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PortSide::North => "NORTH",
            PortSide::East => "EAST",
            PortSide::South => "SOUTH",
            PortSide::West => "WEST",
        };
        f.write_str(s)
    }
}

/// Sides strictly between `from` and `to` when walking around the node. Walking from a side back
/// to itself passes the three other sides.
pub fn sides_between(from: PortSide, to: PortSide, clockwise: bool) -> Vec<PortSide> {
    let step = |side: PortSide| if clockwise { side.right() } else { side.left() };
    let mut sides = Vec::with_capacity(3);
    let mut next = step(from);
    while next != to {
        sides.push(next);
        next = step(next);
    }
    sides
}

/// Bend point where a loop running past `previous` turns to follow `side` at `padding` distance
/// from the node boundary.
pub fn opposing_corner_point(previous: Point, side: PortSide, node: Size, padding: f64) -> Point {
    let corner = match side {
        PortSide::North => Point::new(previous.x, -padding),
        PortSide::East => Point::new(node.width + padding, previous.y),
        PortSide::South => Point::new(previous.x, node.height + padding),
        PortSide::West => Point::new(-padding, previous.y),
    };
    corner.finite_or(previous)
}

/// Corner between the segment leaving `source_bend` and the segment entering `target_bend`,
/// where the latter bend point lies in front of `target_side`.
///
/// The corner is the intersection of the line through `source_bend` running perpendicular to
/// `target_side` and the line through `target_bend` running parallel to it. Parallel or
/// degenerate input yields a non-finite intersection, in which case `source_bend` is returned.
pub fn single_corner_point(source_bend: Point, target_bend: Point, target_side: PortSide) -> Point {
    let normal = target_side.normal();
    let along = Point::new(-normal.y, normal.x);
    line_intersection(source_bend, normal, target_bend, along).finite_or(source_bend)
}

fn line_intersection(p: Point, dp: Point, q: Point, dq: Point) -> Point {
    let det = dp.x * dq.y - dp.y * dq.x;
    let t = ((q.x - p.x) * dq.y - (q.y - p.y) * dq.x) / det;
    Point::new(p.x + dp.x * t, p.y + dp.y * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_rotate_clockwise() {
        assert_eq!(PortSide::North.right(), PortSide::East);
        assert_eq!(PortSide::North.left(), PortSide::West);
        assert_eq!(PortSide::West.right(), PortSide::North);
        assert_eq!(PortSide::East.opposite(), PortSide::West);
        assert!(PortSide::South.is_adjacent(PortSide::East));
        assert!(!PortSide::South.is_adjacent(PortSide::North));
    }

    #[test]
    fn sides_between_walks_in_both_directions() {
        assert!(
            sides_between(PortSide::North, PortSide::East, true).is_empty()
        );
        assert_eq!(
            sides_between(PortSide::North, PortSide::South, false),
            vec![PortSide::West]
        );
        assert_eq!(
            sides_between(PortSide::East, PortSide::East, true),
            vec![PortSide::South, PortSide::West, PortSide::North]
        );
    }

    #[test]
    fn single_corner_point_turns_onto_the_target_side() {
        let corner = single_corner_point(
            Point::new(80.0, -12.0),
            Point::new(112.0, 30.0),
            PortSide::East,
        );
        assert_eq!(corner, Point::new(112.0, -12.0));

        let corner = single_corner_point(
            Point::new(112.0, 30.0),
            Point::new(40.0, 72.0),
            PortSide::South,
        );
        assert_eq!(corner, Point::new(112.0, 72.0));
    }

    #[test]
    fn degenerate_corner_falls_back_to_the_source_bend_point() {
        let source = Point::new(3.0, 4.0);
        let corner = single_corner_point(source, Point::new(f64::NAN, 1.0), PortSide::North);
        assert_eq!(corner, source);

        let corner = opposing_corner_point(source, PortSide::West, Size::new(10.0, 10.0), f64::NAN);
        assert_eq!(corner, source);
    }

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let a = Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Rect::new(Point::new(10.0, 0.0), Size::new(10.0, 10.0));
        let c = Rect::new(Point::new(9.0, 9.0), Size::new(10.0, 10.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }
}
