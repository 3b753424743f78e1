//! Core types for circuit representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a placed component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// A unique identifier for a node (component terminal or free junction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A unique identifier for a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireId(pub u32);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// An electrical net: a connected component of the node/wire graph.
///
/// Net ids are 1-based and only meaningful within the solve that produced
/// them. Ids above the resolver's count are synthetic nets allocated by the
/// network builder (battery internals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NetId(pub usize);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net{}", self.0)
    }
}

/// Which of a component's two terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Negative terminal, drawn on the left
    #[serde(alias = "L", alias = "a")]
    Negative,
    /// Positive terminal, drawn on the right
    #[serde(alias = "R", alias = "b")]
    Positive,
}

impl Side {
    /// Both sides, negative first.
    pub const BOTH: [Side; 2] = [Side::Negative, Side::Positive];

    /// Index into a terminal pair.
    pub fn index(self) -> usize {
        match self {
            Side::Negative => 0,
            Side::Positive => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Negative => write!(f, "-"),
            Side::Positive => write!(f, "+"),
        }
    }
}

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Placement of an item on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    /// Center position
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees, clockwise in screen space
    pub rotation: f64,
    /// Scale factor (1.0 = library size)
    pub size: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            size: 1.0,
        }
    }
}

impl Pose {
    /// Half the distance between the two terminals at size 1.0.
    pub const TERMINAL_OFFSET: f64 = 80.0;

    /// Pose at a position with default rotation and size.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Map a local offset through scale, rotation and translation.
    pub fn transform(&self, local: Point) -> Point {
        let (s, c) = self.rotation.to_radians().sin_cos();
        let lx = local.x * self.size;
        let ly = local.y * self.size;
        Point {
            x: self.x + lx * c - ly * s,
            y: self.y + lx * s + ly * c,
        }
    }

    /// World position of a terminal.
    pub fn terminal_position(&self, side: Side) -> Point {
        let dx = match side {
            Side::Negative => -Self::TERMINAL_OFFSET,
            Side::Positive => Self::TERMINAL_OFFSET,
        };
        self.transform(Point::new(dx, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_position_unrotated() {
        let pose = Pose::at(100.0, 50.0);
        assert_eq!(pose.terminal_position(Side::Negative), Point::new(20.0, 50.0));
        assert_eq!(pose.terminal_position(Side::Positive), Point::new(180.0, 50.0));
    }

    #[test]
    fn test_terminal_position_rotated_and_scaled() {
        let pose = Pose {
            x: 0.0,
            y: 0.0,
            rotation: 90.0,
            size: 0.5,
        };
        let p = pose.terminal_position(Side::Positive);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_side_aliases() {
        let sides: Vec<Side> = serde_json::from_str(r#"["L", "b", "positive"]"#).unwrap();
        assert_eq!(sides, vec![Side::Negative, Side::Positive, Side::Positive]);
    }
}
