use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Planar direction the model can be pushed in.
///
/// Front/back move along Z, left/right along X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
}

impl Direction {
    /// Unit translation vector for this direction.
    pub fn unit(self) -> Vec3 {
        match self {
            Direction::Front => Vec3::Z,
            Direction::Back => Vec3::NEG_Z,
            Direction::Left => Vec3::NEG_X,
            Direction::Right => Vec3::X,
        }
    }
}

/// Principal rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Whether `eye`, `at` and `up` fail to span a camera basis: the eye sits on
/// the target, `up` is zero, the viewing direction is parallel to `up`, or a
/// component is not finite.
pub fn look_at_is_degenerate(eye: Vec3, at: Vec3, up: Vec3) -> bool {
    let (Some(forward), Some(up)) = ((at - eye).try_normalize(), up.try_normalize()) else {
        return true;
    };
    forward.cross(up).length_squared() < 1e-6
}
