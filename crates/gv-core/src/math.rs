use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point or direction in world space. `y` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// East/west component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// North/south component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector pointing straight down.
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// The same vector with its vertical component dropped.
    pub fn horizontal(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Unit vector in the same direction, or zero for a (near) zero vector.
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len <= f64::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Return `true` if every component is within `f64::EPSILON` of zero.
    pub fn is_zero(self) -> bool {
        self.x.abs() <= f64::EPSILON && self.y.abs() <= f64::EPSILON && self.z.abs() <= f64::EPSILON
    }

    /// Component-wise sum of `self` and `other * scale`.
    pub fn add_scaled(self, other: Self, scale: f64) -> Self {
        self + other * scale
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Two-axis movement input. `x` strafes (positive = left), `y` moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Strafe axis.
    pub x: f64,
    /// Forward axis.
    pub y: f64,
}

impl Vec2 {
    /// Create a movement input from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Entity orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation about the horizontal axis (looking up/down).
    pub pitch: f64,
    /// Rotation about the vertical axis (turning left/right).
    pub yaw: f64,
}

impl Rotation {
    /// Create a rotation from pitch and yaw in degrees.
    pub const fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }

    /// The same rotation turned by `degrees` about the vertical axis.
    pub fn with_yaw_offset(self, degrees: f64) -> Self {
        Self::new(self.pitch, self.yaw + degrees)
    }
}

/// Direction a rotation points in, using the engine's convention that a yaw
/// of zero faces `+z`.
///
/// The horizontal part lies on the unit circle; `y` is derived from pitch
/// independently and is not normalised together with it.
pub fn direction_from_rotation(rotation: Rotation) -> Vec3 {
    let yaw = (rotation.yaw + 90.0).to_radians();
    let pitch = (rotation.pitch + 90.0).to_radians();
    Vec3::new(yaw.cos(), pitch.cos(), yaw.sin())
}

/// Horizontal direction a quarter turn from `rotation`, used for strafing.
pub fn lateral_direction(rotation: Rotation) -> Vec3 {
    direction_from_rotation(rotation.with_yaw_offset(90.0))
}

/// Horizontal unit vectors perpendicular to `direction`, as `(left, right)`.
///
/// Returns two zero vectors when `direction` has no horizontal part.
pub fn perpendiculars(direction: Vec3) -> (Vec3, Vec3) {
    let flat = direction.horizontal().normalize_or_zero();
    let left = Vec3::new(flat.z, 0.0, -flat.x);
    (left, -left)
}
