//! 2D and 3D points.

use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A point or vector in the plane.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pair {
    pub x: f64,
    pub y: f64,
}

impl Pair {
    pub const fn new(x: f64, y: f64) -> Self {
        Pair { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Pair {
    type Output = Pair;

    fn add(self, rhs: Pair) -> Pair {
        Pair::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pair {
    type Output = Pair;

    fn sub(self, rhs: Pair) -> Pair {
        Pair::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Pair {
    type Output = Pair;

    fn neg(self) -> Pair {
        Pair::new(-self.x, -self.y)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A point or vector in space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Triple {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Triple {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Triple { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for Triple {
    type Output = Triple;

    fn add(self, rhs: Triple) -> Triple {
        Triple::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Neg for Triple {
    type Output = Triple;

    fn neg(self) -> Triple {
        Triple::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}
