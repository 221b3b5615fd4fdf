// src/utils/geometry.rs

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Extra slack (in map units) granted by [`near_plane`] beyond the portal's own diagonal.
pub const DOOR_DISTANCE_TOLERANCE: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance_to(&self, other: &Vec3) -> f64 {
        (*self - *other).length()
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z).
    pub fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Parses three whitespace separated numbers, e.g. an entity `origin`.
    pub fn parse(text: &str) -> Option<Vec3> {
        let mut parts = text.split_whitespace().map(|p| p.parse::<f64>());
        let x = parts.next()?.ok()?;
        let y = parts.next()?.ok()?;
        let z = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Vec3::new(x, y, z))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Formats as `x y z`, the way Hammer writes coordinates.
impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            format_coord(self.x),
            format_coord(self.y),
            format_coord(self.z)
        )
    }
}

/// Formats a coordinate without a trailing `.0` and without negative zero.
pub fn format_coord(value: f64) -> String {
    format!("{}", value + 0.0)
}

/// An axis-aligned box in map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y && min.z <= max.z);
        Bounds { min, max }
    }

    /// A box that contains nothing; the first `expand_point` makes it a point.
    pub fn new_empty() -> Self {
        Bounds {
            min: Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut bounds = Bounds::new_empty();
        for point in points {
            bounds.expand_point(point);
        }
        (!bounds.is_empty()).then_some(bounds)
    }

    pub fn expand_point(&mut self, point: &Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn combine(&mut self, other: &Bounds) {
        self.min = self.min.min(&other.min);
        self.max = self.max.max(&other.max);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut bounds = *self;
        bounds.combine(other);
        bounds
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        self.min.distance_to(&self.max)
    }

    pub fn translate(&self, vector: Vec3) -> Bounds {
        translate_box(self, vector)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[({}) ({})]", self.min, self.max)
    }
}

pub fn translate_box(bounds: &Bounds, vector: Vec3) -> Bounds {
    Bounds {
        min: bounds.min + vector,
        max: bounds.max + vector,
    }
}

/// Componentwise max of the lower corners and min of the upper corners.
///
/// The result is degenerate (or inverted) when the boxes do not overlap.
pub fn intersect(a: &Bounds, b: &Bounds) -> Bounds {
    Bounds {
        min: a.min.max(&b.min),
        max: a.max.min(&b.max),
    }
}

/// Two boxes collide only if their intersection has positive extent on every axis,
/// so boxes that merely share a face do not collide.
pub fn collide(a: &Bounds, b: &Bounds) -> bool {
    let size = intersect(a, b).size();
    size.x > 0.0 && size.y > 0.0 && size.z > 0.0
}

pub fn distance(p: &Vec3, q: &Vec3) -> f64 {
    p.distance_to(q)
}

/// Tolerant proximity test: is `point` within the portal's diagonal
/// (plus [`DOOR_DISTANCE_TOLERANCE`]) of the portal's lower corner?
pub fn near_plane(point: &Vec3, bounds: &Bounds) -> bool {
    distance(&bounds.min, point) < bounds.diagonal() + DOOR_DISTANCE_TOLERANCE
}
