//! Integer vector, matrix and rectangle types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D integer vector. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const ZERO: Self = Self::new(0, 0);
    pub const ONE: Self = Self::new(1, 1);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v }
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// `x * y`
    pub fn product(self) -> i32 {
        self.x * self.y
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn min_element(self) -> i32 {
        self.x.min(self.y)
    }

    /// Component-wise clamp into `[lo, hi]`.
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    /// Component-wise euclidean remainder, always non-negative for positive `rhs`.
    pub fn rem_euclid(self, rhs: Self) -> Self {
        Self::new(self.x.rem_euclid(rhs.x), self.y.rem_euclid(rhs.y))
    }

    /// `true` if `0 <= self < bounds` in both components.
    pub fn is_within(self, bounds: Self) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < bounds.x && self.y < bounds.y
    }
}

impl From<[i32; 2]> for IVec2 {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<IVec2> for [i32; 2] {
    fn from(v: IVec2) -> Self {
        [v.x, v.y]
    }
}

impl fmt::Display for IVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

impl Add for IVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for IVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for IVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for IVec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for IVec2 {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul for IVec2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

/// A 2x2 integer matrix stored as two columns.
///
/// Serialized column-major as `[[x.x, x.y], [y.x, y.y]]`, so
/// `M * v == x * v.x + y * v.y`. A 90 degree rotation is `[[0,1],[-1,0]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[[i32; 2]; 2]", into = "[[i32; 2]; 2]")]
pub struct IMat2 {
    pub x: IVec2,
    pub y: IVec2,
}

impl IMat2 {
    pub const IDENTITY: Self = Self::from_cols(IVec2::new(1, 0), IVec2::new(0, 1));
    pub const ROTATE_90: Self = Self::from_cols(IVec2::new(0, 1), IVec2::new(-1, 0));
    pub const ROTATE_180: Self = Self::from_cols(IVec2::new(-1, 0), IVec2::new(0, -1));
    pub const ROTATE_270: Self = Self::from_cols(IVec2::new(0, -1), IVec2::new(1, 0));
    pub const FLIP_X: Self = Self::from_cols(IVec2::new(-1, 0), IVec2::new(0, 1));
    pub const FLIP_Y: Self = Self::from_cols(IVec2::new(1, 0), IVec2::new(0, -1));

    pub const fn from_cols(x: IVec2, y: IVec2) -> Self {
        Self { x, y }
    }

    pub fn mul_vec(self, v: IVec2) -> IVec2 {
        self.x * v.x + self.y * v.y
    }
}

impl Default for IMat2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<IVec2> for IMat2 {
    type Output = IVec2;
    fn mul(self, rhs: IVec2) -> IVec2 {
        self.mul_vec(rhs)
    }
}

impl From<[[i32; 2]; 2]> for IMat2 {
    fn from([x, y]: [[i32; 2]; 2]) -> Self {
        Self::from_cols(x.into(), y.into())
    }
}

impl From<IMat2> for [[i32; 2]; 2] {
    fn from(m: IMat2) -> Self {
        [m.x.into(), m.y.into()]
    }
}

/// An axis-aligned rectangle of grid cells: `pos` is the top-left cell,
/// `size` the extent. Empty when either size component is `<= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: IVec2,
    pub size: IVec2,
}

impl Rect {
    pub const fn new(pos: IVec2, size: IVec2) -> Self {
        Self { pos, size }
    }

    /// Rectangle covering both corners inclusively; the corners may be given in any order.
    pub fn from_corners(a: IVec2, b: IVec2) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self::new(lo, hi - lo + IVec2::ONE)
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    /// One past the bottom-right cell.
    pub fn end(&self) -> IVec2 {
        self.pos + self.size
    }

    pub fn contains(&self, p: IVec2) -> bool {
        (p - self.pos).is_within(self.size)
    }

    /// Grow by `margin` cells on every side.
    pub fn expand(&self, margin: IVec2) -> Self {
        Self::new(self.pos - margin, self.size + margin * 2)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let lo = self.pos.max(other.pos);
        let hi = self.end().min(other.end());
        let r = Rect::new(lo, hi - lo);
        (!r.is_empty()).then_some(r)
    }

    /// All cells in increasing position order (row by row, left to right).
    pub fn iter(&self) -> impl Iterator<Item = IVec2> {
        let Rect { pos, size } = *self;
        let (w, h) = (size.x.max(0), size.y.max(0));
        (0..h).flat_map(move |y| (0..w).map(move |x| pos + IVec2::new(x, y)))
    }
}
