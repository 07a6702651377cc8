#![forbid(unsafe_code)]

//! Geometric primitives in screen points.
//!
//! Coordinates are floating point with the origin at the top-left of the
//! screen and `y` growing downward. Rectangles may sit partially or fully
//! outside the visible screen (a card scrolled above the viewport has a
//! negative `y`).

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset from `other` to `self`.
    #[inline]
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        let d = self.delta_from(other);
        d.x.hypot(d.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Linear interpolation between two sizes. `t` is not clamped.
    #[must_use]
    pub fn lerp(from: Size, to: Size, t: f64) -> Size {
        Size::new(lerp(from.width, to.width, t), lerp(from.height, to.height, t))
    }
}

/// A rectangle: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Create a rectangle from an origin point and a size.
    #[inline]
    #[must_use]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    #[inline]
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.y
    }

    #[inline]
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point lies inside the rectangle (right/bottom exclusive).
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.max_x() && p.y >= self.y && p.y < self.max_y()
    }

    /// Translate by an offset.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Scale the rectangle around its center by `scale`.
    ///
    /// This is how a uniform scale transform changes a view's rendered frame.
    #[must_use]
    pub fn scaled_about_center(&self, scale: f64) -> Rect {
        let c = self.center();
        let w = self.width * scale;
        let h = self.height * scale;
        Rect::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    /// Linear interpolation of every component. `t` is not clamped so spring
    /// overshoot carries through.
    #[must_use]
    pub fn lerp(from: Rect, to: Rect, t: f64) -> Rect {
        Rect::new(
            lerp(from.x, to.x, t),
            lerp(from.y, to.y, t),
            lerp(from.width, to.width, t),
            lerp(from.height, to.height, t),
        )
    }

    /// Component-wise comparison with a tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: &Rect, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[must_use]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.max_x().min(other.max_x());
        let bottom = self.max_y().min(other.max_y());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// Scalar linear interpolation. `t` is not clamped.
#[inline]
#[must_use]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(20.0, 500.0, 150.0, 220.0);
        assert_eq!(r.max_x(), 170.0);
        assert_eq!(r.max_y(), 720.0);
        assert_eq!(r.center(), Point::new(95.0, 610.0));
    }

    #[test]
    fn rect_lerp_endpoints_and_overshoot() {
        let a = Rect::new(20.0, 500.0, 150.0, 220.0);
        let b = Rect::new(0.0, 0.0, 390.0, 844.0);
        assert_eq!(Rect::lerp(a, b, 0.0), a);
        assert_eq!(Rect::lerp(a, b, 1.0), b);
        let over = Rect::lerp(a, b, 1.1);
        assert!(over.y < 0.0, "overshoot should pass the target: {over:?}");
    }

    #[test]
    fn scaled_about_center_keeps_center() {
        let r = Rect::new(0.0, 0.0, 100.0, 200.0);
        let s = r.scaled_about_center(0.5);
        assert_eq!(s.center(), r.center());
        assert_eq!(s.size(), Size::new(50.0, 100.0));
    }

    #[test]
    fn contains_excludes_far_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn intersection_of_disjoint_is_none() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersection_opt(&b).is_none());
        let c = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection_opt(&c), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
    }
}
