use serde::{Deserialize, Serialize};

/// A point in surface pixel coordinates (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(self, delta: Point) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }

    /// Point on the quadratic Bezier `from -> control -> to` at `t` in `[0, 1]`.
    pub fn quadratic(from: Point, control: Point, to: Point, t: f32) -> Point {
        let u = 1.0 - t;
        Point::new(
            u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
            u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
        )
    }
}

/// Drawing surface dimensions, queried once per simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Integer-aligned placement rectangle, expressed in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x_begin: i32,
    pub x_end: i32,
    pub y_begin: i32,
    pub y_end: i32,
}

impl Bounds {
    /// Region between `inset` and `1 - inset` of each surface axis.
    pub fn inset(size: SurfaceSize, inset: f32) -> Self {
        let inset = inset.clamp(0.0, 0.5);
        Self {
            x_begin: (size.width * inset).floor() as i32,
            x_end: (size.width * (1.0 - inset)).floor() as i32,
            y_begin: (size.height * inset).floor() as i32,
            y_end: (size.height * (1.0 - inset)).floor() as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.x_end - self.x_begin
    }

    pub fn height(&self) -> i32 {
        self.y_end - self.y_begin
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x_begin as f32
            && p.x <= self.x_end as f32
            && p.y >= self.y_begin as f32
            && p.y <= self.y_end as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inset_bounds_floor() {
        let b = Bounds::inset(SurfaceSize::new(1005.0, 333.0), 0.1);
        assert_eq!(b.x_begin, 100);
        assert_eq!(b.x_end, 904);
        assert_eq!(b.y_begin, 33);
        assert_eq!(b.y_end, 299);
    }

    #[test]
    fn test_quadratic_endpoints() {
        let a = Point::new(0.0, 0.0);
        let c = Point::new(5.0, 10.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(Point::quadratic(a, c, b, 0.0), a);
        assert_eq!(Point::quadratic(a, c, b, 1.0), b);
        let mid = Point::quadratic(a, c, b, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-6);
        assert!((mid.y - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
