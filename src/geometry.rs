//! Integer and floating point geometry shared by every other module
//!
//! Node positions and sizes live on an integer grid; connector fragments are
//! floating point. The helpers here cover grid snapping, bounding box unions,
//! scaling, and the segment tests used by layout and hit-testing.

/// Below this horizontal extent a segment is treated as vertical
const VERTICAL_EPSILON: f64 = 0.000_000_1;

/// An integer 2D point in model coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by the given offsets
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Snap to the nearest multiple of the grid cell (ties go to even)
    pub fn round_to(self, grid: Size) -> Self {
        let (w, h) = grid.clamped();
        Self::new(round_to_multiple(self.x, w), round_to_multiple(self.y, h))
    }

    /// Scale both coordinates, truncating toward zero
    pub fn scale(self, factor: f32) -> Self {
        Self::new(
            (self.x as f32 * factor) as i32,
            (self.y as f32 * factor) as i32,
        )
    }

    pub fn to_f(self) -> PointF {
        PointF::new(self.x as f64, self.y as f64)
    }
}

/// An integer width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Snap both dimensions to the grid (ties go to even)
    pub fn round_to(self, grid: Size) -> Self {
        let (w, h) = grid.clamped();
        Self::new(
            round_to_multiple(self.width, w),
            round_to_multiple(self.height, h),
        )
    }

    /// Dimensions with zero clamped to 1, safe to divide by
    pub fn clamped(self) -> (i32, i32) {
        (
            if self.width == 0 { 1 } else { self.width },
            if self.height == 0 { 1 } else { self.height },
        )
    }
}

fn round_to_multiple(value: i32, step: i32) -> i32 {
    (value as f64 / step as f64).round_ties_even() as i32 * step
}

/// An axis-aligned integer rectangle, `x`/`y` being the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_point_size(location: Point, size: Size) -> Self {
        Self::new(location.x, location.y, size.width, size.height)
    }

    pub fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Center point, using integer division
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Check if this rectangle overlaps another (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        other.x < self.right()
            && self.x < other.right()
            && other.y < self.bottom()
            && self.y < other.bottom()
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom
    pub fn inflate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + 2 * dx,
            self.height + 2 * dy,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_ltrb(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Snap location and size to the grid
    pub fn round_to(&self, grid: Size) -> Rect {
        Rect::from_point_size(self.location().round_to(grid), self.size().round_to(grid))
    }

    /// Check whether the segment `a`-`b` touches this rectangle.
    ///
    /// Clips the segment's x-projection to the rectangle, evaluates the line
    /// at the clipped ends and checks the resulting y-range against the
    /// rectangle. Near-vertical segments skip the slope and use their raw
    /// y-range.
    pub fn intersects_line(&self, a: PointF, b: PointF) -> bool {
        let rect_min_x = self.left() as f64;
        let rect_min_y = self.top() as f64;
        let rect_max_x = self.right() as f64;
        let rect_max_y = self.bottom() as f64;

        let mut min_x = a.x.min(b.x);
        let mut max_x = a.x.max(b.x);
        if max_x > rect_max_x {
            max_x = rect_max_x;
        }
        if min_x < rect_min_x {
            min_x = rect_min_x;
        }
        if min_x > max_x {
            return false;
        }

        let mut min_y = a.y;
        let mut max_y = b.y;
        let dx = b.x - a.x;
        if dx.abs() > VERTICAL_EPSILON {
            let slope = (b.y - a.y) / dx;
            let intercept = a.y - slope * a.x;
            min_y = slope * min_x + intercept;
            max_y = slope * max_x + intercept;
        }
        if min_y > max_y {
            std::mem::swap(&mut min_y, &mut max_y);
        }

        if max_y > rect_max_y {
            max_y = rect_max_y;
        }
        if min_y < rect_min_y {
            min_y = rect_min_y;
        }
        min_y <= max_y
    }
}

/// Union of all rectangles, or `None` when there are none
pub fn bounding_box<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// A floating point 2D point, used for connector geometry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation toward `other` at parameter `t`
    pub fn lerp(self, other: PointF, t: f64) -> PointF {
        PointF::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn distance(self, other: PointF) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Truncate toward zero onto the integer grid
    pub fn truncate(self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        p.to_f()
    }
}

/// A floating point rectangle, used for sub-cells of a node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment, matching [`Rect::contains`]
    pub fn contains(&self, p: PointF) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// Returns NaN when `a == b`, so any threshold comparison fails.
pub fn point_to_line_distance(a: PointF, b: PointF, p: PointF) -> f64 {
    let length = a.distance(b);
    ((p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)).abs() / length
}

/// Project `p` onto the segment `a`-`b`.
///
/// Returns `(u, length)` where `u` is the distance from `a` along the
/// segment direction; the projection lies on the segment when
/// `0 < u < length`.
pub fn segment_projection(a: PointF, b: PointF, p: PointF) -> (f64, f64) {
    let length = a.distance(b);
    let u = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / length;
    (u, length)
}
