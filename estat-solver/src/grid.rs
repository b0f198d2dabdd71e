use std::ops::{
    Bound,
    Range,
    RangeBounds,
};

use estat_scene::{
    Aabb,
    DomainBounds,
    SceneError,
};
use nalgebra::{
    Point2,
    Vector2,
};
use serde::{
    Deserialize,
    Serialize,
};

pub const MIN_NODES_PER_AXIS: usize = 32;
pub const MAX_NODES_PER_AXIS: usize = 2048;

/// Requested grid resolution in nodes per axis.
///
/// Values outside [`MIN_NODES_PER_AXIS`]..=[`MAX_NODES_PER_AXIS`] are
/// clamped rather than rejected.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "default_nodes")]
    pub nx: usize,

    #[serde(default = "default_nodes")]
    pub ny: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            nx: default_nodes(),
            ny: default_nodes(),
        }
    }
}

fn default_nodes() -> usize {
    201
}

/// Geometry of the node-centered solve grid.
///
/// Node `(i, j)` sits at world coordinate `origin + (i·dx, j·dy)` and
/// is stored row-major at index `j·nx + i`. Every coordinate in the
/// solver derives from this struct; nothing recomputes spacings on its
/// own.
#[derive(Clone, Copy, Debug)]
pub struct Grid {
    size: Vector2<usize>,
    origin: Point2<f64>,
    resolution: Vector2<f64>,
}

impl Grid {
    pub fn new(domain: &DomainBounds, spec: &GridSpec) -> Result<Self, SceneError> {
        domain.validate()?;

        let size = Vector2::new(clamp_axis(spec.nx), clamp_axis(spec.ny));
        if size.x != spec.nx || size.y != spec.ny {
            tracing::debug!(requested = ?(spec.nx, spec.ny), clamped = ?(size.x, size.y), "clamping grid size");
        }

        let resolution = Vector2::new(
            (domain.x_max - domain.x_min) / (size.x - 1) as f64,
            (domain.y_max - domain.y_min) / (size.y - 1) as f64,
        );

        Ok(Self {
            size,
            origin: Point2::new(domain.x_min, domain.y_min),
            resolution,
        })
    }

    pub fn nx(&self) -> usize {
        self.size.x
    }

    pub fn ny(&self) -> usize {
        self.size.y
    }

    pub fn size(&self) -> &Vector2<usize> {
        &self.size
    }

    pub fn num_nodes(&self) -> usize {
        self.size.x * self.size.y
    }

    pub fn dx(&self) -> f64 {
        self.resolution.x
    }

    pub fn dy(&self) -> f64 {
        self.resolution.y
    }

    pub fn origin(&self) -> &Point2<f64> {
        &self.origin
    }

    pub fn index(&self, point: &Point2<usize>) -> usize {
        point.y * self.size.x + point.x
    }

    pub fn point(&self, index: usize) -> Point2<usize> {
        Point2::new(index % self.size.x, index / self.size.x)
    }

    pub fn world_point(&self, point: &Point2<usize>) -> Point2<f64> {
        self.origin + point.coords.cast::<f64>().component_mul(&self.resolution)
    }

    /// Nearest node to a world coordinate, or `None` when the rounded
    /// node index falls outside the grid.
    pub fn nearest_node(&self, world: &Point2<f64>) -> Option<Point2<usize>> {
        let i = ((world.x - self.origin.x) / self.resolution.x).round();
        let j = ((world.y - self.origin.y) / self.resolution.y).round();

        let inside = i >= 0.0 && i < self.size.x as f64 && j >= 0.0 && j < self.size.y as f64;
        inside.then(|| Point2::new(i as usize, j as usize))
    }

    /// Inclusive node range covering a world-space bounding box,
    /// padded by the floor/ceil inversion so that edge nodes survive
    /// float roundoff. Returns `None` when the box misses the grid.
    pub fn nodes_covering(&self, aabb: &Aabb) -> Option<(Point2<usize>, Point2<usize>)> {
        let lo = |world: f64, origin: f64, d: f64, n: usize| -> usize {
            let t = ((world - origin) / d).floor();
            if t < 0.0 { 0 } else { (t as usize).min(n - 1) }
        };
        let hi = |world: f64, origin: f64, d: f64, n: usize| -> Option<usize> {
            let t = ((world - origin) / d).ceil();
            (t >= 0.0).then(|| (t as usize).min(n - 1))
        };

        if aabb.max.x < self.origin.x || aabb.max.y < self.origin.y {
            return None;
        }

        let start = Point2::new(
            lo(aabb.min.x, self.origin.x, self.resolution.x, self.size.x),
            lo(aabb.min.y, self.origin.y, self.resolution.y, self.size.y),
        );
        let end = Point2::new(
            hi(aabb.max.x, self.origin.x, self.resolution.x, self.size.x)?,
            hi(aabb.max.y, self.origin.y, self.resolution.y, self.size.y)?,
        );

        (start.x <= end.x && start.y <= end.y).then_some((start, end))
    }

    pub fn iter(&self, range: impl RangeBounds<Point2<usize>>) -> GridPointIter {
        GridPointIter {
            points: iter_points(range, self.size),
            nx: self.size.x,
        }
    }
}

fn clamp_axis(n: usize) -> usize {
    n.clamp(MIN_NODES_PER_AXIS, MAX_NODES_PER_AXIS)
}

/// Node count a spec will actually get once clamped, without needing a
/// domain.
pub(crate) fn clamped_num_nodes(spec: &GridSpec) -> usize {
    clamp_axis(spec.nx) * clamp_axis(spec.ny)
}

#[derive(Clone, Copy, Debug)]
pub struct GridPointIter {
    points: PointIter,
    nx: usize,
}

impl Iterator for GridPointIter {
    type Item = (usize, Point2<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let point = self.points.next()?;
        Some((point.y * self.nx + point.x, point))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

// the where bound is just so we get a compiler error if PointIter happens to be
// not an ExactSizeIterator anymore.
impl ExactSizeIterator for GridPointIter where PointIter: ExactSizeIterator {}

pub fn iter_points(range: impl RangeBounds<Point2<usize>>, size: Vector2<usize>) -> PointIter {
    let Range { start, end } = normalize_point_bounds(range, size);

    PointIter {
        x0: start.coords,
        x1: end.coords,
        x: (start != end).then_some(start.coords),
    }
}

pub fn normalize_point_bounds(
    range: impl RangeBounds<Point2<usize>>,
    size: Vector2<usize>,
) -> Range<Point2<usize>> {
    let start = match range.start_bound() {
        Bound::Included(start) => *start,
        Bound::Excluded(start) => start + Vector2::repeat(1),
        Bound::Unbounded => Point2::origin(),
    };

    let end = match range.end_bound() {
        Bound::Included(end) => end + Vector2::repeat(1),
        Bound::Excluded(end) => *end,
        Bound::Unbounded => size.into(),
    };

    let end = start
        .coords
        .zip_map(&end.coords, |x0, x1| x0.max(x1))
        .into();

    Range { start, end }
}

#[derive(Clone, Copy, Debug)]
pub struct PointIter {
    x0: Vector2<usize>,
    x1: Vector2<usize>,
    x: Option<Vector2<usize>>,
}

impl Iterator for PointIter {
    type Item = Point2<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = |mut x_n: Vector2<usize>| {
            x_n.x += 1;
            if x_n.x >= self.x1.x {
                x_n.x = self.x0.x;
                x_n.y += 1;
                if x_n.y >= self.x1.y {
                    return None;
                }
            }
            Some(x_n)
        };

        if let Some(x) = self.x {
            self.x = next(x);
            Some(Point2::from(x))
        }
        else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.x.map_or(0, |x| {
            let width = self.x1.x - self.x0.x;
            (self.x1.y - x.y - 1) * width + (self.x1.x - x.x)
        });
        (n, Some(n))
    }
}

impl ExactSizeIterator for PointIter {}
