use crate::{Aabb, Point};

/// An ordered sequence of points.
///
/// Insertion order carries no meaning but is preserved: downstream stages
/// (clustering in particular) traverse the cloud in stored order, which keeps
/// their output deterministic for a given input.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud<P: Point> {
    points: Vec<P>,
}

impl<P: Point> PointCloud<P> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn from_points(points: Vec<P>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: P) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, i: usize) -> P {
        self.points[i]
    }

    pub fn position(&self, i: usize) -> [f32; 3] {
        self.points[i].position()
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> + '_ {
        self.points.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.points.iter().map(|p| p.position())
    }

    pub fn as_slice(&self) -> &[P] {
        &self.points
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_positions(self.positions())
    }

    /// Build a new cloud from the points at the given indices, in the given
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut out = Vec::with_capacity(indices.len());
        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            out.push(self.points[idx]);
        }
        Self { points: out }
    }

    /// Build a new cloud from all points NOT at the given indices.
    ///
    /// This is the complement of [`select`](Self::select); together the two
    /// calls partition the cloud exactly. The relative order of the retained
    /// points is preserved.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn select_inverse(&self, indices: &[usize]) -> Self {
        let n = self.len();
        let mut exclude = vec![false; n];
        for &idx in indices {
            assert!(idx < n, "index out of bounds in select_inverse");
            exclude[idx] = true;
        }

        let points = self
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| !exclude[*i])
            .map(|(_, p)| *p)
            .collect();
        Self { points }
    }
}

impl<P: Point> Default for PointCloud<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Point> FromIterator<P> for PointCloud<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<P: Point> IntoIterator for PointCloud<P> {
    type Item = P;
    type IntoIter = std::vec::IntoIter<P>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}
