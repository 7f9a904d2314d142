//! Dense cost matrix.

/// A dense n×n cost matrix stored in row-major order.
///
/// Rows and columns are dense vertex indices (`vertex id - 1`), not vertex
/// ids. Unreachable pairs hold `f64::INFINITY`.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::DistanceMatrix;
///
/// let mut dm = DistanceMatrix::filled(3, f64::INFINITY);
/// dm.set(0, 1, 5.0);
/// assert_eq!(dm.get(0, 1), 5.0);
/// assert!(dm.get(1, 0).is_infinite());
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix of the given size with every cell set to `value`.
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            data: vec![value; size * size],
            size,
        }
    }

    /// Returns the cost from index `from` to index `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the cost from index `from` to index `to`.
    pub fn set(&mut self, from: usize, to: usize, cost: f64) {
        self.data[from * self.size + to] = cost;
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled() {
        let dm = DistanceMatrix::filled(2, 7.0);
        assert_eq!(dm.size(), 2);
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(dm.get(i, j), 7.0);
            }
        }
    }

    #[test]
    fn test_set_is_directional() {
        let mut dm = DistanceMatrix::filled(2, f64::INFINITY);
        dm.set(0, 1, 10.0);
        assert_eq!(dm.get(0, 1), 10.0);
        assert!(dm.get(1, 0).is_infinite());
    }
}
