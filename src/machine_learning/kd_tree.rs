use crate::dataset::FeatureVector;
use crate::error::ModelError;
use crate::math::squared_euclidean_distance_row;
use crate::traits::{Neighbor, SpatialIndex};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A node of the k-d tree. `point` indexes into the tree's point storage.
#[derive(Debug, Clone)]
struct KdNode {
    point: usize,
    axis: usize,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

impl KdNode {
    fn leaf(point: usize, axis: usize) -> Self {
        KdNode {
            point,
            axis,
            left: None,
            right: None,
        }
    }
}

/// Query candidate ordered by squared distance, then by insertion index.
///
/// The max-heap of candidates therefore keeps the worst one on top, and among equal
/// distances the point inserted last is evicted first.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance_sq: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then(self.index.cmp(&other.index))
    }
}

/// k-d tree over fixed-length feature vectors with exact Euclidean k-nearest-neighbour search.
///
/// Points are identified by their insertion index. [`KdTree::build`] produces a balanced
/// tree by median splits, cycling the split axis with the depth. [`KdTree::add`] inserts by
/// plain descent and may unbalance the tree until [`SpatialIndex::optimize`] rebuilds it.
///
/// Neighbours at equal distance are returned in insertion order, so query results are
/// reproducible regardless of the tree's shape.
///
/// # Examples
/// ```rust
/// use classeval::dataset::FeatureVector;
/// use classeval::machine_learning::KdTree;
/// use classeval::traits::SpatialIndex;
///
/// let points = vec![
///     FeatureVector::new(vec![0.0, 0.0]).unwrap(),
///     FeatureVector::new(vec![1.0, 1.0]).unwrap(),
///     FeatureVector::new(vec![5.0, 5.0]).unwrap(),
/// ];
/// let tree = KdTree::build(points).unwrap();
///
/// let query = FeatureVector::new(vec![0.9, 0.9]).unwrap();
/// let neighbours = tree.nearest(&query, 2).unwrap();
/// assert_eq!(neighbours[0].index, 1);
/// assert_eq!(neighbours[1].index, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    points: Vec<FeatureVector>,
    root: Option<Box<KdNode>>,
    optimized: bool,
}

impl KdTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a balanced tree over `points`.
    ///
    /// # Returns
    ///
    /// - `Ok(KdTree)` - The optimized tree
    /// - `Err(ModelError::InputValidationError)` - If the points do not all share one dimension
    pub fn build(points: Vec<FeatureVector>) -> Result<Self, ModelError> {
        if let Some(first) = points.first() {
            let dimension = first.dimension();
            if let Some((i, p)) = points
                .iter()
                .enumerate()
                .find(|(_, p)| p.dimension() != dimension)
            {
                return Err(ModelError::InputValidationError(format!(
                    "Point {} has dimension {}, expected {}",
                    i,
                    p.dimension(),
                    dimension
                )));
            }
        }

        let mut tree = KdTree {
            points,
            root: None,
            optimized: false,
        };
        tree.optimize();
        Ok(tree)
    }

    /// Inserts a point and returns its insertion index.
    ///
    /// The point descends to a leaf without rebalancing; the tree is marked as not optimized.
    pub fn add(&mut self, point: FeatureVector) -> Result<usize, ModelError> {
        let dimension = match self.dimension() {
            Some(d) if d != point.dimension() => {
                return Err(ModelError::InputValidationError(format!(
                    "Feature dimension mismatch: expected {}, got {}",
                    d,
                    point.dimension()
                )));
            }
            Some(d) => d,
            None => point.dimension(),
        };

        let index = self.points.len();
        self.points.push(point);

        let points = &self.points;
        let new_point = points[index].view();
        let mut depth = 0;
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            let split = points[node.point].view()[node.axis];
            slot = if new_point[node.axis] < split {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }
        *slot = Some(Box::new(KdNode::leaf(index, depth % dimension)));

        self.optimized = false;
        Ok(index)
    }

    /// Whether the tree is balanced since the last [`SpatialIndex::optimize`].
    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// Stored point with the given insertion index.
    pub fn get(&self, index: usize) -> Option<&FeatureVector> {
        self.points.get(index)
    }

    /// All stored points in insertion order.
    pub fn points(&self) -> &[FeatureVector] {
        &self.points
    }

    fn build_balanced(
        points: &[FeatureVector],
        indices: &mut [usize],
        depth: usize,
        dimension: usize,
    ) -> Option<Box<KdNode>> {
        if indices.is_empty() {
            return None;
        }

        let axis = depth % dimension;
        indices.sort_unstable_by(|&a, &b| {
            points[a].view()[axis]
                .total_cmp(&points[b].view()[axis])
                .then(a.cmp(&b))
        });

        let median = indices.len() / 2;
        let point = indices[median];
        let (left, rest) = indices.split_at_mut(median);
        let right = &mut rest[1..];

        Some(Box::new(KdNode {
            point,
            axis,
            left: Self::build_balanced(points, left, depth + 1, dimension),
            right: Self::build_balanced(points, right, depth + 1, dimension),
        }))
    }

    fn offer(heap: &mut BinaryHeap<Candidate>, candidate: Candidate, k: usize) {
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(worst) = heap.peek() {
            if candidate < *worst {
                heap.pop();
                heap.push(candidate);
            }
        }
    }
}

impl SpatialIndex for KdTree {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.points.first().map(FeatureVector::dimension)
    }

    fn optimize(&mut self) {
        if self.optimized {
            return;
        }
        self.root = match self.dimension() {
            Some(dimension) => {
                let mut indices: Vec<usize> = (0..self.points.len()).collect();
                Self::build_balanced(&self.points, &mut indices, 0, dimension)
            }
            None => None,
        };
        self.optimized = true;
    }

    fn nearest(&self, query: &FeatureVector, k: usize) -> Result<Vec<Neighbor<'_>>, ModelError> {
        if k == 0 {
            return Err(ModelError::InputValidationError(
                "k must be greater than 0".to_string(),
            ));
        }

        if k > self.points.len() {
            return Err(ModelError::InputValidationError(format!(
                "k ({}) exceeds the number of indexed points ({})",
                k,
                self.points.len()
            )));
        }

        if let Some(dimension) = self.dimension() {
            if query.dimension() != dimension {
                return Err(ModelError::InputValidationError(format!(
                    "Feature dimension mismatch: expected {}, got {}",
                    dimension,
                    query.dimension()
                )));
            }
        }

        let query_view = query.view();
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);

        // (subtree, lower bound of the squared distance to any point in it)
        let mut stack: Vec<(&KdNode, f64)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 0.0));
        }

        while let Some((node, bound)) = stack.pop() {
            if heap.len() == k {
                if let Some(worst) = heap.peek() {
                    if bound > worst.distance_sq {
                        continue;
                    }
                }
            }

            let point = self.points[node.point].view();
            let candidate = Candidate {
                distance_sq: squared_euclidean_distance_row(&query_view, &point),
                index: node.point,
            };
            Self::offer(&mut heap, candidate, k);

            let diff = query_view[node.axis] - point[node.axis];
            let (near, far) = if diff < 0.0 {
                (node.left.as_deref(), node.right.as_deref())
            } else {
                (node.right.as_deref(), node.left.as_deref())
            };

            if let Some(far) = far {
                stack.push((far, bound.max(diff * diff)));
            }
            if let Some(near) = near {
                stack.push((near, bound));
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                point: &self.points[c.index],
                distance: c.distance_sq.sqrt(),
                index: c.index,
            })
            .collect())
    }
}
