//! Agglomerative clustering and dendrogram leaf ordering

/// One agglomeration step
///
/// Ids below the leaf count are leaves; merge `k` creates cluster id
/// `n_leaves + k`. `left` is always the smaller of the two ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

/// Binary cluster tree produced by agglomerative clustering
#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    n_leaves: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Leaves in pre-order (left subtree first)
    ///
    /// Leaves that were merged at small distances end up adjacent, which is
    /// the quasi-diagonal ordering of the underlying matrix.
    pub fn leaf_order(&self) -> Vec<usize> {
        if self.n_leaves == 0 {
            return Vec::new();
        }

        let root = self.n_leaves + self.merges.len() - 1;
        let mut order = Vec::with_capacity(self.n_leaves);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node < self.n_leaves {
                order.push(node);
            } else {
                let merge = &self.merges[node - self.n_leaves];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        order
    }
}

/// Single-linkage clustering of a symmetric distance matrix
///
/// Repeatedly merges the two closest active clusters; the distance between
/// clusters is the minimum distance between their members. Ties resolve to
/// the pair found first in row-major order. O(n³), fine for portfolio sizes.
pub fn single_linkage(dist: &[Vec<f64>]) -> Dendrogram {
    let n = dist.len();
    let mut d: Vec<Vec<f64>> = dist.to_vec();
    let mut active = vec![true; n];
    let mut node_id: Vec<usize> = (0..n).collect();
    let mut size = vec![1usize; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for step in 0..n.saturating_sub(1) {
        let mut best: Option<(f64, usize, usize)> = None;
        for i in 0..n {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..n {
                if active[j] && best.is_none_or(|(m, _, _)| d[i][j] < m) {
                    best = Some((d[i][j], i, j));
                }
            }
        }
        let Some((distance, a, b)) = best else {
            break;
        };

        let (left, right) = if node_id[a] < node_id[b] {
            (node_id[a], node_id[b])
        } else {
            (node_id[b], node_id[a])
        };
        size[a] += size[b];
        merges.push(Merge {
            left,
            right,
            distance,
            size: size[a],
        });

        // Slot `a` now holds the merged cluster; `b` is retired.
        node_id[a] = n + step;
        active[b] = false;
        for k in 0..n {
            if active[k] && k != a {
                let m = d[a][k].min(d[b][k]);
                d[a][k] = m;
                d[k][a] = m;
            }
        }
    }

    Dendrogram {
        n_leaves: n,
        merges,
    }
}
