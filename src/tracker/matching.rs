//! Matching utilities for centroid tracking.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::tracker::rect::Centroid;

/// Cost used to pad non-square matrices for the linear assignment solver.
const PADDING_COST: f64 = 1e6;

/// Compute the Euclidean distance matrix between identities and detections.
///
/// Rows are identity centroids, columns are detection centroids.
pub fn centroid_distance(identities: &[Centroid], detections: &[Centroid]) -> Array2<f64> {
    let mut dists = Array2::zeros((identities.len(), detections.len()));
    for (i, a) in identities.iter().enumerate() {
        for (j, b) in detections.iter().enumerate() {
            dists[[i, j]] = a.distance(b);
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    fn unmatched(num_rows: usize, num_cols: usize) -> Self {
        Self {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        }
    }

    fn from_used(matches: Vec<(usize, usize)>, used_rows: &[bool], used_cols: &[bool]) -> Self {
        let unused = |used: &[bool]| -> Vec<usize> {
            used.iter()
                .enumerate()
                .filter_map(|(i, &u)| if u { None } else { Some(i) })
                .collect()
        };
        Self {
            matches,
            unmatched_tracks: unused(used_rows),
            unmatched_detections: unused(used_cols),
        }
    }
}

/// Strategy pairing existing identities (rows) with detections (columns).
///
/// Pairs whose cost exceeds `max_cost` are never reported as matches.
pub trait Associator {
    fn associate(&self, cost_matrix: &Array2<f64>, max_cost: f64) -> AssignmentResult;
}

/// Lowest-distance-first greedy matching.
///
/// Rows are visited in ascending order of their minimum cost and each row
/// proposes its cheapest column (first occurrence on ties). A proposal is
/// dropped when its row or column is already taken or its cost is above the
/// limit; a dropped row does not fall back to its next-best column. This is
/// O(n·m) and not globally optimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAssociator;

impl Associator for GreedyAssociator {
    fn associate(&self, cost_matrix: &Array2<f64>, max_cost: f64) -> AssignmentResult {
        let (num_rows, num_cols) = cost_matrix.dim();
        if num_rows == 0 || num_cols == 0 {
            return AssignmentResult::unmatched(num_rows, num_cols);
        }

        // (row, best column, best cost)
        let mut proposals: Vec<(usize, usize, f64)> = cost_matrix
            .outer_iter()
            .enumerate()
            .map(|(row, costs)| {
                let (col, cost) = costs.iter().enumerate().fold(
                    (0, f64::INFINITY),
                    |best, (j, &c)| if c < best.1 { (j, c) } else { best },
                );
                (row, col, cost)
            })
            .collect();
        proposals.sort_by(|a, b| a.2.total_cmp(&b.2));

        let mut used_rows = vec![false; num_rows];
        let mut used_cols = vec![false; num_cols];
        let mut matches = Vec::new();

        for (row, col, cost) in proposals {
            if used_rows[row] || used_cols[col] {
                continue;
            }
            if cost > max_cost {
                continue;
            }
            used_rows[row] = true;
            used_cols[col] = true;
            matches.push((row, col));
        }

        AssignmentResult::from_used(matches, &used_rows, &used_cols)
    }
}

/// Globally minimal total-cost assignment (Jonker-Volgenant).
#[derive(Debug, Clone, Copy, Default)]
pub struct MinCostAssociator;

impl Associator for MinCostAssociator {
    fn associate(&self, cost_matrix: &Array2<f64>, max_cost: f64) -> AssignmentResult {
        let (num_rows, num_cols) = cost_matrix.dim();
        if num_rows == 0 || num_cols == 0 {
            return AssignmentResult::unmatched(num_rows, num_cols);
        }

        let size = num_rows.max(num_cols);
        let mut padded = Array2::<f64>::from_elem((size, size), PADDING_COST);
        for i in 0..num_rows {
            for j in 0..num_cols {
                padded[[i, j]] = cost_matrix[[i, j]];
            }
        }

        let mut used_rows = vec![false; num_rows];
        let mut used_cols = vec![false; num_cols];
        let mut matches = vec![];

        if let Ok((row_to_col, _)) = lapjv::lapjv(&padded) {
            for (row, &col) in row_to_col.iter().enumerate().take(num_rows) {
                if col < num_cols && cost_matrix[[row, col]] <= max_cost {
                    used_rows[row] = true;
                    used_cols[col] = true;
                    matches.push((row, col));
                }
            }
        }

        AssignmentResult::from_used(matches, &used_rows, &used_cols)
    }
}

/// Selects the association strategy used by the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    #[default]
    Greedy,
    MinCost,
}

impl AssociationKind {
    pub fn build(self) -> Box<dyn Associator + Send + Sync> {
        match self {
            Self::Greedy => Box::new(GreedyAssociator),
            Self::MinCost => Box::new(MinCostAssociator),
        }
    }
}
