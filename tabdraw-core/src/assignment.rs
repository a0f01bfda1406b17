//! Minimum-cost perfect assignment (Hungarian method)
//!
//! Dense O(n^3) shortest-augmenting-path implementation with row and column
//! potentials. Cells may be disallowed; an instance with no perfect
//! assignment over the allowed cells is reported as an error.

use crate::error::{DrawFatalError, Result};

/// Square cost matrix; `None` marks a disallowed cell
pub type CostMatrix = Vec<Vec<Option<f64>>>;

/// Solve a square assignment problem
///
/// # Arguments
/// * `costs` - `costs[row][column]`, `None` where the pair is not allowed
///
/// # Returns
/// `assignment[row] = column` minimising the total cost
pub fn solve_assignment(costs: &[Vec<Option<f64>>]) -> Result<Vec<usize>> {
    let n = costs.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if let Some((row, r)) = costs.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(DrawFatalError::NonSquareCostMatrix {
            rows: n,
            columns: r.len(),
            row,
        }
        .into());
    }

    let inf = f64::INFINITY;
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                if let Some(cost) = costs[i0 - 1][j - 1] {
                    let cur = cost - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            // No allowed cell reachable from the current tree
            if j1 == 0 {
                return Err(DrawFatalError::InfeasibleAssignment(n).into());
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    Ok(assignment)
}

/// Total cost of an assignment (disallowed cells count as infinite)
pub fn assignment_cost(costs: &[Vec<Option<f64>>], assignment: &[usize]) -> f64 {
    assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| costs[row][col].unwrap_or(f64::INFINITY))
        .sum()
}
