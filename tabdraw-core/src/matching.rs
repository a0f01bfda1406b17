//! Minimum-cost perfect matching on a general graph
//!
//! Weighted blossom algorithm (Edmonds, in Galil's O(n^3) primal-dual form).
//! The solver itself maximises weight over maximum-cardinality matchings;
//! costs are flipped into weights so that, among perfect matchings, the
//! heaviest one is the cheapest. Costs are quantised to integers first so
//! the dual updates are exact.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: min_cost_perfect_matching (entry point)
//! - Level 2: Matcher::run (stages of augmentation)
//! - Level 3: labelling, blossom creation, expansion and augmentation
//! - Level 4: slack and leaf helpers

use crate::error::{DrawFatalError, Result};

/// Sentinel for "no vertex / edge / blossom"
const NONE: usize = usize::MAX;

/// Costs are compared after rounding to this resolution
const COST_SCALE: f64 = 1e6;

const FREE: u8 = 0;
const OUTER: u8 = 1;
const INNER: u8 = 2;
const BREADCRUMB: u8 = 4;

/// Pair every vertex with another at minimum total cost
///
/// # Arguments
/// * `costs` - symmetric square matrix; `costs[i][j]` is the cost of pairing
///   `i` with `j`, `None` where the pair is not allowed (always on the diagonal)
///
/// # Returns
/// Pairs `(i, j)` with `i < j`, ordered by `i`
pub fn min_cost_perfect_matching(costs: &[Vec<Option<f64>>]) -> Result<Vec<(usize, usize)>> {
    let n = costs.len();
    if let Some((row, r)) = costs.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(DrawFatalError::NonSquareCostMatrix {
            rows: n,
            columns: r.len(),
            row,
        }
        .into());
    }
    if n % 2 != 0 {
        return Err(DrawFatalError::NoPerfectMatching(n).into());
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut quantised = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if let Some(cost) = costs[i][j] {
                quantised.push((i, j, (cost * COST_SCALE).round() as i64));
            }
        }
    }
    let max_cost = quantised.iter().map(|&(_, _, c)| c).max().unwrap_or(0);
    let edges = quantised
        .into_iter()
        .map(|(i, j, c)| (i, j, max_cost + 1 - c))
        .collect();

    let mate = Matcher::new(n, edges).run()?;

    let mut pairs = Vec::with_capacity(n / 2);
    for (i, &j) in mate.iter().enumerate() {
        if j == NONE {
            return Err(DrawFatalError::NoPerfectMatching(n).into());
        }
        if i < j {
            pairs.push((i, j));
        }
    }
    Ok(pairs)
}

/// Total cost of a matching
pub fn matching_cost(costs: &[Vec<Option<f64>>], pairs: &[(usize, usize)]) -> f64 {
    pairs
        .iter()
        .map(|&(i, j)| costs[i][j].unwrap_or(f64::INFINITY))
        .sum()
}

// ============================================================================
// SOLVER STATE
// ============================================================================

/// Working state of the blossom algorithm
///
/// Vertices are `0..n`, non-trivial blossoms `n..2n`. Edge `k` has endpoints
/// `2k` and `2k + 1`; `endpoint[p]` is the vertex at endpoint `p`, and `p ^ 1`
/// is the opposite end.
struct Matcher {
    n: usize,
    edges: Vec<(usize, usize, i64)>,
    endpoint: Vec<usize>,
    /// Remote endpoints of the edges incident to each vertex
    neighbours: Vec<Vec<usize>>,
    /// Endpoint each vertex is matched through
    mate: Vec<usize>,
    label: Vec<u8>,
    label_end: Vec<usize>,
    in_blossom: Vec<usize>,
    blossom_parent: Vec<usize>,
    blossom_children: Vec<Vec<usize>>,
    blossom_base: Vec<usize>,
    blossom_endpoints: Vec<Vec<usize>>,
    best_edge: Vec<usize>,
    blossom_best_edges: Vec<Option<Vec<usize>>>,
    unused_blossoms: Vec<usize>,
    dual: Vec<i64>,
    allow_edge: Vec<bool>,
    queue: Vec<usize>,
}

impl Matcher {
    fn new(n: usize, edges: Vec<(usize, usize, i64)>) -> Self {
        let max_weight = edges.iter().map(|&(_, _, w)| w).max().unwrap_or(0).max(0);

        let mut endpoint = Vec::with_capacity(2 * edges.len());
        let mut neighbours = vec![Vec::new(); n];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            endpoint.push(i);
            endpoint.push(j);
            neighbours[i].push(2 * k + 1);
            neighbours[j].push(2 * k);
        }

        let mut blossom_base: Vec<usize> = (0..n).collect();
        blossom_base.resize(2 * n, NONE);
        let mut dual = vec![max_weight; n];
        dual.resize(2 * n, 0);

        Self {
            n,
            allow_edge: vec![false; edges.len()],
            edges,
            endpoint,
            neighbours,
            mate: vec![NONE; n],
            label: vec![FREE; 2 * n],
            label_end: vec![NONE; 2 * n],
            in_blossom: (0..n).collect(),
            blossom_parent: vec![NONE; 2 * n],
            blossom_children: vec![Vec::new(); 2 * n],
            blossom_base,
            blossom_endpoints: vec![Vec::new(); 2 * n],
            best_edge: vec![NONE; 2 * n],
            blossom_best_edges: vec![None; 2 * n],
            unused_blossoms: (n..2 * n).collect(),
            dual,
            queue: Vec::new(),
        }
    }

    // ========================================================================
    // LEVEL 2 - STAGES
    // ========================================================================

    /// Returns the mate of every vertex, `NONE` if unmatched
    fn run(mut self) -> Result<Vec<usize>> {
        let n = self.n;

        for _ in 0..n {
            self.label.fill(FREE);
            self.best_edge.fill(NONE);
            for b in n..2 * n {
                self.blossom_best_edges[b] = None;
            }
            self.allow_edge.fill(false);
            self.queue.clear();

            for v in 0..n {
                if self.mate[v] == NONE && self.label[self.in_blossom[v]] == FREE {
                    self.assign_label(v, OUTER, NONE);
                }
            }

            if !self.grow_until_augmented()? {
                break;
            }

            // Outer blossoms with zero dual are no longer useful
            for b in n..2 * n {
                if self.blossom_parent[b] == NONE
                    && self.blossom_base[b] != NONE
                    && self.label[b] == OUTER
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }

        Ok(self
            .mate
            .iter()
            .map(|&p| if p == NONE { NONE } else { self.endpoint[p] })
            .collect())
    }

    /// Alternate between scanning tight edges and dual updates; false once no
    /// augmenting path can be found
    fn grow_until_augmented(&mut self) -> Result<bool> {
        let n = self.n;
        loop {
            while let Some(v) = self.queue.pop() {
                if self.scan_vertex(v)? {
                    return Ok(true);
                }
            }

            let mut delta_type = 0u8;
            let mut delta = 0i64;
            let mut delta_edge = NONE;
            let mut delta_blossom = NONE;

            // Free vertex with an edge to an outer vertex
            for v in 0..n {
                if self.label[self.in_blossom[v]] == FREE && self.best_edge[v] != NONE {
                    let d = self.slack(self.best_edge[v]);
                    if delta_type == 0 || d < delta {
                        delta = d;
                        delta_type = 2;
                        delta_edge = self.best_edge[v];
                    }
                }
            }

            // Edge between two outer blossoms
            for b in 0..2 * n {
                if self.blossom_parent[b] == NONE && self.label[b] == OUTER && self.best_edge[b] != NONE {
                    let d = self.slack(self.best_edge[b]) / 2;
                    if delta_type == 0 || d < delta {
                        delta = d;
                        delta_type = 3;
                        delta_edge = self.best_edge[b];
                    }
                }
            }

            // Inner blossom whose dual reaches zero
            for b in n..2 * n {
                if self.blossom_base[b] != NONE
                    && self.blossom_parent[b] == NONE
                    && self.label[b] == INNER
                    && (delta_type == 0 || self.dual[b] < delta)
                {
                    delta = self.dual[b];
                    delta_type = 4;
                    delta_blossom = b;
                }
            }

            // Maximum cardinality reached
            if delta_type == 0 {
                delta_type = 1;
                delta = self.dual[..n].iter().copied().min().unwrap_or(0).max(0);
            }

            for v in 0..n {
                match self.label[self.in_blossom[v]] {
                    OUTER => self.dual[v] -= delta,
                    INNER => self.dual[v] += delta,
                    _ => {}
                }
            }
            for b in n..2 * n {
                if self.blossom_base[b] != NONE && self.blossom_parent[b] == NONE {
                    match self.label[b] {
                        OUTER => self.dual[b] += delta,
                        INNER => self.dual[b] -= delta,
                        _ => {}
                    }
                }
            }

            match delta_type {
                1 => return Ok(false),
                2 => {
                    self.allow_edge[delta_edge] = true;
                    let (i, j, _) = self.edges[delta_edge];
                    let outer = if self.label[self.in_blossom[i]] == FREE { j } else { i };
                    self.queue.push(outer);
                }
                3 => {
                    self.allow_edge[delta_edge] = true;
                    let (i, _, _) = self.edges[delta_edge];
                    self.queue.push(i);
                }
                _ => self.expand_blossom(delta_blossom, false),
            }
        }
    }

    /// Scan the edges of an outer vertex; true if the matching was augmented
    fn scan_vertex(&mut self, v: usize) -> Result<bool> {
        for idx in 0..self.neighbours[v].len() {
            let p = self.neighbours[v][idx];
            let k = p / 2;
            let w = self.endpoint[p];
            if self.in_blossom[v] == self.in_blossom[w] {
                continue;
            }

            let mut kslack = 0;
            if !self.allow_edge[k] {
                kslack = self.slack(k);
                if kslack <= 0 {
                    self.allow_edge[k] = true;
                }
            }

            if self.allow_edge[k] {
                match self.label[self.in_blossom[w]] {
                    FREE => self.assign_label(w, INNER, p ^ 1),
                    OUTER => {
                        let base = self.scan_blossom(v, w);
                        if base != NONE {
                            self.add_blossom(base, k)?;
                        } else {
                            self.augment_matching(k);
                            return Ok(true);
                        }
                    }
                    _ => {
                        if self.label[w] == FREE {
                            self.label[w] = INNER;
                            self.label_end[w] = p ^ 1;
                        }
                    }
                }
            } else if self.label[self.in_blossom[w]] == OUTER {
                let b = self.in_blossom[v];
                if self.best_edge[b] == NONE || kslack < self.slack(self.best_edge[b]) {
                    self.best_edge[b] = k;
                }
            } else if self.label[w] == FREE
                && (self.best_edge[w] == NONE || kslack < self.slack(self.best_edge[w]))
            {
                self.best_edge[w] = k;
            }
        }
        Ok(false)
    }

    // ========================================================================
    // LEVEL 3 - LABELS AND BLOSSOMS
    // ========================================================================

    fn assign_label(&mut self, w: usize, t: u8, p: usize) {
        let b = self.in_blossom[w];
        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = NONE;
        self.best_edge[b] = NONE;

        if t == OUTER {
            let leaves = self.leaves(b);
            self.queue.extend(leaves);
        } else if t == INNER {
            let base = self.blossom_base[b];
            let m = self.mate[base];
            let mate_vertex = self.endpoint[m];
            self.assign_label(mate_vertex, OUTER, m ^ 1);
        }
    }

    /// Trace back from `v` and `w` to find a new blossom's base, or `NONE`
    /// if the two trees are distinct (an augmenting path)
    fn scan_blossom(&mut self, mut v: usize, mut w: usize) -> usize {
        let mut path = Vec::new();
        let mut base = NONE;

        while v != NONE || w != NONE {
            let b = self.in_blossom[v];
            if self.label[b] & BREADCRUMB != 0 {
                base = self.blossom_base[b];
                break;
            }
            path.push(b);
            self.label[b] = OUTER | BREADCRUMB;

            if self.label_end[b] == NONE {
                v = NONE;
            } else {
                let t = self.endpoint[self.label_end[b]];
                let bt = self.in_blossom[t];
                v = self.endpoint[self.label_end[bt]];
            }
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }

        for b in path {
            self.label[b] = OUTER;
        }
        base
    }

    /// Contract the odd cycle closed by edge `k` into a new outer blossom
    fn add_blossom(&mut self, base: usize, k: usize) -> Result<()> {
        let n = self.n;
        let (mut v, mut w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];

        let b = self
            .unused_blossoms
            .pop()
            .ok_or(DrawFatalError::NoPerfectMatching(n))?;
        self.blossom_base[b] = base;
        self.blossom_parent[b] = NONE;
        self.blossom_parent[bb] = b;

        let mut path = Vec::new();
        let mut endps = Vec::new();
        while bv != bb {
            self.blossom_parent[bv] = b;
            path.push(bv);
            endps.push(self.label_end[bv]);
            v = self.endpoint[self.label_end[bv]];
            bv = self.in_blossom[v];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);
        while bw != bb {
            self.blossom_parent[bw] = b;
            path.push(bw);
            endps.push(self.label_end[bw] ^ 1);
            w = self.endpoint[self.label_end[bw]];
            bw = self.in_blossom[w];
        }

        self.label[b] = OUTER;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0;
        self.blossom_children[b] = path.clone();
        self.blossom_endpoints[b] = endps;

        for leaf in self.leaves(b) {
            if self.label[self.in_blossom[leaf]] == INNER {
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        // Least-slack edge from the new blossom to each neighbouring outer blossom
        let mut best_to = vec![NONE; 2 * n];
        for &child in &path {
            let lists: Vec<Vec<usize>> = match self.blossom_best_edges[child].take() {
                Some(list) => vec![list],
                None => self
                    .leaves(child)
                    .into_iter()
                    .map(|leaf| self.neighbours[leaf].iter().map(|p| p / 2).collect())
                    .collect(),
            };
            for list in lists {
                for k in list {
                    let (i, j, _) = self.edges[k];
                    let j = if self.in_blossom[j] == b { i } else { j };
                    let bj = self.in_blossom[j];
                    if bj != b
                        && self.label[bj] == OUTER
                        && (best_to[bj] == NONE || self.slack(k) < self.slack(best_to[bj]))
                    {
                        best_to[bj] = k;
                    }
                }
            }
            self.best_edge[child] = NONE;
        }

        let best: Vec<usize> = best_to.into_iter().filter(|&k| k != NONE).collect();
        self.best_edge[b] = NONE;
        for &k in &best {
            if self.best_edge[b] == NONE || self.slack(k) < self.slack(self.best_edge[b]) {
                self.best_edge[b] = k;
            }
        }
        self.blossom_best_edges[b] = Some(best);
        Ok(())
    }

    /// Dissolve a blossom back into its children
    fn expand_blossom(&mut self, b: usize, end_stage: bool) {
        let n = self.n;
        let children = self.blossom_children[b].clone();
        for &s in &children {
            self.blossom_parent[s] = NONE;
            if s < n {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0 {
                self.expand_blossom(s, end_stage);
            } else {
                for leaf in self.leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        // An inner blossom expanded mid-stage: relabel the path through it
        if !end_stage && self.label[b] == INNER {
            let entry = self.in_blossom[self.endpoint[self.label_end[b] ^ 1]];
            let len = children.len() as isize;
            let mut j = children.iter().position(|&c| c == entry).unwrap_or(0) as isize;
            let (step, trick): (isize, usize) = if j & 1 == 1 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };

            let mut p = self.label_end[b];
            while j != 0 {
                let end = cyclic(&self.blossom_endpoints[b], j - trick as isize);
                let vertex = self.endpoint[p ^ 1];
                self.label[vertex] = FREE;
                self.label[self.endpoint[end ^ trick ^ 1]] = FREE;
                self.assign_label(vertex, INNER, p);
                self.allow_edge[end / 2] = true;
                j += step;
                p = cyclic(&self.blossom_endpoints[b], j - trick as isize) ^ trick;
                self.allow_edge[p / 2] = true;
                j += step;
            }

            let bv = cyclic(&children, j);
            let vertex = self.endpoint[p ^ 1];
            self.label[vertex] = INNER;
            self.label[bv] = INNER;
            self.label_end[vertex] = p;
            self.label_end[bv] = p;
            self.best_edge[bv] = NONE;
            j += step;

            while cyclic(&children, j) != entry {
                let bv = cyclic(&children, j);
                j += step;
                if self.label[bv] == OUTER {
                    continue;
                }
                let labelled = self.leaves(bv).into_iter().find(|&leaf| self.label[leaf] != FREE);
                if let Some(leaf) = labelled {
                    self.label[leaf] = FREE;
                    let mate_vertex = self.endpoint[self.mate[self.blossom_base[bv]]];
                    self.label[mate_vertex] = FREE;
                    let end = self.label_end[leaf];
                    self.assign_label(leaf, INNER, end);
                }
            }
        }

        self.label[b] = FREE;
        self.label_end[b] = NONE;
        self.blossom_children[b].clear();
        self.blossom_endpoints[b].clear();
        self.blossom_base[b] = NONE;
        self.blossom_best_edges[b] = None;
        self.best_edge[b] = NONE;
        self.unused_blossoms.push(b);
    }

    /// Flip matched and unmatched edges along the even path from `v` to the base
    fn augment_blossom(&mut self, b: usize, v: usize) {
        let n = self.n;
        let mut t = v;
        while self.blossom_parent[t] != b {
            t = self.blossom_parent[t];
        }
        if t >= n {
            self.augment_blossom(t, v);
        }

        let len = self.blossom_children[b].len() as isize;
        let i = self.blossom_children[b].iter().position(|&c| c == t).unwrap_or(0);
        let mut j = i as isize;
        let (step, trick): (isize, usize) = if i & 1 == 1 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += step;
            let t = cyclic(&self.blossom_children[b], j);
            let p = cyclic(&self.blossom_endpoints[b], j - trick as isize) ^ trick;
            if t >= n {
                self.augment_blossom(t, self.endpoint[p]);
            }
            j += step;
            let t = cyclic(&self.blossom_children[b], j);
            if t >= n {
                self.augment_blossom(t, self.endpoint[p ^ 1]);
            }
            self.mate[self.endpoint[p]] = p ^ 1;
            self.mate[self.endpoint[p ^ 1]] = p;
        }

        self.blossom_children[b].rotate_left(i);
        self.blossom_endpoints[b].rotate_left(i);
        self.blossom_base[b] = self.blossom_base[self.blossom_children[b][0]];
    }

    /// Augment along the path through edge `k` joining two outer trees
    fn augment_matching(&mut self, k: usize) {
        let n = self.n;
        let (v, w, _) = self.edges[k];
        for (mut s, mut p) in [(v, 2 * k + 1), (w, 2 * k)] {
            loop {
                let bs = self.in_blossom[s];
                if bs >= n {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;
                if self.label_end[bs] == NONE {
                    break;
                }
                let t = self.endpoint[self.label_end[bs]];
                let bt = self.in_blossom[t];
                s = self.endpoint[self.label_end[bt]];
                let j = self.endpoint[self.label_end[bt] ^ 1];
                if bt >= n {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.label_end[bt];
                p = self.label_end[bt] ^ 1;
            }
        }
    }

    // ========================================================================
    // LEVEL 4 - HELPERS
    // ========================================================================

    /// Twice the reduced cost of edge `k`
    fn slack(&self, k: usize) -> i64 {
        let (i, j, w) = self.edges[k];
        self.dual[i] + self.dual[j] - 2 * w
    }

    /// Vertices contained in blossom `b`
    fn leaves(&self, b: usize) -> Vec<usize> {
        if b < self.n {
            return vec![b];
        }
        let mut out = Vec::new();
        for &child in &self.blossom_children[b] {
            if child < self.n {
                out.push(child);
            } else {
                out.extend(self.leaves(child));
            }
        }
        out
    }
}

/// Index a blossom's child list, wrapping negative positions from the end
fn cyclic(list: &[usize], j: isize) -> usize {
    list[j.rem_euclid(list.len() as isize) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn complete(n: usize, cost: impl Fn(usize, usize) -> f64) -> Vec<Vec<Option<f64>>> {
        (0..n)
            .map(|i| (0..n).map(|j| (i != j).then(|| cost(i.min(j), i.max(j)))).collect())
            .collect()
    }

    /// Cheapest perfect matching by exhaustive search
    fn brute_force(costs: &[Vec<Option<f64>>], free: &mut Vec<usize>) -> f64 {
        if free.is_empty() {
            return 0.0;
        }
        let first = free.remove(0);
        let mut best = f64::INFINITY;
        for idx in 0..free.len() {
            let partner = free.remove(idx);
            if let Some(cost) = costs[first][partner] {
                best = best.min(cost + brute_force(costs, free));
            }
            free.insert(idx, partner);
        }
        free.insert(0, first);
        best
    }

    fn assert_perfect(n: usize, pairs: &[(usize, usize)]) {
        let mut seen: Vec<usize> = pairs.iter().flat_map(|&(i, j)| [i, j]).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
        assert!(pairs.iter().all(|&(i, j)| i < j));
    }

    #[test]
    fn test_four_vertices() {
        let costs = complete(4, |i, j| match (i, j) {
            (0, 1) | (2, 3) => 10.0,
            (0, 2) | (1, 3) => 1.0,
            _ => 5.0,
        });
        let pairs = min_cost_perfect_matching(&costs).unwrap();
        assert_eq!(pairs, vec![(0, 2), (1, 3)]);
        assert_eq!(matching_cost(&costs, &pairs), 2.0);
    }

    #[test]
    fn test_odd_cycle_needs_blossom() {
        // 0-1-2 is a cheap triangle; the optimum must break it
        let costs = complete(6, |i, j| match (i, j) {
            (0, 1) | (1, 2) | (0, 2) => 0.0,
            (2, 3) => 1.0,
            (4, 5) => 1.0,
            (3, 4) => 0.0,
            _ => 8.0,
        });
        let pairs = min_cost_perfect_matching(&costs).unwrap();
        assert_perfect(6, &pairs);
        let mut free: Vec<usize> = (0..6).collect();
        assert_eq!(matching_cost(&costs, &pairs), brute_force(&costs, &mut free));
    }

    #[test]
    fn test_matches_exhaustive_search() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for trial in 0..200 {
            let n = 2 * rng.gen_range(1..=5);
            let table: Vec<Vec<f64>> = (0..n)
                .map(|_| (0..n).map(|_| rng.gen_range(0..12) as f64).collect())
                .collect();
            let costs = complete(n, |i, j| table[i][j]);

            let pairs = min_cost_perfect_matching(&costs).unwrap();
            assert_perfect(n, &pairs);
            let mut free: Vec<usize> = (0..n).collect();
            assert_eq!(
                matching_cost(&costs, &pairs),
                brute_force(&costs, &mut free),
                "trial {}",
                trial
            );
        }
    }

    #[test]
    fn test_fractional_costs() {
        let costs = complete(4, |i, j| match (i, j) {
            (0, 1) | (2, 3) => 0.25,
            (0, 2) | (1, 3) => 0.2,
            _ => 0.3,
        });
        let pairs = min_cost_perfect_matching(&costs).unwrap();
        assert_eq!(pairs, vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn test_disallowed_edges_respected() {
        // 0 may only pair with 3
        let mut costs = complete(4, |_, _| 0.0);
        costs[0][1] = None;
        costs[1][0] = None;
        costs[0][2] = None;
        costs[2][0] = None;
        let pairs = min_cost_perfect_matching(&costs).unwrap();
        assert_eq!(pairs, vec![(0, 3), (1, 2)]);
    }

    #[test]
    fn test_infeasible_and_degenerate() {
        assert!(min_cost_perfect_matching(&[]).unwrap().is_empty());
        assert!(min_cost_perfect_matching(&complete(3, |_, _| 1.0)).unwrap_err().is_fatal());

        let mut costs = complete(4, |_, _| 1.0);
        for j in 1..4 {
            costs[0][j] = None;
            costs[j][0] = None;
        }
        assert!(min_cost_perfect_matching(&costs).unwrap_err().is_fatal());
    }
}
