//! One-up-one-down swap optimiser
//!
//! Given a bracket of two-team debates in rank order, decide which adjacent
//! debates should exchange their lower-side teams to reduce history and
//! institution conflicts. Swaps may not overlap, so the choice is a
//! maximum-weight selection of non-adjacent swap positions, solved by
//! dynamic programming.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: SwapOptimizer::run (orchestration)
//! - Level 2: score every adjacent swap, select the best non-adjacent set
//! - Level 3: score_swap, best_nonadjacent_selection
//! - Level 4: badness helpers

use serde::{Deserialize, Serialize};

use crate::participant::Participant;

/// Score given to swaps that must never be chosen
pub const EXCLUDE_PENALTY: f64 = -1e10;

/// Small cost charged for every swap so that useless swaps are never made
const SWAP_COST: f64 = 1e-3;

/// Bonus per position so that, between equal swaps, the higher one wins
const POSITION_BONUS: f64 = 1e-6;

/// Outcome of one optimiser run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// Sum of the chosen swap scores
    pub score: f64,
    /// Positions `i` where debates `i` and `i + 1` exchanged lower teams
    pub swaps: Vec<usize>,
}

/// Conflict-driven swap optimiser for one bracket
#[derive(Clone, Debug, PartialEq)]
pub struct SwapOptimizer {
    pub avoid_history: bool,
    pub avoid_institution: bool,
    pub history_penalty: f64,
    pub institution_penalty: f64,
}

impl Default for SwapOptimizer {
    fn default() -> Self {
        Self::new(true, true, 1e3, 1.0)
    }
}

impl SwapOptimizer {
    /// Create an optimiser. A penalty whose `avoid_*` switch is off is ignored.
    pub fn new(
        avoid_history: bool,
        avoid_institution: bool,
        history_penalty: f64,
        institution_penalty: f64,
    ) -> Self {
        Self {
            avoid_history,
            avoid_institution,
            history_penalty: if avoid_history { history_penalty } else { 0.0 },
            institution_penalty: if avoid_institution {
                institution_penalty
            } else {
                0.0
            },
        }
    }

    // ========================================================================
    // LEVEL 1 - ORCHESTRATION
    // ========================================================================

    /// Rewrite `draw` in place, applying the best set of non-overlapping swaps
    ///
    /// # Arguments
    /// * `teams` - participant table the indices in `draw` refer to
    /// * `draw` - (upper, lower) index pairs in room order
    ///
    /// # Returns
    /// The chosen swaps and their total score
    pub fn run(&self, teams: &[Participant], draw: &mut [(usize, usize)]) -> SwapOutcome {
        if draw.len() < 2 {
            return SwapOutcome {
                score: 0.0,
                swaps: Vec::new(),
            };
        }

        let n = draw.len() - 1;
        let scores: Vec<f64> = (0..n)
            .map(|i| {
                let score = self.score_swap(teams, draw[i], draw[i + 1]);
                if score > 0.0 {
                    score + (n - i) as f64 * POSITION_BONUS
                } else {
                    score
                }
            })
            .collect();

        let (score, swaps) = best_nonadjacent_selection(&scores);

        for &i in &swaps {
            let (upper_a, upper_n) = draw[i];
            let (lower_a, lower_n) = draw[i + 1];
            draw[i] = (upper_a, lower_n);
            draw[i + 1] = (lower_a, upper_n);
        }

        SwapOutcome { score, swaps }
    }

    // ========================================================================
    // LEVEL 3 - STEPS
    // ========================================================================

    /// Improvement gained by exchanging the lower teams of two adjacent debates
    pub fn score_swap(
        &self,
        teams: &[Participant],
        upper: (usize, usize),
        lower: (usize, usize),
    ) -> f64 {
        let (a1, n1) = (&teams[upper.0], &teams[upper.1]);
        let (a2, n2) = (&teams[lower.0], &teams[lower.1]);

        let inst = [a1.same_institution(n1), a2.same_institution(n2)];
        let hist = [a1.seen(n1), a2.seen(n2)];
        let inst_swap = [a1.same_institution(n2), a2.same_institution(n1)];
        let hist_swap = [a1.seen(n2), a2.seen(n1)];

        let has_inst_conflict = inst.iter().any(|&c| c);
        let hist_total: u32 = hist.iter().sum();

        // Nothing to fix in either debate
        if !(has_inst_conflict && self.avoid_institution) && (hist_total == 0 && self.avoid_history) {
            return EXCLUDE_PENALTY;
        }

        if self.avoid_history && hist_swap.iter().sum::<u32>() > hist_total {
            return EXCLUDE_PENALTY;
        }

        self.badness(&inst, &hist) - self.badness(&inst_swap, &hist_swap) - SWAP_COST
    }

    // ========================================================================
    // LEVEL 4 - UTILITIES
    // ========================================================================

    fn badness(&self, inst: &[bool; 2], hist: &[u32; 2]) -> f64 {
        let inst_count = inst.iter().filter(|&&c| c).count() as f64;
        let hist_count: u32 = hist.iter().sum();
        inst_count * self.institution_penalty + hist_count as f64 * self.history_penalty
    }
}

/// Maximum-sum selection of pairwise non-adjacent positions
///
/// Positive entries are the only ones worth selecting; ties are resolved
/// towards skipping, which favours fewer swaps.
///
/// # Returns
/// The best sum and the selected positions in ascending order
pub fn best_nonadjacent_selection(data: &[f64]) -> (f64, Vec<usize>) {
    let n = data.len() + 1;
    let mut state = vec![0.0f64; n + 1];
    let mut take = vec![false; n + 1];

    for i in 2..=n {
        let with = state[i - 2] + data[i - 2];
        if with > state[i - 1] {
            take[i] = true;
            state[i] = with;
        } else {
            state[i] = state[i - 1];
        }
    }

    let mut selected = Vec::new();
    let mut j = n;
    while j >= 2 {
        if take[j] {
            selected.push(j - 2);
            j -= 2;
        } else {
            j -= 1;
        }
    }
    selected.reverse();

    (state[n], selected)
}
