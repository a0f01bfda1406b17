//! Random draws - two-team (optionally with preallocated sides), BP and polyformats
//!
//! Level 2 - Phases
//!
//! Conflict avoidance for random draws is either a bounded local search or a
//! graph pairing. The local search has each conflicted room try swapping its
//! negative team with a random other room, keeping a swap only if it improves
//! things without breaking the other room. Graph pairing shuffles the teams
//! and then takes the cheapest matching over the whole field.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tabdraw_core::{DrawFlag, DrawUserError, Pairing, Participant, Result, Side};

use crate::context::{allocate_sides, check_pair_attributes, DrawContext, RoomConflicts};
use crate::generator::{DrawGenerator, PriorResults};
use crate::graph::{graph_pairings, graph_sided_pairings};
use crate::options::{ConflictAvoidance, PairOptions, RandomConfig, SideAllocation};
use crate::powerpair::Bracket;
use crate::powerpair_sided::SidedBracket;

/// Random two-team draw
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDrawGenerator {
    config: RandomConfig,
}

impl RandomDrawGenerator {
    pub fn new(config: RandomConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RandomConfig {
        &self.config
    }
}

impl DrawGenerator for RandomDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        2
    }

    fn check_teams(&self, teams: &[Participant]) -> Result<()> {
        check_pair_attributes(teams, &self.config.base)
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        _results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        let ctx = DrawContext::new(teams);
        let sided = self.config.base.side_allocations == SideAllocation::Preallocated;
        let mut pairings = match self.config.avoid_conflicts {
            ConflictAvoidance::Graph if sided => {
                let (mut aff, mut neg) = split_by_side(teams)?;
                aff.shuffle(rng);
                neg.shuffle(rng);
                let bracket = SidedBracket::new(0.0, aff, neg);
                graph_sided_pairings(vec![bracket], teams, &self.config.base)?.concat()
            }
            ConflictAvoidance::Graph => {
                let mut order: Vec<usize> = (0..teams.len()).collect();
                order.shuffle(rng);
                graph_pairings(vec![Bracket::new(0.0, order)], teams, &self.config.base)?.concat()
            }
            ConflictAvoidance::OneUpOneDown | ConflictAvoidance::Off => {
                let mut pairings = if sided {
                    make_sided_random_pairings(teams, rng)?
                } else {
                    make_random_pairings(teams.len(), 2, rng)
                };
                if self.config.avoid_conflicts == ConflictAvoidance::OneUpOneDown {
                    avoid_conflicts(&mut pairings, teams, &self.config, rng);
                }
                pairings
            }
        };
        allocate_sides(&mut pairings, teams, self.config.base.side_allocations, rng);

        Ok(ctx.finish(pairings))
    }
}

/// Random BP draw
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RandomBpDrawGenerator;

impl DrawGenerator for RandomBpDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        4
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        _results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        let ctx = DrawContext::new(teams);
        Ok(ctx.finish(make_random_pairings(teams.len(), 4, rng)))
    }
}

/// Random draw for formats with any fixed number of teams per room
///
/// Positions within a room are left as shuffled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomPolyDrawGenerator {
    teams_per_debate: usize,
}

impl RandomPolyDrawGenerator {
    pub fn new(teams_per_debate: usize) -> Self {
        Self { teams_per_debate }
    }
}

impl DrawGenerator for RandomPolyDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        self.teams_per_debate
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        _results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        let ctx = DrawContext::new(teams);
        Ok(ctx.finish(make_random_pairings(teams.len(), self.teams_per_debate, rng)))
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Shuffle all teams and cut them into rooms, ranked from 1
pub(crate) fn make_random_pairings<R: Rng + ?Sized>(
    nteams: usize,
    per_debate: usize,
    rng: &mut R,
) -> Vec<Pairing<usize>> {
    let mut order: Vec<usize> = (0..nteams).collect();
    order.shuffle(rng);
    order
        .chunks(per_debate)
        .enumerate()
        .map(|(i, room)| Pairing::new(room.to_vec(), 0.0, i as u32 + 1))
        .collect()
}

/// Participant indices on each allocated side; the two sides must be the same size
fn split_by_side(teams: &[Participant]) -> Result<(Vec<usize>, Vec<usize>)> {
    let aff: Vec<usize> = (0..teams.len())
        .filter(|&i| teams[i].allocated_side == Some(Side::Aff))
        .collect();
    let neg: Vec<usize> = (0..teams.len())
        .filter(|&i| teams[i].allocated_side == Some(Side::Neg))
        .collect();
    if aff.len() != neg.len() {
        return Err(DrawUserError::SideCountMismatch {
            aff: aff.len(),
            neg: neg.len(),
        }
        .into());
    }
    Ok((aff, neg))
}

/// Shuffle affirmative and negative teams separately and match them up
fn make_sided_random_pairings<R: Rng + ?Sized>(
    teams: &[Participant],
    rng: &mut R,
) -> Result<Vec<Pairing<usize>>> {
    let (mut aff, mut neg) = split_by_side(teams)?;
    aff.shuffle(rng);
    neg.shuffle(rng);
    Ok(aff
        .into_iter()
        .zip(neg)
        .enumerate()
        .map(|(i, (a, n))| Pairing::new(vec![a, n], 0.0, i as u32 + 1))
        .collect())
}

/// Swap negative teams between rooms until conflicts clear or attempts run out
fn avoid_conflicts<R: Rng + ?Sized>(
    pairings: &mut [Pairing<usize>],
    teams: &[Participant],
    config: &RandomConfig,
    rng: &mut R,
) {
    let base = &config.base;
    if !(base.avoid_history || base.avoid_institution) || pairings.len() < 2 {
        return;
    }

    let mut flagged = 0usize;
    for i in 0..pairings.len() {
        if badness(&pairings[i], teams, base) <= 0.0 {
            continue;
        }

        let mut resolved = false;
        for _ in 0..config.max_swap_attempts {
            let j = rng.gen_range(0..pairings.len());
            if j == i {
                continue;
            }

            let before = badness(&pairings[i], teams, base) + badness(&pairings[j], teams, base);
            swap_negatives(pairings, i, j);
            let after = badness(&pairings[i], teams, base) + badness(&pairings[j], teams, base);

            if after == 0.0 {
                resolved = true;
                break;
            } else if after >= before || badness(&pairings[j], teams, base) > 0.0 {
                swap_negatives(pairings, i, j);
            }
        }

        if !resolved {
            pairings[i].add_flag(DrawFlag::MaxSwapped);
            flagged += 1;
        }
    }

    if flagged > 0 {
        tracing::debug!(flagged, "Random draw left conflicted rooms after swapping");
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn swap_negatives(pairings: &mut [Pairing<usize>], i: usize, j: usize) {
    let neg_i = pairings[i].teams[1];
    pairings[i].teams[1] = pairings[j].teams[1];
    pairings[j].teams[1] = neg_i;
}

fn badness(pairing: &Pairing<usize>, teams: &[Participant], base: &PairOptions) -> f64 {
    let mut score = 0.0;
    if base.avoid_history {
        score += pairing.conflict_hist(teams) as f64 * base.history_penalty;
    }
    if base.avoid_institution && pairing.conflict_inst(teams) {
        score += base.institution_penalty;
    }
    score
}
