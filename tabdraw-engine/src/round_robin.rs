//! Round-robin draws - every team in a division meets every other in turn
//!
//! Level 2 - Phases
//!
//! Teams are grouped by division and ordered by name within each. The
//! division is folded in half and the fold is rotated once per round: the
//! first team stays put while the rest circulate, so over a full cycle of
//! rounds each pair of teams meets exactly once. Teams without a division
//! are left out of the draw.

use rand::RngCore;
use tabdraw_core::{Pairing, Participant, Result};

use crate::context::{allocate_sides, check_pair_attributes, DrawContext};
use crate::generator::{DrawGenerator, PriorResults};
use crate::options::RoundRobinConfig;
use crate::powerpair::Bracket;

/// Round-robin draw within divisions
#[derive(Clone, Debug, PartialEq)]
pub struct RoundRobinDrawGenerator {
    config: RoundRobinConfig,
}

impl RoundRobinDrawGenerator {
    pub fn new(config: RoundRobinConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoundRobinConfig {
        &self.config
    }
}

impl DrawGenerator for RoundRobinDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        2
    }

    fn requires_even_teams(&self) -> bool {
        false
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
        let divisions = make_division_brackets(teams);

        let mut room_rank = 1u32;
        let mut pairings = Vec::new();
        for division in &divisions {
            if division.teams.len() % 2 != 0 {
                tracing::warn!(
                    division = division.points,
                    teams = division.teams.len(),
                    "Division has an odd number of teams; one team sits this round out"
                );
            }
            for (upper, lower) in rotated_fold(&division.teams, self.config.round_seq) {
                pairings.push(Pairing::new(vec![upper, lower], division.points, room_rank));
                room_rank += 1;
            }
        }

        allocate_sides(&mut pairings, teams, self.config.base.side_allocations, rng);
        Ok(ctx.finish(pairings))
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// One bracket per division, in order of first appearance; teams sorted by name
///
/// The bracket's `points` holds the division id.
pub fn make_division_brackets(teams: &[Participant]) -> Vec<Bracket> {
    let excluded = teams.iter().filter(|t| t.division.is_none()).count();
    if excluded > 0 {
        tracing::info!(excluded, "Teams without a division are left out of the draw");
    }

    let mut brackets: Vec<Bracket> = Vec::new();
    for (i, team) in teams.iter().enumerate() {
        let Some(division) = team.division else {
            continue;
        };
        let key = division as f64;
        match brackets.iter_mut().find(|b| b.points == key) {
            Some(bracket) => bracket.teams.push(i),
            None => brackets.push(Bracket::new(key, vec![i])),
        }
    }

    for bracket in &mut brackets {
        bracket.teams.sort_by(|&a, &b| teams[a].name.cmp(&teams[b].name));
    }
    brackets
}

/// Pairs for round `round_seq` (from 1) of a division
///
/// Round 1 is a plain fold. Each later round moves the first team of the
/// bottom half to second place overall and the last team of the top half to
/// the end. With an odd division the last team of the fold is left unpaired.
pub(crate) fn rotated_fold(members: &[usize], round_seq: usize) -> Vec<(usize, usize)> {
    let half = members.len() / 2;
    if half == 0 {
        return Vec::new();
    }

    let mut folded: Vec<usize> = members[..half].to_vec();
    folded.extend(members[half..].iter().rev());

    for _ in 1..round_seq {
        let moved = folded.remove(half);
        folded.insert(1, moved);
        let moved = folded.remove(half);
        folded.push(moved);
    }

    folded[..half]
        .iter()
        .copied()
        .zip(folded[half..].iter().copied())
        .collect()
}
