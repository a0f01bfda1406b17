//! Power-paired two-team draws
//!
//! Teams are grouped into brackets by points, odd brackets are evened out,
//! teams within each bracket are paired, and one-up-one-down swaps remove
//! what conflicts it can.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: PowerPairedDrawGenerator::make_draw (orchestration)
//! - Level 2: make_raw_brackets, resolve_odd_brackets, generate_pairings, one_up_one_down
//! - Level 3: pull-ups, intermediate brackets, bubble up/down, pairing methods
//! - Level 4: pull-up eligibility and conflict helpers

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tabdraw_core::{
    DrawFatalError, DrawFlag, DrawUserError, Pairing, Participant, Result, SwapOptimizer,
};

use crate::context::{
    allocate_sides, check_attribute, check_pair_attributes, check_sorted_by_points, DrawContext,
    RoomConflicts,
};
use crate::generator::{DrawGenerator, PriorResults};
use crate::graph::graph_pairings;
use crate::options::{
    Choice, ConflictAvoidance, OddBracket, PairingMethod, PowerPairConfig, PullupRestriction,
};

/// Teams sharing (or placed at) one points level
#[derive(Clone, Debug, PartialEq)]
pub struct Bracket {
    pub points: f64,
    /// Participant indices in standings order
    pub teams: Vec<usize>,
}

impl Bracket {
    pub fn new(points: f64, teams: Vec<usize>) -> Self {
        Self { points, teams }
    }
}

/// Power-paired draw with free side allocation
#[derive(Clone, Debug, PartialEq)]
pub struct PowerPairedDrawGenerator {
    config: PowerPairConfig,
}

impl PowerPairedDrawGenerator {
    pub fn new(config: PowerPairConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PowerPairConfig {
        &self.config
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

impl DrawGenerator for PowerPairedDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        2
    }

    fn check_teams(&self, teams: &[Participant]) -> Result<()> {
        check_pair_attributes(teams, &self.config.base)?;
        check_sorted_by_points(teams)?;

        if self.config.odd_bracket.is_intermediate() {
            let noninteger = teams.iter().filter(|t| !t.has_integer_points()).count();
            if noninteger > 0 {
                return Err(DrawUserError::NonIntegerPoints {
                    noninteger,
                    total: teams.len(),
                }
                .into());
            }
        }

        match self.config.pullup_restriction {
            PullupRestriction::None => Ok(()),
            PullupRestriction::LeastToDate => check_attribute(teams, "npullups", |t| t.npullups.is_some()),
            PullupRestriction::LowestDsWins => {
                check_attribute(teams, "draw_strength", |t| t.draw_strength.is_some())
            }
            PullupRestriction::LowestDsSpeaks => {
                check_attribute(teams, "draw_strength_speaks", |t| t.draw_strength_speaks.is_some())
            }
        }
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        _results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        tracing::debug!(
            odd_bracket = self.config.odd_bracket.name(),
            pairing_method = self.config.pairing_method.name(),
            "Power-pairing"
        );
        let mut ctx = DrawContext::new(teams);

        let mut brackets = make_raw_brackets(teams);
        resolve_odd_brackets(&mut brackets, &mut ctx, &self.config, rng)?;

        let mut by_bracket = match self.config.avoid_conflicts {
            ConflictAvoidance::Graph => graph_pairings(brackets, teams, &self.config.base)?,
            ConflictAvoidance::OneUpOneDown | ConflictAvoidance::Off => {
                generate_pairings(brackets, self.config.pairing_method, rng)
            }
        };
        if self.config.avoid_conflicts == ConflictAvoidance::OneUpOneDown {
            one_up_one_down(&mut by_bracket, teams, &self.config.base.optimizer());
        }

        let mut pairings: Vec<Pairing<usize>> = by_bracket.into_iter().flatten().collect();
        allocate_sides(&mut pairings, teams, self.config.base.side_allocations, rng);

        Ok(ctx.finish(pairings))
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Group consecutive teams with equal points, highest first
pub fn make_raw_brackets(teams: &[Participant]) -> Vec<Bracket> {
    let mut brackets: Vec<Bracket> = Vec::new();
    for (i, team) in teams.iter().enumerate() {
        match brackets.last_mut() {
            Some(bracket) if bracket.points == team.points => bracket.teams.push(i),
            _ => brackets.push(Bracket::new(team.points, vec![i])),
        }
    }
    brackets
}

/// Make every bracket even, using the configured strategy
pub(crate) fn resolve_odd_brackets<R: Rng + ?Sized>(
    brackets: &mut Vec<Bracket>,
    ctx: &mut DrawContext<'_>,
    config: &PowerPairConfig,
    rng: &mut R,
) -> Result<()> {
    let restriction = config.pullup_restriction;
    match config.odd_bracket {
        OddBracket::PullupTop => pullup(brackets, ctx, restriction, |_| 0),
        OddBracket::PullupBottom => pullup(brackets, ctx, restriction, |len| len - 1),
        OddBracket::PullupMiddle => pullup(brackets, ctx, restriction, |len| {
            if len % 2 == 0 {
                len / 2 - rng.gen_range(0..2usize)
            } else {
                len / 2
            }
        }),
        OddBracket::PullupRandom => pullup(brackets, ctx, restriction, |len| rng.gen_range(0..len)),
        OddBracket::Intermediate => intermediate_brackets(brackets),
        OddBracket::IntermediateBubbleUpDown => {
            intermediate_brackets(brackets)?;
            bubble_up_down(brackets, ctx);
            Ok(())
        }
    }
}

/// Pair teams within each bracket; room ranks run across brackets from 1
pub(crate) fn generate_pairings<R: Rng + ?Sized>(
    brackets: Vec<Bracket>,
    method: PairingMethod,
    rng: &mut R,
) -> Vec<Vec<Pairing<usize>>> {
    let mut room_rank = 1u32;
    let mut out = Vec::with_capacity(brackets.len());

    for (i, mut bracket) in brackets.into_iter().enumerate() {
        let method = match method {
            PairingMethod::FoldTopAdjacentRest if i == 0 => PairingMethod::Fold,
            PairingMethod::FoldTopAdjacentRest => PairingMethod::Adjacent,
            other => other,
        };
        let (top, bottom) = split_for_pairing(&mut bracket.teams, method, rng);

        let pairings = top
            .into_iter()
            .zip(bottom)
            .map(|(upper, lower)| {
                let pairing = Pairing::new(vec![upper, lower], bracket.points, room_rank);
                room_rank += 1;
                pairing
            })
            .collect();
        out.push(pairings);
    }
    out
}

/// Run the swap optimiser over each bracket and flag the rooms it changed
pub(crate) fn one_up_one_down(
    by_bracket: &mut [Vec<Pairing<usize>>],
    teams: &[Participant],
    optimizer: &SwapOptimizer,
) {
    for bracket in by_bracket.iter_mut() {
        let original: Vec<(usize, usize)> = bracket.iter().map(|p| (p.teams[0], p.teams[1])).collect();
        let mut swapped = original.clone();
        let outcome = optimizer.run(teams, &mut swapped);
        if outcome.swaps.is_empty() {
            continue;
        }
        tracing::debug!(swaps = ?outcome.swaps, score = outcome.score, "One-up-one-down swaps");

        for (pairing, (before, after)) in bracket.iter_mut().zip(original.iter().zip(&swapped)) {
            if before == after {
                continue;
            }
            let hist = pairing.conflict_hist(teams) > 0;
            let inst = pairing.conflict_inst(teams);
            if hist {
                pairing.add_flag(DrawFlag::OneUpOneDownHistory);
            }
            if inst {
                pairing.add_flag(DrawFlag::OneUpOneDownInstitution);
            }
            if !hist && !inst {
                pairing.add_flag(DrawFlag::OneUpOneDownOther);
            }
            pairing.teams = vec![after.0, after.1];
        }
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Pull one team up from the next bracket into each odd bracket
///
/// `pick(len)` chooses a position among the eligible teams of the lower bracket.
fn pullup(
    brackets: &mut [Bracket],
    ctx: &mut DrawContext<'_>,
    restriction: PullupRestriction,
    mut pick: impl FnMut(usize) -> usize,
) -> Result<()> {
    let mut needs_pullup: Option<usize> = None;

    for b in 0..brackets.len() {
        if let Some(target) = needs_pullup.take() {
            let eligible = pullup_candidates(&brackets[b].teams, ctx.teams, restriction);
            if eligible.is_empty() {
                return Err(DrawFatalError::OddLastBracket(brackets[target].points).into());
            }
            let choice = eligible[pick(eligible.len()).min(eligible.len() - 1)];

            if let Some(pos) = brackets[b].teams.iter().position(|&t| t == choice) {
                brackets[b].teams.remove(pos);
            }
            ctx.flag_team(choice, DrawFlag::Pullup);
            brackets[target].teams.push(choice);
        }

        if brackets[b].teams.len() % 2 != 0 {
            needs_pullup = Some(b);
        }
    }

    match needs_pullup {
        Some(b) => Err(DrawFatalError::OddLastBracket(brackets[b].points).into()),
        None => Ok(()),
    }
}

/// Move each odd bracket's bottom team into a half-point bracket with the
/// top team of the bracket below
fn intermediate_brackets(brackets: &mut Vec<Bracket>) -> Result<()> {
    let mut resolved: Vec<Bracket> = Vec::with_capacity(brackets.len() * 2);
    let mut odd_team: Option<(usize, f64)> = None;

    for mut bracket in brackets.drain(..) {
        if let Some((team, _)) = odd_team.take() {
            if bracket.teams.is_empty() {
                odd_team = Some((team, bracket.points));
            } else {
                let top = bracket.teams.remove(0);
                resolved.push(Bracket::new(bracket.points + 0.5, vec![team, top]));
            }
        }

        if bracket.teams.len() % 2 != 0 {
            let bottom = bracket.teams.pop().map(|t| (t, bracket.points));
            odd_team = bottom;
        }

        if !bracket.teams.is_empty() {
            resolved.push(bracket);
        }
    }

    if let Some((_, points)) = odd_team {
        return Err(DrawFatalError::OddLastBracket(points).into());
    }
    *brackets = resolved;
    Ok(())
}

/// Swap conflicted intermediate-bracket teams with neighbouring brackets
fn bubble_up_down(brackets: &mut [Bracket], ctx: &mut DrawContext<'_>) {
    let teams = ctx.teams;

    for i in 0..brackets.len() {
        let points = brackets[i].points;
        if points.fract() == 0.0 || brackets[i].teams.len() < 2 {
            continue;
        }

        let (first, second) = (brackets[i].teams[0], brackets[i].teams[1]);
        let conflict = Conflict::between(&teams[first], &teams[second]);
        if conflict == Conflict::None {
            continue;
        }

        // Bubble up: trade the top team with the bottom of the bracket above
        if let Some(up) = find_bracket(brackets, points + 0.5) {
            if let Some(&swap_team) = brackets[up].teams.last() {
                if Conflict::between(&teams[swap_team], &teams[second]) == Conflict::None {
                    ctx.flag_team(first, conflict.bubble_up_flag());
                    ctx.flag_team(swap_team, DrawFlag::BubbleUpAccommodate);
                    brackets[i].teams[0] = swap_team;
                    if let Some(last) = brackets[up].teams.last_mut() {
                        *last = first;
                    }
                    continue;
                }
            }
        }

        // Bubble down: trade the bottom team with the top of the bracket below
        if let Some(down) = find_bracket(brackets, points - 0.5) {
            if let Some(&swap_team) = brackets[down].teams.first() {
                if Conflict::between(&teams[swap_team], &teams[first]) == Conflict::None {
                    ctx.flag_team(second, conflict.bubble_down_flag());
                    ctx.flag_team(swap_team, DrawFlag::BubbleDownAccommodate);
                    brackets[i].teams[1] = swap_team;
                    brackets[down].teams[0] = second;
                    continue;
                }
            }
        }

        ctx.flag_team(first, DrawFlag::NoBubbleUpDown);
    }
}

/// Split a bracket into the upper and lower halves that will face each other
fn split_for_pairing<R: Rng + ?Sized>(
    teams: &mut Vec<usize>,
    method: PairingMethod,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let half = teams.len() / 2;
    match method {
        PairingMethod::Slide => (teams[..half].to_vec(), teams[half..].to_vec()),
        PairingMethod::Fold | PairingMethod::FoldTopAdjacentRest => {
            (teams[..half].to_vec(), teams[half..].iter().rev().copied().collect())
        }
        PairingMethod::Random => {
            teams.shuffle(rng);
            (teams[..half].to_vec(), teams[half..].to_vec())
        }
        PairingMethod::Adjacent => (
            teams.iter().step_by(2).copied().collect(),
            teams.iter().skip(1).step_by(2).copied().collect(),
        ),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Conflict between two teams, institution taking precedence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conflict {
    None,
    Institution,
    History,
}

impl Conflict {
    fn between(a: &Participant, b: &Participant) -> Self {
        if a.same_institution(b) {
            Conflict::Institution
        } else if a.seen(b) > 0 {
            Conflict::History
        } else {
            Conflict::None
        }
    }

    fn bubble_up_flag(self) -> DrawFlag {
        match self {
            Conflict::Institution => DrawFlag::BubbleUpInstitution,
            _ => DrawFlag::BubbleUpHistory,
        }
    }

    fn bubble_down_flag(self) -> DrawFlag {
        match self {
            Conflict::Institution => DrawFlag::BubbleDownInstitution,
            _ => DrawFlag::BubbleDownHistory,
        }
    }
}

fn find_bracket(brackets: &[Bracket], points: f64) -> Option<usize> {
    brackets.iter().position(|b| b.points == points)
}

/// Teams in `bracket` allowed to be pulled up, in bracket order
fn pullup_candidates(bracket: &[usize], teams: &[Participant], restriction: PullupRestriction) -> Vec<usize> {
    let metric = |t: &Participant| -> Option<f64> {
        match restriction {
            PullupRestriction::None => Some(0.0),
            PullupRestriction::LeastToDate => t.npullups.map(f64::from),
            PullupRestriction::LowestDsWins => t.draw_strength,
            PullupRestriction::LowestDsSpeaks => t.draw_strength_speaks,
        }
    };

    let lowest = bracket
        .iter()
        .filter_map(|&i| metric(&teams[i]))
        .fold(f64::INFINITY, f64::min);
    let eligible: Vec<usize> = bracket
        .iter()
        .copied()
        .filter(|&i| metric(&teams[i]) == Some(lowest))
        .collect();

    if eligible.is_empty() {
        bracket.to_vec()
    } else {
        eligible
    }
}
