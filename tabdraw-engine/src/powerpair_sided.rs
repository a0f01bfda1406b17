//! Power-paired draws where every team already knows its side
//!
//! Brackets hold separate affirmative and negative pools. Resolving a
//! bracket means making the two pools the same size, either by pulling
//! teams of the short side up from lower brackets or by moving the excess
//! into intermediate brackets filled from below.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: AllocatedPowerPairedDrawGenerator::make_draw
//! - Level 2: make_sided_brackets, resolve_sided_brackets, generate_sided_pairings
//! - Level 3: pullup, intermediate_brackets_1, intermediate_brackets_2
//! - Level 4: SidedBracket pool helpers

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tabdraw_core::{DrawFatalError, DrawFlag, DrawUserError, Pairing, Participant, Result, Side};

use crate::context::{allocate_sides, check_pair_attributes, check_sorted_by_points, DrawContext};
use crate::generator::{DrawGenerator, PriorResults};
use crate::graph::graph_sided_pairings;
use crate::options::{AllocatedPowerPairConfig, Choice, ConflictAvoidance, SidedOddBracket, SidedPairingMethod};
use crate::powerpair::one_up_one_down;

/// A points level split into affirmative and negative pools
#[derive(Clone, Debug, PartialEq)]
pub struct SidedBracket {
    pub points: f64,
    pub aff: Vec<usize>,
    pub neg: Vec<usize>,
}

impl SidedBracket {
    pub fn new(points: f64, aff: Vec<usize>, neg: Vec<usize>) -> Self {
        Self { points, aff, neg }
    }

    pub fn pool(&self, side: Side) -> &Vec<usize> {
        match side {
            Side::Aff => &self.aff,
            Side::Neg => &self.neg,
        }
    }

    pub fn pool_mut(&mut self, side: Side) -> &mut Vec<usize> {
        match side {
            Side::Aff => &mut self.aff,
            Side::Neg => &mut self.neg,
        }
    }

    /// Affirmative teams minus negative teams
    fn aff_surplus(&self) -> i64 {
        self.aff.len() as i64 - self.neg.len() as i64
    }

    pub(crate) fn is_balanced(&self) -> bool {
        self.aff.len() == self.neg.len()
    }

    fn is_empty(&self) -> bool {
        self.aff.is_empty() && self.neg.is_empty()
    }

    /// Split off the teams that can't be paired within this bracket
    fn split_excess(self, excess_points: f64) -> (SidedBracket, Option<SidedBracket>) {
        let n = self.aff.len().min(self.neg.len());
        let mut aff = self.aff;
        let mut neg = self.neg;
        let excess = SidedBracket::new(excess_points, aff.split_off(n), neg.split_off(n));
        let main = SidedBracket::new(self.points, aff, neg);
        if excess.is_empty() {
            (main, None)
        } else {
            (main, Some(excess))
        }
    }
}

/// Power-paired draw honouring preallocated sides
#[derive(Clone, Debug, PartialEq)]
pub struct AllocatedPowerPairedDrawGenerator {
    config: AllocatedPowerPairConfig,
}

impl AllocatedPowerPairedDrawGenerator {
    pub fn new(config: AllocatedPowerPairConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatedPowerPairConfig {
        &self.config
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

impl DrawGenerator for AllocatedPowerPairedDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        2
    }

    fn check_teams(&self, teams: &[Participant]) -> Result<()> {
        check_pair_attributes(teams, &self.config.base)?;
        check_sorted_by_points(teams)?;

        if matches!(
            self.config.odd_bracket,
            SidedOddBracket::Intermediate1 | SidedOddBracket::Intermediate2
        ) {
            let noninteger = teams.iter().filter(|t| !t.has_integer_points()).count();
            if noninteger > 0 {
                return Err(DrawUserError::NonIntegerPoints {
                    noninteger,
                    total: teams.len(),
                }
                .into());
            }
        }
        Ok(())
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
            "Power-pairing with allocated sides"
        );
        let mut ctx = DrawContext::new(teams);

        let mut brackets = make_sided_brackets(teams);
        resolve_sided_brackets(&mut brackets, &mut ctx, self.config.odd_bracket, rng)?;

        let mut by_bracket = match self.config.avoid_conflicts {
            ConflictAvoidance::Graph => graph_sided_pairings(brackets, teams, &self.config.base)?,
            ConflictAvoidance::OneUpOneDown | ConflictAvoidance::Off => {
                generate_sided_pairings(brackets, self.config.pairing_method, rng)?
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

/// Group consecutive equal-points teams, splitting each group by allocated side
///
/// Teams without an allocated side are skipped; `check_teams` refuses them first.
pub fn make_sided_brackets(teams: &[Participant]) -> Vec<SidedBracket> {
    let mut brackets: Vec<SidedBracket> = Vec::new();
    for (i, team) in teams.iter().enumerate() {
        if brackets.last().map_or(true, |b| b.points != team.points) {
            brackets.push(SidedBracket::new(team.points, Vec::new(), Vec::new()));
        }
        if let (Some(bracket), Some(side)) = (brackets.last_mut(), team.allocated_side) {
            bracket.pool_mut(side).push(i);
        }
    }
    brackets
}

pub(crate) fn resolve_sided_brackets<R: Rng + ?Sized>(
    brackets: &mut Vec<SidedBracket>,
    ctx: &mut DrawContext<'_>,
    odd_bracket: SidedOddBracket,
    rng: &mut R,
) -> Result<()> {
    match odd_bracket {
        SidedOddBracket::PullupTop => pullup(brackets, ctx, |_, num| (0..num).collect()),
        SidedOddBracket::PullupBottom => pullup(brackets, ctx, |len, num| (len - num..len).collect()),
        SidedOddBracket::PullupRandom => pullup(brackets, ctx, |len, num| {
            rand::seq::index::sample(&mut *rng, len, num).into_vec()
        }),
        SidedOddBracket::Intermediate1 => intermediate_brackets_1(brackets),
        SidedOddBracket::Intermediate2 => intermediate_brackets_2(brackets),
    }
}

/// Zip each bracket's pools into debates; room ranks run across brackets from 1
pub(crate) fn generate_sided_pairings<R: Rng + ?Sized>(
    brackets: Vec<SidedBracket>,
    method: SidedPairingMethod,
    rng: &mut R,
) -> Result<Vec<Vec<Pairing<usize>>>> {
    let mut room_rank = 1u32;
    let mut out = Vec::with_capacity(brackets.len());

    for mut bracket in brackets {
        if !bracket.is_balanced() {
            return Err(DrawFatalError::UnbalancedBracket {
                points: bracket.points,
                aff: bracket.aff.len(),
                neg: bracket.neg.len(),
            }
            .into());
        }

        match method {
            SidedPairingMethod::Slide => {}
            SidedPairingMethod::Fold => bracket.neg.reverse(),
            SidedPairingMethod::Random => {
                bracket.aff.shuffle(rng);
                bracket.neg.shuffle(rng);
            }
        }

        let points = bracket.points;
        let pairings = bracket
            .aff
            .into_iter()
            .zip(bracket.neg)
            .map(|(aff, neg)| {
                let pairing = Pairing::new(vec![aff, neg], points, room_rank);
                room_rank += 1;
                pairing
            })
            .collect();
        out.push(pairings);
    }
    Ok(out)
}

// ============================================================================
// LEVEL 3 - ODD BRACKET RESOLUTION
// ============================================================================

/// Teams of one side still owed to a higher bracket
#[derive(Clone, Copy, Debug)]
struct PullupNeed {
    target: usize,
    side: Side,
    count: usize,
}

/// Fill each short pool with teams of that side from the brackets below
///
/// `pick(len, num)` returns `num` distinct positions in a pool of `len` teams.
/// A lower bracket too small to cover a need gives all it has and passes the
/// remainder on. Empty brackets are kept.
fn pullup(
    brackets: &mut [SidedBracket],
    ctx: &mut DrawContext<'_>,
    mut pick: impl FnMut(usize, usize) -> Vec<usize>,
) -> Result<()> {
    let mut needs: Vec<PullupNeed> = Vec::new();

    for b in 0..brackets.len() {
        let mut remaining = Vec::new();

        for need in needs {
            let available = brackets[b].pool(need.side).len();
            let positions: Vec<usize> = if available < need.count {
                remaining.push(PullupNeed {
                    count: need.count - available,
                    ..need
                });
                (0..available).collect()
            } else {
                pick(available, need.count)
            };

            let pool = brackets[b].pool_mut(need.side);
            let pulled: Vec<usize> = positions.iter().map(|&p| pool[p]).collect();
            pool.retain(|team| !pulled.contains(team));

            for &team in &pulled {
                ctx.flag_team(team, DrawFlag::Pullup);
            }
            brackets[need.target].pool_mut(need.side).extend(pulled);
        }

        let surplus = brackets[b].aff_surplus();
        if surplus > 0 {
            remaining.push(PullupNeed {
                target: b,
                side: Side::Neg,
                count: surplus as usize,
            });
        } else if surplus < 0 {
            remaining.push(PullupNeed {
                target: b,
                side: Side::Aff,
                count: surplus.unsigned_abs() as usize,
            });
        }
        needs = remaining;
    }

    if needs.is_empty() {
        Ok(())
    } else {
        let short = needs.iter().map(|n| n.count).sum();
        Err(DrawFatalError::UnfilledPullups(short).into())
    }
}

/// At most one intermediate bracket between two brackets, filled from as
/// many lower brackets as it takes
fn intermediate_brackets_1(brackets: &mut Vec<SidedBracket>) -> Result<()> {
    let mut resolved: Vec<SidedBracket> = Vec::with_capacity(brackets.len() * 2);
    let mut unfilled: Vec<SidedBracket> = Vec::new();

    for mut pool in brackets.drain(..) {
        for pending in unfilled.iter_mut() {
            let surplus = pending.aff_surplus();
            if surplus > 0 {
                let k = (surplus as usize).min(pool.neg.len());
                pending.neg.extend(pool.neg.drain(..k));
            } else if surplus < 0 {
                let k = (surplus.unsigned_abs() as usize).min(pool.aff.len());
                pending.aff.extend(pool.aff.drain(..k));
            }
        }
        let (filled, still_unfilled): (Vec<_>, Vec<_>) =
            unfilled.into_iter().partition(SidedBracket::is_balanced);
        resolved.extend(filled);
        unfilled = still_unfilled;

        let excess_points = pool.points - 0.5;
        let (main, excess) = pool.split_excess(excess_points);
        resolved.push(main);
        unfilled.extend(excess);
    }

    if !unfilled.is_empty() {
        return Err(DrawFatalError::UnfilledIntermediateBrackets(
            unfilled.iter().map(|b| b.points).collect(),
        )
        .into());
    }
    sort_descending(&mut resolved);
    *brackets = resolved;
    Ok(())
}

/// Excess teams waiting for opponents, and the parts filled so far
struct PendingExcess {
    excess: SidedBracket,
    parts: Vec<SidedBracket>,
}

/// Every intermediate debate shares its points level; a bracket filled from
/// several lower brackets becomes several evenly spaced intermediate brackets
fn intermediate_brackets_2(brackets: &mut Vec<SidedBracket>) -> Result<()> {
    let mut resolved: Vec<SidedBracket> = Vec::with_capacity(brackets.len() * 2);
    let mut unfilled: Vec<PendingExcess> = Vec::new();

    for pool in brackets.drain(..) {
        let mut pool = pool;
        for pending in unfilled.iter_mut() {
            let excess = &mut pending.excess;
            if !excess.aff.is_empty() && !excess.neg.is_empty() {
                return Err(DrawFatalError::MixedUnfilledPool(excess.points).into());
            }
            if !excess.aff.is_empty() {
                let k = excess.aff.len().min(pool.neg.len());
                pending.parts.push(SidedBracket::new(
                    excess.points,
                    excess.aff.drain(..k).collect(),
                    pool.neg.drain(..k).collect(),
                ));
            } else if !excess.neg.is_empty() {
                let k = excess.neg.len().min(pool.aff.len());
                pending.parts.push(SidedBracket::new(
                    excess.points,
                    pool.aff.drain(..k).collect(),
                    excess.neg.drain(..k).collect(),
                ));
            }
        }

        let (exhausted, still_unfilled): (Vec<_>, Vec<_>) =
            unfilled.into_iter().partition(|p| p.excess.is_empty());
        for PendingExcess { excess, parts } in exhausted {
            let num = parts.len();
            for (i, mut part) in parts.into_iter().enumerate() {
                part.points = excess.points - (i + 1) as f64 / (num + 1) as f64;
                resolved.push(part);
            }
        }
        unfilled = still_unfilled;

        let excess_points = pool.points;
        let (main, excess) = pool.split_excess(excess_points);
        resolved.push(main);
        if let Some(excess) = excess {
            unfilled.push(PendingExcess {
                excess,
                parts: Vec::new(),
            });
        }
    }

    if !unfilled.is_empty() {
        return Err(DrawFatalError::UnfilledIntermediateBrackets(
            unfilled.iter().map(|p| p.excess.points).collect(),
        )
        .into());
    }
    sort_descending(&mut resolved);
    *brackets = resolved;
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Highest points first; equal levels keep their order
fn sort_descending(brackets: &mut [SidedBracket]) {
    brackets.sort_by(|a, b| b.points.total_cmp(&a.points));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AllocatedPowerPairConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sb(points: f64, aff: &[usize], neg: &[usize]) -> SidedBracket {
        SidedBracket::new(points, aff.to_vec(), neg.to_vec())
    }

    fn dummy_teams() -> Vec<Participant> {
        (0..32).map(|i| Participant::new(i, 0.0)).collect()
    }

    fn input(index: usize) -> Vec<SidedBracket> {
        match index {
            1 => vec![
                sb(5.0, &[1], &[14]),
                sb(4.0, &[2, 3], &[15]),
                sb(3.0, &[4, 5, 6, 7, 8], &[16, 17, 18]),
                sb(2.0, &[9, 10], &[19, 20, 21]),
                sb(1.0, &[11, 12], &[22, 23, 24, 25]),
                sb(0.0, &[13], &[26]),
            ],
            2 => vec![
                sb(5.0, &[], &[16, 17]),
                sb(4.0, &[1, 2, 3, 4], &[18, 19, 20, 21]),
                sb(3.0, &[5, 6, 7], &[22, 23]),
                sb(2.0, &[8, 9, 10], &[]),
                sb(1.0, &[11, 12, 13, 14], &[24, 25, 26, 27]),
                sb(0.0, &[15], &[28, 29, 30]),
            ],
            3 => vec![
                sb(5.0, &[1, 2], &[]),
                sb(4.0, &[3, 4], &[13]),
                sb(3.0, &[5, 6, 7, 8, 9], &[14, 15, 16]),
                sb(2.0, &[], &[17, 18, 19]),
                sb(1.0, &[10, 11], &[20, 21, 22, 23, 24]),
                sb(0.0, &[12], &[]),
            ],
            // more affirmatives than negatives overall
            _ => vec![
                sb(5.0, &[1, 2], &[]),
                sb(4.0, &[3, 4], &[14]),
                sb(3.0, &[5, 6, 7, 8, 9], &[15, 16]),
                sb(2.0, &[], &[17, 18, 19, 20]),
                sb(1.0, &[10, 11], &[21, 22, 23, 24]),
                sb(0.0, &[12, 13], &[]),
            ],
        }
    }

    fn resolve(index: usize, method: SidedOddBracket, seed: u64) -> Result<Vec<SidedBracket>> {
        let teams = dummy_teams();
        let mut ctx = DrawContext::new(&teams);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut brackets = input(index);
        resolve_sided_brackets(&mut brackets, &mut ctx, method, &mut rng)?;
        Ok(brackets)
    }

    fn assert_brackets(actual: &[SidedBracket], expected: &[SidedBracket]) {
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.points - e.points).abs() < 1e-9, "{} != {}", a.points, e.points);
            assert_eq!(a.aff, e.aff, "aff at {}", e.points);
            assert_eq!(a.neg, e.neg, "neg at {}", e.points);
        }
    }

    #[test]
    fn test_pullup_top() {
        assert_brackets(
            &resolve(1, SidedOddBracket::PullupTop, 0).unwrap(),
            &[
                sb(5.0, &[1], &[14]),
                sb(4.0, &[2, 3], &[15, 16]),
                sb(3.0, &[4, 5, 6, 7, 8], &[17, 18, 19, 20, 21]),
                sb(2.0, &[9, 10], &[22, 23]),
                sb(1.0, &[11, 12], &[24, 25]),
                sb(0.0, &[13], &[26]),
            ],
        );
        assert_brackets(
            &resolve(2, SidedOddBracket::PullupTop, 0).unwrap(),
            &[
                sb(5.0, &[1, 2], &[16, 17]),
                sb(4.0, &[3, 4, 5, 6], &[18, 19, 20, 21]),
                sb(3.0, &[7, 8], &[22, 23]),
                sb(2.0, &[9, 10], &[24, 25]),
                sb(1.0, &[11, 12, 13, 14], &[26, 27, 28, 29]),
                sb(0.0, &[15], &[30]),
            ],
        );
        assert_brackets(
            &resolve(3, SidedOddBracket::PullupTop, 0).unwrap(),
            &[
                sb(5.0, &[1, 2], &[13, 14]),
                sb(4.0, &[3, 4], &[15, 16]),
                sb(3.0, &[5, 6, 7, 8, 9], &[17, 18, 19, 20, 21]),
                sb(2.0, &[], &[]),
                sb(1.0, &[10, 11, 12], &[22, 23, 24]),
                sb(0.0, &[], &[]),
            ],
        );
    }

    #[test]
    fn test_pullup_bottom() {
        assert_brackets(
            &resolve(1, SidedOddBracket::PullupBottom, 0).unwrap(),
            &[
                sb(5.0, &[1], &[14]),
                sb(4.0, &[2, 3], &[15, 18]),
                sb(3.0, &[4, 5, 6, 7, 8], &[16, 17, 19, 20, 21]),
                sb(2.0, &[9, 10], &[24, 25]),
                sb(1.0, &[11, 12], &[22, 23]),
                sb(0.0, &[13], &[26]),
            ],
        );
        assert_brackets(
            &resolve(2, SidedOddBracket::PullupBottom, 0).unwrap(),
            &[
                sb(5.0, &[3, 4], &[16, 17]),
                sb(4.0, &[1, 2, 6, 7], &[18, 19, 20, 21]),
                sb(3.0, &[5, 10], &[22, 23]),
                sb(2.0, &[8, 9], &[26, 27]),
                sb(1.0, &[11, 12, 13, 14], &[24, 25, 29, 30]),
                sb(0.0, &[15], &[28]),
            ],
        );
        assert_brackets(
            &resolve(3, SidedOddBracket::PullupBottom, 0).unwrap(),
            &[
                sb(5.0, &[1, 2], &[13, 16]),
                sb(4.0, &[3, 4], &[14, 15]),
                sb(3.0, &[5, 6, 7, 8, 9], &[17, 18, 19, 23, 24]),
                sb(2.0, &[], &[]),
                sb(1.0, &[10, 11, 12], &[20, 21, 22]),
                sb(0.0, &[], &[]),
            ],
        );
    }

    #[test]
    fn test_intermediate1() {
        assert_brackets(
            &resolve(1, SidedOddBracket::Intermediate1, 0).unwrap(),
            &[
                sb(5.0, &[1], &[14]),
                sb(4.0, &[2], &[15]),
                sb(3.5, &[3], &[16]),
                sb(3.0, &[4, 5], &[17, 18]),
                sb(2.5, &[6, 7, 8], &[19, 20, 21]),
                sb(2.0, &[], &[]),
                sb(1.5, &[9, 10], &[22, 23]),
                sb(1.0, &[11, 12], &[24, 25]),
                sb(0.0, &[13], &[26]),
            ],
        );
        assert_brackets(
            &resolve(3, SidedOddBracket::Intermediate1, 0).unwrap(),
            &[
                sb(5.0, &[], &[]),
                sb(4.5, &[1, 2], &[13, 14]),
                sb(4.0, &[], &[]),
                sb(3.5, &[3, 4], &[15, 16]),
                sb(3.0, &[], &[]),
                sb(2.5, &[5, 6, 7, 8, 9], &[17, 18, 19, 20, 21]),
                sb(2.0, &[], &[]),
                sb(1.0, &[10, 11], &[22, 23]),
                sb(0.5, &[12], &[24]),
                sb(0.0, &[], &[]),
            ],
        );
    }

    #[test]
    fn test_intermediate_methods_agree_on_single_source() {
        let expected = [
            sb(5.0, &[], &[]),
            sb(4.5, &[1, 2], &[16, 17]),
            sb(4.0, &[3, 4], &[18, 19]),
            sb(3.5, &[5, 6], &[20, 21]),
            sb(3.0, &[7], &[22]),
            sb(2.5, &[8], &[23]),
            sb(2.0, &[], &[]),
            sb(1.5, &[9, 10], &[24, 25]),
            sb(1.0, &[11, 12], &[26, 27]),
            sb(0.5, &[13, 14], &[28, 29]),
            sb(0.0, &[15], &[30]),
        ];
        assert_brackets(&resolve(2, SidedOddBracket::Intermediate1, 0).unwrap(), &expected);
        assert_brackets(&resolve(2, SidedOddBracket::Intermediate2, 0).unwrap(), &expected);
    }

    #[test]
    fn test_intermediate2_splits_multi_source_brackets() {
        assert_brackets(
            &resolve(3, SidedOddBracket::Intermediate2, 0).unwrap(),
            &[
                sb(5.0, &[], &[]),
                sb(4.0 + 2.0 / 3.0, &[1], &[13]),
                sb(4.0 + 1.0 / 3.0, &[2], &[14]),
                sb(4.0, &[], &[]),
                sb(3.5, &[3, 4], &[15, 16]),
                sb(3.0, &[], &[]),
                sb(2.0 + 2.0 / 3.0, &[5, 6, 7], &[17, 18, 19]),
                sb(2.0 + 1.0 / 3.0, &[8, 9], &[20, 21]),
                sb(2.0, &[], &[]),
                sb(1.0, &[10, 11], &[22, 23]),
                sb(0.5, &[12], &[24]),
                sb(0.0, &[], &[]),
            ],
        );
    }

    #[test]
    fn test_uneven_sides_are_fatal() {
        for method in [
            SidedOddBracket::PullupTop,
            SidedOddBracket::PullupBottom,
            SidedOddBracket::PullupRandom,
            SidedOddBracket::Intermediate1,
            SidedOddBracket::Intermediate2,
        ] {
            let err = resolve(99, method, 0).unwrap_err();
            assert!(err.is_fatal(), "{:?} should be fatal", method);
        }
    }

    #[test]
    fn test_pullup_random() {
        for seed in 0..10 {
            let b = resolve(3, SidedOddBracket::PullupRandom, seed).unwrap();
            let count_in = |pool: &[usize], teams: &[usize]| teams.iter().filter(|&t| pool.contains(t)).count();

            assert_eq!(b[0].aff, vec![1, 2]);
            assert!(b[0].neg.contains(&13));
            assert_eq!(count_in(&b[0].neg, &[14, 15, 16]), 1);
            assert_eq!(b[1].aff, vec![3, 4]);
            assert_eq!(count_in(&b[1].neg, &[14, 15, 16]), 2);
            assert_eq!(b[2].aff, vec![5, 6, 7, 8, 9]);
            assert_eq!(count_in(&b[2].neg, &[17, 18, 19]), 3);
            assert_eq!(count_in(&b[2].neg, &[20, 21, 22, 23, 24]), 2);
            assert!(b[3].is_empty());
            assert_eq!(b[4].aff, vec![10, 11, 12]);
            assert_eq!(count_in(&b[4].neg, &[20, 21, 22, 23, 24]), 3);
            assert!(b[5].is_empty());
        }
    }

    #[test]
    fn test_pulled_teams_are_flagged() {
        let teams = dummy_teams();
        let mut ctx = DrawContext::new(&teams);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut brackets = input(1);
        resolve_sided_brackets(&mut brackets, &mut ctx, SidedOddBracket::PullupTop, &mut rng).unwrap();
        assert_eq!(ctx.team_flags(16), &[DrawFlag::Pullup]);
        assert!(ctx.team_flags(15).is_empty());
    }

    #[test]
    fn test_fold_and_slide_pairings() {
        let brackets = vec![sb(2.0, &[1, 2, 3], &[4, 5, 6]), sb(1.0, &[7], &[8])];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let rooms = |pairings: Vec<Vec<Pairing<usize>>>| -> Vec<(usize, usize, u32)> {
            pairings
                .into_iter()
                .flatten()
                .map(|p| (p.teams[0], p.teams[1], p.room_rank))
                .collect()
        };

        let fold = generate_sided_pairings(brackets.clone(), SidedPairingMethod::Fold, &mut rng).unwrap();
        assert_eq!(rooms(fold), vec![(1, 6, 1), (2, 5, 2), (3, 4, 3), (7, 8, 4)]);

        let slide = generate_sided_pairings(brackets, SidedPairingMethod::Slide, &mut rng).unwrap();
        assert_eq!(rooms(slide), vec![(1, 4, 1), (2, 5, 2), (3, 6, 3), (7, 8, 4)]);
    }

    #[test]
    fn test_unbalanced_bracket_is_fatal() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = generate_sided_pairings(vec![sb(1.0, &[1, 2], &[3])], SidedPairingMethod::Slide, &mut rng)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_generator_keeps_allocated_sides() {
        let teams: Vec<Participant> = (1..=8u32)
            .map(|id| {
                let side = if id % 2 == 1 { Side::Aff } else { Side::Neg };
                Participant::new(id, if id <= 4 { 1.0 } else { 0.0 })
                    .with_allocated_side(side)
                    .with_opponents(vec![])
            })
            .collect();
        let generator = AllocatedPowerPairedDrawGenerator::new(AllocatedPowerPairConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let draw = generator.generate(&teams, None, &mut rng).unwrap();

        let rooms: Vec<(u32, u32)> = draw.iter().map(|p| (p.teams[0], p.teams[1])).collect();
        assert_eq!(rooms, vec![(1, 4), (3, 2), (5, 8), (7, 6)]);
        assert_eq!(draw.iter().map(|p| p.room_rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }
}
