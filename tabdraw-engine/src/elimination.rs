//! Two-team elimination rounds
//!
//! The first elimination round handles break sizes that aren't powers of
//! two: the top teams bypass it and the rest debate down to a power of two.
//! Later rounds fold the bypassing teams together with the previous winners.
//!
//! Rooms in a round with bypassing teams are ranked after them, so the next
//! round can recover the bypass count from the lowest room rank.

use rand::RngCore;
use tabdraw_core::{DrawFatalError, DrawUserError, Pairing, Participant, Result, TeamId};

use crate::context::shuffle_all_sides;
use crate::generator::{DrawGenerator, PriorResults};

// ============================================================================
// BREAK ARITHMETIC
// ============================================================================

/// Whether `n` is a positive power of two
pub fn is_pow2(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Smallest power of two at or above `n`
pub fn next_pow2(n: usize) -> usize {
    n.next_power_of_two()
}

/// Split a break into `(debates, bypassing)` for its first elimination round
///
/// After the round, the winners and the bypassing teams together make a
/// power of two.
pub fn partial_break_round_split(break_size: usize) -> Result<(usize, usize)> {
    if break_size <= 1 {
        return Err(DrawFatalError::BreakTooSmall(break_size).into());
    }
    let teams_in_second_round = next_pow2(break_size) / 2;
    let debates = break_size - teams_in_second_round;
    let bypassing = teams_in_second_round - debates;
    Ok((debates, bypassing))
}

/// Pair the top half against the reversed bottom half, ranking rooms from
/// `start_rank + 1`
pub(crate) fn fold<T: Copy + Ord>(teams: &[T], start_rank: usize) -> Vec<Pairing<T>> {
    let debates = teams.len() / 2;
    let (top, bottom) = teams.split_at(debates);
    top.iter()
        .zip(bottom.iter().rev())
        .enumerate()
        .map(|(i, (&upper, &lower))| Pairing::new(vec![upper, lower], 0.0, (start_rank + i + 1) as u32))
        .collect()
}

// ============================================================================
// GENERATORS
// ============================================================================

/// First elimination round, with byes when the break isn't a power of two
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FirstEliminationDrawGenerator;

impl DrawGenerator for FirstEliminationDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        2
    }

    fn requires_even_teams(&self) -> bool {
        false
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        _results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        if teams.len() < 2 {
            return Err(DrawUserError::TooFewBreakingTeams(teams.len()).into());
        }

        let (debates, bypassing) = partial_break_round_split(teams.len())?;
        tracing::info!(debates, bypassing, "First elimination round split");

        let ids: Vec<TeamId> = teams[bypassing..].iter().map(|t| t.id).collect();
        let mut pairings = fold(&ids, bypassing);
        shuffle_all_sides(&mut pairings, rng);
        Ok(pairings)
    }
}

/// Second and later elimination rounds
///
/// `teams` are the teams that bypassed the previous round, in break order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubsequentEliminationDrawGenerator;

impl DrawGenerator for SubsequentEliminationDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        2
    }

    fn requires_even_teams(&self) -> bool {
        false
    }

    fn requires_prev_results(&self) -> bool {
        true
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        let mut results = match results {
            Some(PriorResults::TwoTeam(results)) if !results.is_empty() => results.clone(),
            _ => return Err(DrawUserError::MissingPriorResults.into()),
        };
        results.sort_by_key(|r| r.room_rank());

        let undecided = results.iter().filter(|r| r.winner().is_none()).count();
        if undecided > 0 {
            return Err(DrawUserError::UnresolvedDebates(undecided).into());
        }
        let winners: Vec<TeamId> = results.iter().filter_map(|r| r.winner()).collect();

        let bypassing = (results[0].room_rank() as usize).saturating_sub(1);
        tracing::info!(
            bypassing,
            winners = winners.len(),
            "Teams bypassed the previous round and won the last round"
        );

        let ids: Vec<TeamId> = teams
            .iter()
            .take(bypassing)
            .map(|t| t.id)
            .chain(winners)
            .collect();
        if ids.len() < 2 || !is_pow2(ids.len()) {
            return Err(DrawUserError::TeamsNotPowerOfTwo(ids.len()).into());
        }

        let mut pairings = fold(&ids, 0);
        shuffle_all_sides(&mut pairings, rng);
        Ok(pairings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;
    use tabdraw_core::{DrawError, ResultPairing};

    fn teams(ids: impl IntoIterator<Item = TeamId>) -> Vec<Participant> {
        ids.into_iter().map(|id| Participant::new(id, 0.0)).collect()
    }

    /// Rooms as unordered pairs, since sides are shuffled
    fn rooms(pairings: &[Pairing]) -> Vec<BTreeSet<TeamId>> {
        pairings.iter().map(|p| p.teams.iter().copied().collect()).collect()
    }

    fn expected(pairs: &[(TeamId, TeamId)]) -> Vec<BTreeSet<TeamId>> {
        pairs.iter().map(|&(a, b)| [a, b].into_iter().collect()).collect()
    }

    #[test]
    fn test_pow2() {
        assert!(is_pow2(1));
        assert!(is_pow2(64));
        assert!(!is_pow2(0));
        assert!(!is_pow2(12));
        assert_eq!(next_pow2(5), 8);
        assert_eq!(next_pow2(8), 8);
    }

    #[test]
    fn test_split() {
        let cases = [
            (2, (1, 0)),
            (3, (1, 1)),
            (4, (2, 0)),
            (5, (1, 3)),
            (6, (2, 2)),
            (7, (3, 1)),
            (8, (4, 0)),
            (11, (3, 5)),
            (21, (5, 11)),
            (24, (8, 8)),
            (27, (11, 5)),
            (31, (15, 1)),
            (32, (16, 0)),
            (45, (13, 19)),
            (48, (16, 16)),
            (61, (29, 3)),
            (64, (32, 0)),
            (99, (35, 29)),
        ];
        for (size, split) in cases {
            assert_eq!(partial_break_round_split(size).unwrap(), split, "break of {}", size);
            let (debates, bypassing) = split;
            assert_eq!(2 * debates + bypassing, size);
        }
    }

    #[test]
    fn test_split_too_small() {
        assert!(partial_break_round_split(1).unwrap_err().is_fatal());
        assert!(partial_break_round_split(0).unwrap_err().is_fatal());
    }

    #[test]
    fn test_first_elimination() {
        let cases: [(TeamId, &[(TeamId, TeamId)]); 7] = [
            (2, &[(1, 2)]),
            (4, &[(1, 4), (2, 3)]),
            (8, &[(1, 8), (2, 7), (3, 6), (4, 5)]),
            (3, &[(2, 3)]),
            (5, &[(4, 5)]),
            (6, &[(3, 6), (4, 5)]),
            (12, &[(5, 12), (6, 11), (7, 10), (8, 9)]),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for (size, pairs) in cases {
            let draw = FirstEliminationDrawGenerator
                .generate(&teams(1..=size), None, &mut rng)
                .unwrap();
            assert_eq!(rooms(&draw), expected(pairs), "break of {}", size);
        }
    }

    #[test]
    fn test_first_elimination_ranks_follow_byes() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw = FirstEliminationDrawGenerator
            .generate(&teams(1..=6), None, &mut rng)
            .unwrap();
        let ranks: Vec<u32> = draw.iter().map(|p| p.room_rank).collect();
        assert_eq!(ranks, vec![3, 4]);
    }

    #[test]
    fn test_first_elimination_too_few_teams() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = FirstEliminationDrawGenerator
            .generate(&teams([1]), None, &mut rng)
            .unwrap_err();
        assert!(err.is_user_error());
    }

    fn result(room_rank: u32, aff: TeamId, neg: TeamId, winner: Option<TeamId>) -> ResultPairing {
        ResultPairing::new(Pairing::new(vec![aff, neg], 0.0, room_rank), winner).unwrap()
    }

    #[test]
    fn test_subsequent_without_bypass() {
        let results = PriorResults::TwoTeam(vec![
            result(2, 2, 7, Some(7)),
            result(1, 1, 8, Some(1)),
            result(4, 4, 5, Some(4)),
            result(3, 3, 6, Some(3)),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw = SubsequentEliminationDrawGenerator
            .generate(&[], Some(&results), &mut rng)
            .unwrap();
        assert_eq!(rooms(&draw), expected(&[(1, 4), (7, 3)]));
        assert_eq!(draw.iter().map(|p| p.room_rank).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_subsequent_with_bypass() {
        let bypassing = teams([9, 11, 10, 12, 1, 2, 3, 4, 5, 6, 7, 8]);
        let results = PriorResults::TwoTeam(vec![
            result(6, 2, 7, Some(7)),
            result(8, 5, 8, Some(8)),
            result(5, 1, 16, Some(1)),
            result(7, 3, 6, Some(3)),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw = SubsequentEliminationDrawGenerator
            .generate(&bypassing, Some(&results), &mut rng)
            .unwrap();
        assert_eq!(rooms(&draw), expected(&[(9, 8), (11, 3), (10, 7), (12, 1)]));
    }

    #[test]
    fn test_subsequent_errors() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let missing = SubsequentEliminationDrawGenerator
            .generate(&[], None, &mut rng)
            .unwrap_err();
        assert!(missing.is_user_error());

        let undecided = PriorResults::TwoTeam(vec![result(1, 1, 4, Some(1)), result(2, 2, 3, None)]);
        let err = SubsequentEliminationDrawGenerator
            .generate(&[], Some(&undecided), &mut rng)
            .unwrap_err();
        assert_eq!(err, DrawError::User(DrawUserError::UnresolvedDebates(1)));

        let three = PriorResults::TwoTeam(vec![
            result(1, 1, 6, Some(1)),
            result(2, 2, 5, Some(2)),
            result(3, 3, 4, Some(3)),
        ]);
        let err = SubsequentEliminationDrawGenerator
            .generate(&[], Some(&three), &mut rng)
            .unwrap_err();
        assert_eq!(err, DrawError::User(DrawUserError::TeamsNotPowerOfTwo(3)));
    }
}
