//! BP elimination rounds
//!
//! Same shape as the two-team rounds, in units of four. Breaks of `4·2ⁿ`
//! fold the whole break four ways; breaks of `6·2ⁿ` start with a partial
//! round in which the top third bypass, and the round after it pairs the
//! bypassing teams two-by-two with the pairs advancing from each room.

use rand::RngCore;
use tabdraw_core::{BpResultPairing, DrawFatalError, DrawUserError, Pairing, Participant, Result, TeamId};

use crate::context::shuffle_all_sides;
use crate::elimination::is_pow2;
use crate::generator::{DrawGenerator, PriorResults};

/// Deal teams into rooms four ways, ranking rooms from `start_rank + 1`
///
/// With `n` rooms, room `i` gets the `i`th team of the first quarter, the
/// `i`th from the end of the second, the `i`th of the third and the `i`th from
/// the end of the fourth.
pub fn four_way_fold(teams: &[TeamId], start_rank: usize) -> Result<Vec<Pairing>> {
    if teams.len() % 4 != 0 {
        return Err(DrawFatalError::FourWayFold(teams.len()).into());
    }
    let n = teams.len() / 4;
    Ok((0..n)
        .map(|i| {
            let room = vec![teams[i], teams[2 * n - 1 - i], teams[2 * n + i], teams[4 * n - 1 - i]];
            Pairing::new(room, 0.0, (start_rank + i + 1) as u32)
        })
        .collect())
}

/// Advancing pairs from the previous round, in room-rank order
fn advancing_teams(results: Option<&PriorResults>) -> Result<Vec<Vec<TeamId>>> {
    let mut results: Vec<&BpResultPairing> = match results {
        Some(PriorResults::Bp(results)) if !results.is_empty() => results.iter().collect(),
        _ => return Err(DrawUserError::MissingPriorResults.into()),
    };
    results.sort_by_key(|r| r.room_rank());

    let undecided = results.iter().filter(|r| r.advancing().is_empty()).count();
    if undecided > 0 {
        return Err(DrawUserError::UnresolvedDebates(undecided).into());
    }
    let wrong = results.iter().filter(|r| r.advancing().len() != 2).count();
    if wrong > 0 {
        return Err(DrawUserError::WrongAdvancingCount(wrong).into());
    }
    Ok(results.iter().map(|r| r.advancing().to_vec()).collect())
}

fn ids(teams: &[Participant]) -> Vec<TeamId> {
    teams.iter().map(|t| t.id).collect()
}

/// First round of a `6·2ⁿ` break; the top third bypass it
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartialBpEliminationDrawGenerator;

impl DrawGenerator for PartialBpEliminationDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        4
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
        let n = teams.len();
        if n % 6 != 0 || !is_pow2(n / 6) {
            return Err(DrawFatalError::InvalidBreakSize { kind: "partial elimination", size: n }.into());
        }

        // Rooms are ranked after the bypassing teams, e.g. 9 to 12 in partial octos
        let start = n / 3;
        tracing::info!(bypassing = start, debates = (n - start) / 4, "Partial elimination round split");
        let mut pairings = four_way_fold(&ids(&teams[start..]), start)?;
        shuffle_all_sides(&mut pairings, rng);
        Ok(pairings)
    }
}

/// Round after a partial elimination round
///
/// `teams` are the teams that bypassed the partial round, in break order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AfterPartialBpEliminationDrawGenerator;

impl DrawGenerator for AfterPartialBpEliminationDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        4
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
        let lowest_rank = match results {
            Some(PriorResults::Bp(results)) => results.iter().map(|r| r.room_rank()).min(),
            _ => None,
        }
        .ok_or(DrawUserError::MissingPriorResults)?;

        let nbypassing = (lowest_rank as usize).saturating_sub(1);
        if nbypassing % 2 != 0 {
            return Err(DrawUserError::OddBypassCount(nbypassing).into());
        }
        let ndebates = nbypassing / 2;
        let nresults = results.map_or(0, PriorResults::len);
        if nresults != ndebates {
            return Err(DrawUserError::BypassMismatch {
                bypassing: nbypassing,
                debates: nresults,
            }
            .into());
        }
        if teams.len() < nbypassing {
            return Err(DrawUserError::NotEnoughBypassingTeams {
                needed: nbypassing,
                available: teams.len(),
            }
            .into());
        }

        let bypassing = ids(&teams[..nbypassing]);
        let (top, bottom) = bypassing.split_at(ndebates);
        let advancing = advancing_teams(results)?;

        let mut pairings: Vec<Pairing> = top
            .iter()
            .zip(bottom.iter().rev())
            .zip(advancing)
            .enumerate()
            .map(|(i, ((&first, &second), adv))| {
                let mut room = vec![first, second];
                room.extend(adv);
                Pairing::new(room, 0.0, i as u32 + 1)
            })
            .collect();
        shuffle_all_sides(&mut pairings, rng);
        Ok(pairings)
    }
}

/// First round of a `4·2ⁿ` break
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FirstBpEliminationDrawGenerator;

impl DrawGenerator for FirstBpEliminationDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        4
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
        let n = teams.len();
        if n % 4 != 0 || !is_pow2(n / 4) {
            return Err(DrawFatalError::InvalidBreakSize { kind: "first elimination", size: n }.into());
        }
        let mut pairings = four_way_fold(&ids(teams), 0)?;
        shuffle_all_sides(&mut pairings, rng);
        Ok(pairings)
    }
}

/// Every later BP elimination round
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubsequentBpEliminationDrawGenerator;

impl DrawGenerator for SubsequentBpEliminationDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        4
    }

    fn requires_even_teams(&self) -> bool {
        false
    }

    fn requires_prev_results(&self) -> bool {
        true
    }

    fn make_draw(
        &self,
        _teams: &[Participant],
        results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        let advancing = advancing_teams(results)?;
        if advancing.len() < 2 || !is_pow2(advancing.len()) {
            return Err(DrawUserError::DebatesNotPowerOfTwo(advancing.len()).into());
        }

        let ndebates = advancing.len() / 2;
        let (top, bottom) = advancing.split_at(ndebates);
        let mut pairings: Vec<Pairing> = top
            .iter()
            .zip(bottom.iter().rev())
            .enumerate()
            .map(|(i, (upper, lower))| Pairing::new([upper.as_slice(), lower.as_slice()].concat(), 0.0, i as u32 + 1))
            .collect();
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
    use tabdraw_core::DrawError;

    fn teams(ids: impl IntoIterator<Item = TeamId>) -> Vec<Participant> {
        ids.into_iter().map(|id| Participant::new(id, 0.0)).collect()
    }

    fn rooms(pairings: &[Pairing]) -> Vec<(u32, BTreeSet<TeamId>)> {
        pairings
            .iter()
            .map(|p| (p.room_rank, p.teams.iter().copied().collect()))
            .collect()
    }

    fn room(rank: u32, ids: [TeamId; 4]) -> (u32, BTreeSet<TeamId>) {
        (rank, ids.into_iter().collect())
    }

    fn bp_result(rank: u32, teams: [TeamId; 4], advancing: &[TeamId]) -> BpResultPairing {
        BpResultPairing::new(Pairing::new(teams.to_vec(), 0.0, rank), advancing.to_vec()).unwrap()
    }

    #[test]
    fn test_four_way_fold() {
        let ids: Vec<TeamId> = (1..=8).collect();
        let pairings = four_way_fold(&ids, 0).unwrap();
        assert_eq!(pairings[0].teams, vec![1, 4, 5, 8]);
        assert_eq!(pairings[1].teams, vec![2, 3, 6, 7]);
        assert!(four_way_fold(&ids[..6], 0).unwrap_err().is_fatal());
    }

    #[test]
    fn test_first_bp_elimination() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw = FirstBpEliminationDrawGenerator
            .generate(&teams(1..=16), None, &mut rng)
            .unwrap();
        assert_eq!(
            rooms(&draw),
            vec![
                room(1, [1, 8, 9, 16]),
                room(2, [2, 7, 10, 15]),
                room(3, [3, 6, 11, 14]),
                room(4, [4, 5, 12, 13]),
            ]
        );

        let err = FirstBpEliminationDrawGenerator
            .generate(&teams(1..=12), None, &mut rng)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_partial_bp_elimination() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw = PartialBpEliminationDrawGenerator
            .generate(&teams(1..=12), None, &mut rng)
            .unwrap();
        assert_eq!(rooms(&draw), vec![room(5, [5, 8, 9, 12]), room(6, [6, 7, 10, 11])]);

        for size in [8, 16, 18] {
            let err = PartialBpEliminationDrawGenerator
                .generate(&teams(1..=size), None, &mut rng)
                .unwrap_err();
            assert!(err.is_fatal(), "break of {}", size);
        }
    }

    #[test]
    fn test_after_partial_bp_elimination() {
        let results = PriorResults::Bp(vec![
            bp_result(6, [6, 7, 10, 11], &[7, 11]),
            bp_result(5, [5, 8, 9, 12], &[5, 9]),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw = AfterPartialBpEliminationDrawGenerator
            .generate(&teams(1..=4), Some(&results), &mut rng)
            .unwrap();
        assert_eq!(rooms(&draw), vec![room(1, [1, 4, 5, 9]), room(2, [2, 3, 7, 11])]);
    }

    #[test]
    fn test_after_partial_errors() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let odd = PriorResults::Bp(vec![bp_result(4, [4, 5, 6, 7], &[4, 5])]);
        let err = AfterPartialBpEliminationDrawGenerator
            .generate(&teams(1..=3), Some(&odd), &mut rng)
            .unwrap_err();
        assert_eq!(err, DrawError::User(DrawUserError::OddBypassCount(3)));

        let short = PriorResults::Bp(vec![bp_result(5, [5, 6, 7, 8], &[5, 6])]);
        let err = AfterPartialBpEliminationDrawGenerator
            .generate(&teams(1..=4), Some(&short), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            DrawError::User(DrawUserError::BypassMismatch {
                bypassing: 4,
                debates: 1
            })
        );

        let one_advancing = PriorResults::Bp(vec![
            bp_result(3, [3, 4, 5, 6], &[3]),
        ]);
        let err = AfterPartialBpEliminationDrawGenerator
            .generate(&teams(1..=2), Some(&one_advancing), &mut rng)
            .unwrap_err();
        assert_eq!(err, DrawError::User(DrawUserError::WrongAdvancingCount(1)));
    }

    #[test]
    fn test_subsequent_bp_elimination() {
        let results = PriorResults::Bp(vec![
            bp_result(1, [1, 8, 9, 16], &[1, 9]),
            bp_result(2, [2, 7, 10, 15], &[7, 15]),
            bp_result(3, [3, 6, 11, 14], &[3, 6]),
            bp_result(4, [4, 5, 12, 13], &[12, 13]),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw = SubsequentBpEliminationDrawGenerator
            .generate(&[], Some(&results), &mut rng)
            .unwrap();
        assert_eq!(rooms(&draw), vec![room(1, [1, 9, 12, 13]), room(2, [7, 15, 3, 6])]);
    }

    #[test]
    fn test_subsequent_bp_errors() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let single = PriorResults::Bp(vec![bp_result(1, [1, 2, 3, 4], &[1, 2])]);
        let err = SubsequentBpEliminationDrawGenerator
            .generate(&[], Some(&single), &mut rng)
            .unwrap_err();
        assert_eq!(err, DrawError::User(DrawUserError::DebatesNotPowerOfTwo(1)));

        let undecided = PriorResults::Bp(vec![
            bp_result(1, [1, 2, 3, 4], &[1, 2]),
            bp_result(2, [5, 6, 7, 8], &[]),
        ]);
        let err = SubsequentBpEliminationDrawGenerator
            .generate(&[], Some(&undecided), &mut rng)
            .unwrap_err();
        assert_eq!(err, DrawError::User(DrawUserError::UnresolvedDebates(1)));

        let err = SubsequentBpEliminationDrawGenerator
            .generate(&[], None, &mut rng)
            .unwrap_err();
        assert_eq!(err, DrawError::User(DrawUserError::MissingPriorResults));
    }
}
