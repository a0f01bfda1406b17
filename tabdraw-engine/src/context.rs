//! Per-draw scratch state and the checks shared by every generator
//!
//! Level 3 - Steps and Level 4 - Utilities
//!
//! Generators never touch the participant slice. Anything they need to
//! remember about a team during one call (its flags) lives in a
//! [`DrawContext`] keyed by participant index, and is attached to the
//! pairings when the draw is finished.

use rand::Rng;
use rustc_hash::FxHashMap;
use tabdraw_core::{
    DrawFatalError, DrawFlag, DrawUserError, Pairing, Participant, Result,
};

use crate::options::{PairOptions, SideAllocation};

/// Scratch state for one generation call
pub(crate) struct DrawContext<'a> {
    pub teams: &'a [Participant],
    team_flags: FxHashMap<usize, Vec<DrawFlag>>,
}

impl<'a> DrawContext<'a> {
    pub fn new(teams: &'a [Participant]) -> Self {
        Self {
            teams,
            team_flags: FxHashMap::default(),
        }
    }

    /// Attach a flag to a team; it follows the team into whatever room it ends up in
    pub fn flag_team(&mut self, team: usize, flag: DrawFlag) {
        self.team_flags.entry(team).or_default().push(flag);
    }

    #[cfg(test)]
    pub fn team_flags(&self, team: usize) -> &[DrawFlag] {
        self.team_flags.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attach team flags and convert indices to team ids
    pub fn finish(mut self, pairings: Vec<Pairing<usize>>) -> Vec<Pairing> {
        let teams = self.teams;
        pairings
            .into_iter()
            .map(|mut pairing| {
                for i in 0..pairing.teams.len() {
                    let team = pairing.teams[i];
                    if let Some(flags) = self.team_flags.remove(&team) {
                        pairing.add_team_flags(team, flags);
                    }
                }
                pairing.map_teams(|index| teams[index].id)
            })
            .collect()
    }
}

/// Conflict checks on a two-team room of participant indices
pub(crate) trait RoomConflicts {
    /// Times the first team has met the second
    fn conflict_hist(&self, teams: &[Participant]) -> u32;
    /// Whether both teams come from the same institution
    fn conflict_inst(&self, teams: &[Participant]) -> bool;
}

impl RoomConflicts for Pairing<usize> {
    fn conflict_hist(&self, teams: &[Participant]) -> u32 {
        teams[self.teams[0]].seen(&teams[self.teams[1]])
    }

    fn conflict_inst(&self, teams: &[Participant]) -> bool {
        teams[self.teams[0]].same_institution(&teams[self.teams[1]])
    }
}

// ============================================================================
// PRECONDITION CHECKS
// ============================================================================

/// Team count must be a positive multiple of the debate size
pub(crate) fn check_team_count(teams: &[Participant], per_debate: usize) -> Result<()> {
    if teams.is_empty() {
        return Err(DrawUserError::NoTeams.into());
    }
    if teams.len() % per_debate != 0 {
        return Err(DrawUserError::TeamCountNotMultiple {
            teams: teams.len(),
            per_debate,
        }
        .into());
    }
    Ok(())
}

/// Every team must satisfy `valid`, or the draw is refused
pub(crate) fn check_attribute(
    teams: &[Participant],
    attribute: &'static str,
    valid: impl Fn(&Participant) -> bool,
) -> Result<()> {
    let offending = teams.iter().filter(|team| !valid(team)).count();
    if offending > 0 {
        return Err(DrawFatalError::InvalidAttribute {
            attribute,
            offending,
            total: teams.len(),
        }
        .into());
    }
    Ok(())
}

/// Attributes required by the base two-team options
pub(crate) fn check_pair_attributes(teams: &[Participant], options: &PairOptions) -> Result<()> {
    if options.avoid_history {
        check_attribute(teams, "opponents", |t| t.opponents.is_some())?;
    }
    match options.side_allocations {
        SideAllocation::Balance => check_attribute(teams, "side_history", |t| t.side_history.len() == 2),
        SideAllocation::Preallocated => check_attribute(teams, "allocated_side", |t| t.allocated_side.is_some()),
        SideAllocation::Random | SideAllocation::None => Ok(()),
    }
}

/// Teams must arrive in order of non-increasing points
pub(crate) fn check_sorted_by_points(teams: &[Participant]) -> Result<()> {
    match teams.windows(2).position(|w| w[1].points > w[0].points) {
        Some(i) => Err(DrawFatalError::UnsortedTeams(i + 1).into()),
        None => Ok(()),
    }
}

// ============================================================================
// SIDE ALLOCATION
// ============================================================================

/// Decide sides for every two-team room
pub(crate) fn allocate_sides<R: Rng + ?Sized>(
    pairings: &mut [Pairing<usize>],
    teams: &[Participant],
    policy: SideAllocation,
    rng: &mut R,
) {
    match policy {
        SideAllocation::Balance => {
            for pairing in pairings.iter_mut() {
                balance_sides(pairing, teams, rng);
            }
        }
        SideAllocation::Random => shuffle_all_sides(pairings, rng),
        SideAllocation::Preallocated | SideAllocation::None => {}
    }
}

/// The team that has affirmed more (net) goes negative; ties are random
pub(crate) fn balance_sides<R: Rng + ?Sized>(
    pairing: &mut Pairing<usize>,
    teams: &[Participant],
    rng: &mut R,
) {
    let first = teams[pairing.teams[0]].side_imbalance();
    let second = teams[pairing.teams[1]].side_imbalance();
    if first > second {
        pairing.reverse_sides();
    } else if first == second {
        pairing.shuffle_sides(rng);
    }
}

pub(crate) fn shuffle_all_sides<T: Copy + Ord, R: Rng + ?Sized>(pairings: &mut [Pairing<T>], rng: &mut R) {
    for pairing in pairings.iter_mut() {
        pairing.shuffle_sides(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sided(id: u32, aff: u32, neg: u32) -> Participant {
        Participant::new(id, 0.0).with_side_history(vec![aff, neg])
    }

    #[test]
    fn test_balance_puts_frequent_affirmative_on_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let teams = vec![sided(1, 3, 1), sided(2, 1, 3)];
        let mut pairing = Pairing::new(vec![0usize, 1], 0.0, 1);
        balance_sides(&mut pairing, &teams, &mut rng);
        assert_eq!(pairing.teams, vec![1, 0]);

        let mut pairing = Pairing::new(vec![1usize, 0], 0.0, 1);
        balance_sides(&mut pairing, &teams, &mut rng);
        assert_eq!(pairing.teams, vec![1, 0]);
    }

    #[test]
    fn test_balance_ties_go_both_ways() {
        let teams = vec![sided(1, 2, 2), sided(2, 1, 1)];
        let mut seen_first = [false, false];
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut pairing = Pairing::new(vec![0usize, 1], 0.0, 1);
            balance_sides(&mut pairing, &teams, &mut rng);
            seen_first[pairing.teams[0]] = true;
        }
        assert_eq!(seen_first, [true, true]);
    }

    #[test]
    fn test_finish_attaches_flags_and_ids() {
        let teams = vec![Participant::new(10, 1.0), Participant::new(20, 0.0)];
        let mut ctx = DrawContext::new(&teams);
        ctx.flag_team(1, DrawFlag::Pullup);
        let out = ctx.finish(vec![Pairing::new(vec![0, 1], 1.0, 1)]);
        assert_eq!(out[0].teams, vec![10, 20]);
        assert_eq!(out[0].flags_for(20), &[DrawFlag::Pullup]);
        assert!(out[0].flags_for(10).is_empty());
    }

    #[test]
    fn test_checks() {
        let teams = vec![Participant::new(1, 2.0), Participant::new(2, 3.0)];
        assert!(check_sorted_by_points(&teams).unwrap_err().is_fatal());
        assert!(check_team_count(&teams[..1], 2).unwrap_err().is_user_error());
        assert!(check_team_count(&[], 2).unwrap_err().is_user_error());
        assert!(check_team_count(&teams, 2).is_ok());

        let options = PairOptions::default();
        assert!(check_pair_attributes(&teams, &options).is_err());
        let relaxed = options
            .with_side_allocations(SideAllocation::Random)
            .with_conflict_checks(false, true);
        assert!(check_pair_attributes(&teams, &relaxed).is_ok());
    }
}
