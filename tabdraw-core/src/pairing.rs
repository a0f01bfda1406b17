//! Pairings and prior-round results
//!
//! A [`Pairing`] is one debate: its teams in side order, the bracket it was
//! drawn from, its room rank and any flags. Generators work on
//! `Pairing<usize>` (indices into the participant slice) and hand back
//! `Pairing<TeamId>`.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DrawUserError, Result};
use crate::flags::DrawFlag;
use crate::participant::TeamId;

/// One debate in a draw
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Ord",
    deserialize = "T: Deserialize<'de> + Ord"
))]
pub struct Pairing<T = TeamId> {
    /// Teams in side order (aff/neg, or OG/OO/CG/CO)
    pub teams: Vec<T>,
    /// Bracket (points level) the debate was drawn from
    pub bracket: f64,
    /// Rank of the room, 1 being the top room
    pub room_rank: u32,
    /// Debate-level flags
    #[serde(default)]
    pub flags: Vec<DrawFlag>,
    /// Per-team flags
    #[serde(default)]
    pub team_flags: BTreeMap<T, Vec<DrawFlag>>,
}

impl<T: Copy + Ord> Pairing<T> {
    /// Create an unflagged pairing
    pub fn new(teams: Vec<T>, bracket: f64, room_rank: u32) -> Self {
        Self {
            teams,
            bracket,
            room_rank,
            flags: Vec::new(),
            team_flags: BTreeMap::new(),
        }
    }

    /// Number of teams (sides) in this debate
    pub fn num_sides(&self) -> usize {
        self.teams.len()
    }

    /// Whether `team` is in this debate
    pub fn contains(&self, team: T) -> bool {
        self.teams.contains(&team)
    }

    /// Team on the first side
    pub fn aff(&self) -> Option<T> {
        self.teams.first().copied()
    }

    /// Team on the second side
    pub fn neg(&self) -> Option<T> {
        self.teams.get(1).copied()
    }

    /// Add a debate-level flag
    pub fn add_flag(&mut self, flag: DrawFlag) {
        self.flags.push(flag);
    }

    /// Add several debate-level flags
    pub fn add_flags(&mut self, flags: impl IntoIterator<Item = DrawFlag>) {
        self.flags.extend(flags);
    }

    /// Attach flags to a team in this debate
    pub fn add_team_flags(&mut self, team: T, flags: impl IntoIterator<Item = DrawFlag>) {
        let mut flags = flags.into_iter().peekable();
        if flags.peek().is_some() {
            self.team_flags.entry(team).or_default().extend(flags);
        }
    }

    /// Flags attached to `team` (empty if none)
    pub fn flags_for(&self, team: T) -> &[DrawFlag] {
        self.team_flags.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Swap the first two sides
    pub fn reverse_sides(&mut self) {
        if self.teams.len() >= 2 {
            self.teams.swap(0, 1);
        }
    }

    /// Randomly permute the side order
    pub fn shuffle_sides<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.teams.shuffle(rng);
    }

    /// Replace team handles, keeping bracket, rank and flags
    pub fn map_teams<U: Copy + Ord>(self, mut f: impl FnMut(T) -> U) -> Pairing<U> {
        Pairing {
            teams: self.teams.iter().map(|&t| f(t)).collect(),
            bracket: self.bracket,
            room_rank: self.room_rank,
            flags: self.flags,
            team_flags: self
                .team_flags
                .into_iter()
                .map(|(team, flags)| (f(team), flags))
                .collect(),
        }
    }
}

/// A prior two-team debate with its winner
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultPairing {
    pub pairing: Pairing,
    winner: Option<TeamId>,
}

impl ResultPairing {
    /// Create a result, checking the winner took part in the debate
    pub fn new(pairing: Pairing, winner: Option<TeamId>) -> Result<Self> {
        let mut result = Self {
            pairing,
            winner: None,
        };
        result.set_winner(winner)?;
        Ok(result)
    }

    /// Winning team, if the debate has been decided
    pub fn winner(&self) -> Option<TeamId> {
        self.winner
    }

    /// Losing team, if the debate has been decided
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        self.pairing.teams.iter().copied().find(|&t| t != winner)
    }

    /// Record (or clear) the winner
    pub fn set_winner(&mut self, winner: Option<TeamId>) -> Result<()> {
        if let Some(team) = winner {
            if !self.pairing.contains(team) {
                return Err(DrawUserError::TeamNotInPairing {
                    team,
                    room_rank: self.pairing.room_rank,
                }
                .into());
            }
        }
        self.winner = winner;
        Ok(())
    }

    pub fn room_rank(&self) -> u32 {
        self.pairing.room_rank
    }
}

/// A prior BP debate with the teams that advanced from it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BpResultPairing {
    pub pairing: Pairing,
    advancing: Vec<TeamId>,
}

impl BpResultPairing {
    /// Create a result, checking every advancing team took part in the debate
    pub fn new(pairing: Pairing, advancing: Vec<TeamId>) -> Result<Self> {
        let mut result = Self {
            pairing,
            advancing: Vec::new(),
        };
        result.set_advancing(advancing)?;
        Ok(result)
    }

    /// Teams advancing from this room
    pub fn advancing(&self) -> &[TeamId] {
        &self.advancing
    }

    /// Record the advancing teams
    pub fn set_advancing(&mut self, advancing: Vec<TeamId>) -> Result<()> {
        if let Some(&team) = advancing.iter().find(|&&t| !self.pairing.contains(t)) {
            return Err(DrawUserError::TeamNotInPairing {
                team,
                room_rank: self.pairing.room_rank,
            }
            .into());
        }
        self.advancing = advancing;
        Ok(())
    }

    pub fn room_rank(&self) -> u32 {
        self.pairing.room_rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_team_flags_skip_empty() {
        let mut pairing = Pairing::new(vec![1u32, 2], 3.0, 1);
        pairing.add_team_flags(1, Vec::new());
        assert!(pairing.team_flags.is_empty());
        pairing.add_team_flags(2, vec![DrawFlag::Pullup]);
        assert_eq!(pairing.flags_for(2), &[DrawFlag::Pullup]);
        assert!(pairing.flags_for(1).is_empty());
    }

    #[test]
    fn test_map_teams_rekeys_flags() {
        let mut pairing: Pairing<usize> = Pairing::new(vec![0, 1], 2.0, 4);
        pairing.add_team_flags(1, vec![DrawFlag::BubbleUpAccommodate]);
        pairing.add_flag(DrawFlag::OneUpOneDownOther);
        let ids = [10u32, 20];
        let mapped = pairing.map_teams(|i| ids[i]);
        assert_eq!(mapped.teams, vec![10, 20]);
        assert_eq!(mapped.flags_for(20), &[DrawFlag::BubbleUpAccommodate]);
        assert_eq!(mapped.flags, vec![DrawFlag::OneUpOneDownOther]);
        assert_eq!(mapped.room_rank, 4);
    }

    #[test]
    fn test_shuffle_sides_keeps_teams() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut pairing = Pairing::new(vec![1u32, 2, 3, 4], 0.0, 1);
        pairing.shuffle_sides(&mut rng);
        let mut teams = pairing.teams.clone();
        teams.sort();
        assert_eq!(teams, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_result_winner_must_be_in_debate() {
        let pairing = Pairing::new(vec![1u32, 2], 0.0, 3);
        assert!(ResultPairing::new(pairing.clone(), Some(5)).is_err());
        let result = ResultPairing::new(pairing, Some(2)).unwrap();
        assert_eq!(result.winner(), Some(2));
        assert_eq!(result.loser(), Some(1));
        assert_eq!(result.room_rank(), 3);
    }

    #[test]
    fn test_bp_advancing_must_be_in_debate() {
        let pairing = Pairing::new(vec![1u32, 2, 3, 4], 0.0, 1);
        assert!(BpResultPairing::new(pairing.clone(), vec![1, 9]).is_err());
        let result = BpResultPairing::new(pairing, vec![4, 2]).unwrap();
        assert_eq!(result.advancing(), &[4, 2]);
    }
}
