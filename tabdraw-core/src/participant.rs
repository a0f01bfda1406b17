//! Participants - the teams a draw is generated for
//!
//! Generators never look at anything but the fields below. Optional fields
//! are only required by the strategies that read them; each generator checks
//! its own requirements before drawing.

use serde::{Deserialize, Serialize};

/// Stable identifier of a team across rounds
pub type TeamId = u32;

/// Side of a two-team debate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Affirmative (proposition / government)
    Aff,
    /// Negative (opposition)
    Neg,
}

impl Side {
    /// Position of this side within a two-team pairing
    pub fn index(self) -> usize {
        match self {
            Side::Aff => 0,
            Side::Neg => 1,
        }
    }

    /// The other side
    pub fn opposite(self) -> Side {
        match self {
            Side::Aff => Side::Neg,
            Side::Neg => Side::Aff,
        }
    }
}

/// A team presented to a draw generator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Team identifier, unique within a draw
    pub id: TeamId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Primary standings metric (usually wins or points)
    #[serde(default)]
    pub points: f64,
    /// Institution the team belongs to; unaffiliated teams never clash
    #[serde(default)]
    pub institution: Option<String>,
    /// Opponents faced in earlier rounds, one entry per meeting.
    /// `None` when no history is available.
    #[serde(default)]
    pub opponents: Option<Vec<TeamId>>,
    /// Times the team has held each position (2 entries for two-team, 4 for BP)
    #[serde(default)]
    pub side_history: Vec<u32>,
    /// Side fixed in advance, if sides are preallocated
    #[serde(default)]
    pub allocated_side: Option<Side>,
    /// Times the team has been pulled up
    #[serde(default)]
    pub npullups: Option<u32>,
    /// Sum of opponents' points
    #[serde(default)]
    pub draw_strength: Option<f64>,
    /// Sum of opponents' speaker scores
    #[serde(default)]
    pub draw_strength_speaks: Option<f64>,
    /// Division the team plays in, for round-robin draws
    #[serde(default)]
    pub division: Option<u32>,
}

impl Participant {
    /// Create a team with the given id and points and nothing else
    pub fn new(id: TeamId, points: f64) -> Self {
        Self {
            id,
            name: format!("Team {}", id),
            points,
            institution: None,
            opponents: None,
            side_history: Vec::new(),
            allocated_side: None,
            npullups: None,
            draw_strength: None,
            draw_strength_speaks: None,
            division: None,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set institution
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    /// Set the list of past opponents
    pub fn with_opponents(mut self, opponents: Vec<TeamId>) -> Self {
        self.opponents = Some(opponents);
        self
    }

    /// Set per-position side history
    pub fn with_side_history(mut self, side_history: Vec<u32>) -> Self {
        self.side_history = side_history;
        self
    }

    /// Fix the side this team must take
    pub fn with_allocated_side(mut self, side: Side) -> Self {
        self.allocated_side = Some(side);
        self
    }

    /// Set pull-up count
    pub fn with_npullups(mut self, npullups: u32) -> Self {
        self.npullups = Some(npullups);
        self
    }

    /// Set draw strength
    pub fn with_draw_strength(mut self, draw_strength: f64) -> Self {
        self.draw_strength = Some(draw_strength);
        self
    }

    /// Set draw strength by speaker scores
    pub fn with_draw_strength_speaks(mut self, draw_strength_speaks: f64) -> Self {
        self.draw_strength_speaks = Some(draw_strength_speaks);
        self
    }

    /// Place the team in a division
    pub fn with_division(mut self, division: u32) -> Self {
        self.division = Some(division);
        self
    }

    /// Number of times this team has met `other`
    pub fn seen(&self, other: &Participant) -> u32 {
        self.opponents
            .as_ref()
            .map(|opponents| opponents.iter().filter(|&&id| id == other.id).count() as u32)
            .unwrap_or(0)
    }

    /// Whether both teams belong to the same (known) institution
    pub fn same_institution(&self, other: &Participant) -> bool {
        matches!(
            (&self.institution, &other.institution),
            (Some(a), Some(b)) if a == b
        )
    }

    /// Affirmative count minus negative count (two-team side history)
    pub fn side_imbalance(&self) -> i64 {
        let aff = self.side_history.first().copied().unwrap_or(0) as i64;
        let neg = self.side_history.get(1).copied().unwrap_or(0) as i64;
        aff - neg
    }

    /// Whether the points value is a whole number
    pub fn has_integer_points(&self) -> bool {
        self.points.fract() == 0.0
    }
}
