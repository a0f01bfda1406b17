//! Generator framework - the capability interface, the generator family and its factory
//!
//! Level 1 - Orchestration
//!
//! Every generator goes through the same lifecycle: options are validated
//! when it is built, then each call checks the participants, makes the
//! pairings and returns them. [`DrawGenerator::generate`] owns the shared part
//! of that lifecycle; concrete generators only supply their checks and
//! [`DrawGenerator::make_draw`].

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tabdraw_core::{
    BpResultPairing, ConfigError, DrawUserError, Pairing, Participant, Result, ResultPairing,
};

use crate::bp_elimination::{
    AfterPartialBpEliminationDrawGenerator, FirstBpEliminationDrawGenerator,
    PartialBpEliminationDrawGenerator, SubsequentBpEliminationDrawGenerator,
};
use crate::bp_hungarian::BpHungarianDrawGenerator;
use crate::context::check_team_count;
use crate::elimination::{FirstEliminationDrawGenerator, SubsequentEliminationDrawGenerator};
use crate::options::{
    expect_no_options, AllocatedPowerPairConfig, BpHungarianConfig, OptionMap, OptionValue,
    PairOptions, PowerPairConfig, RandomConfig, RoundRobinConfig,
};
use crate::powerpair::PowerPairedDrawGenerator;
use crate::powerpair_sided::AllocatedPowerPairedDrawGenerator;
use crate::random::{RandomBpDrawGenerator, RandomDrawGenerator, RandomPolyDrawGenerator};
use crate::round_robin::RoundRobinDrawGenerator;

/// Debate format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Two teams per debate
    TwoTeam,
    /// British Parliamentary, four teams per debate
    Bp,
    /// Any fixed number of teams per debate; only random draws are supported
    Poly(usize),
}

impl Format {
    pub fn teams_per_debate(self) -> usize {
        match self {
            Format::TwoTeam => 2,
            Format::Bp => 4,
            Format::Poly(n) => n,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::TwoTeam => "two_team",
            Format::Bp => "bp",
            Format::Poly(_) => "poly",
        }
    }
}

/// Kind of round being drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawType {
    Manual,
    Random,
    PowerPaired,
    FirstElimination,
    Elimination,
    PartialElimination,
    AfterPartialElimination,
    RoundRobin,
}

impl DrawType {
    pub const ALL: [DrawType; 8] = [
        DrawType::Manual,
        DrawType::Random,
        DrawType::PowerPaired,
        DrawType::FirstElimination,
        DrawType::Elimination,
        DrawType::PartialElimination,
        DrawType::AfterPartialElimination,
        DrawType::RoundRobin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DrawType::Manual => "manual",
            DrawType::Random => "random",
            DrawType::PowerPaired => "power_paired",
            DrawType::FirstElimination => "first_elimination",
            DrawType::Elimination => "elimination",
            DrawType::PartialElimination => "partial_elimination",
            DrawType::AfterPartialElimination => "after_partial_elimination",
            DrawType::RoundRobin => "round_robin",
        }
    }
}

/// Results of the previous round, for elimination draws
#[derive(Clone, Debug, PartialEq)]
pub enum PriorResults {
    TwoTeam(Vec<ResultPairing>),
    Bp(Vec<BpResultPairing>),
}

impl PriorResults {
    pub fn len(&self) -> usize {
        match self {
            PriorResults::TwoTeam(results) => results.len(),
            PriorResults::Bp(results) => results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// CAPABILITY INTERFACE
// ============================================================================

/// A draw generator
pub trait DrawGenerator {
    /// Teams in each debate
    fn teams_per_debate(&self) -> usize;

    /// Whether the team count must be a multiple of the debate size
    fn requires_even_teams(&self) -> bool {
        true
    }

    /// Whether previous-round results must be supplied
    fn requires_prev_results(&self) -> bool {
        false
    }

    /// Check the participants carry what this generator reads
    fn check_teams(&self, _teams: &[Participant]) -> Result<()> {
        Ok(())
    }

    /// Produce the pairings; called after every check has passed
    fn make_draw(
        &self,
        teams: &[Participant],
        results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>>;

    /// Generate a draw
    ///
    /// # Arguments
    /// * `teams` - participants, in standings order
    /// * `results` - previous-round results, for elimination draws
    /// * `rng` - the only source of randomness used
    ///
    /// # Returns
    /// Pairings in room-rank order
    fn generate(
        &self,
        teams: &[Participant],
        results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        if self.requires_even_teams() {
            check_team_count(teams, self.teams_per_debate())?;
        }
        match results {
            None if self.requires_prev_results() => {
                return Err(DrawUserError::MissingPriorResults.into());
            }
            Some(_) if !self.requires_prev_results() => {
                tracing::warn!("Prior results supplied to a draw that doesn't use them; they will be ignored");
            }
            _ => {}
        }
        self.check_teams(teams)?;

        let pairings = self.make_draw(teams, results, rng)?;
        tracing::debug!(rooms = pairings.len(), teams = teams.len(), "Draw generated");
        Ok(pairings)
    }
}

/// Returns an empty draw, for rounds drawn by hand
#[derive(Clone, Debug, PartialEq)]
pub struct ManualDrawGenerator {
    format: Format,
}

impl ManualDrawGenerator {
    pub fn new(format: Format) -> Self {
        Self { format }
    }
}

impl DrawGenerator for ManualDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        self.format.teams_per_debate()
    }

    fn requires_even_teams(&self) -> bool {
        false
    }

    fn make_draw(
        &self,
        _teams: &[Participant],
        _results: Option<&PriorResults>,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// GENERATOR FAMILY
// ============================================================================

/// Every concrete generator, selected once by [`build_generator`]
#[derive(Clone, Debug)]
pub enum Generator {
    Manual(ManualDrawGenerator),
    Random(RandomDrawGenerator),
    RandomBp(RandomBpDrawGenerator),
    RandomPoly(RandomPolyDrawGenerator),
    PowerPaired(PowerPairedDrawGenerator),
    PowerPairedWithAllocatedSides(AllocatedPowerPairedDrawGenerator),
    FirstElimination(FirstEliminationDrawGenerator),
    Elimination(SubsequentEliminationDrawGenerator),
    PartialBpElimination(PartialBpEliminationDrawGenerator),
    AfterPartialBpElimination(AfterPartialBpEliminationDrawGenerator),
    FirstBpElimination(FirstBpEliminationDrawGenerator),
    BpElimination(SubsequentBpEliminationDrawGenerator),
    BpHungarian(BpHungarianDrawGenerator),
    RoundRobin(RoundRobinDrawGenerator),
}

impl Generator {
    fn inner(&self) -> &dyn DrawGenerator {
        match self {
            Generator::Manual(g) => g,
            Generator::Random(g) => g,
            Generator::RandomBp(g) => g,
            Generator::RandomPoly(g) => g,
            Generator::PowerPaired(g) => g,
            Generator::PowerPairedWithAllocatedSides(g) => g,
            Generator::FirstElimination(g) => g,
            Generator::Elimination(g) => g,
            Generator::PartialBpElimination(g) => g,
            Generator::AfterPartialBpElimination(g) => g,
            Generator::FirstBpElimination(g) => g,
            Generator::BpElimination(g) => g,
            Generator::BpHungarian(g) => g,
            Generator::RoundRobin(g) => g,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Manual(_) => "manual",
            Generator::Random(_) => "random",
            Generator::RandomBp(_) => "random_bp",
            Generator::RandomPoly(_) => "random_poly",
            Generator::PowerPaired(_) => "power_paired",
            Generator::PowerPairedWithAllocatedSides(_) => "power_paired_allocated_sides",
            Generator::FirstElimination(_) => "first_elimination",
            Generator::Elimination(_) => "elimination",
            Generator::PartialBpElimination(_) => "partial_bp_elimination",
            Generator::AfterPartialBpElimination(_) => "after_partial_bp_elimination",
            Generator::FirstBpElimination(_) => "first_bp_elimination",
            Generator::BpElimination(_) => "bp_elimination",
            Generator::BpHungarian(_) => "bp_hungarian",
            Generator::RoundRobin(_) => "round_robin",
        }
    }
}

impl DrawGenerator for Generator {
    fn teams_per_debate(&self) -> usize {
        self.inner().teams_per_debate()
    }

    fn requires_even_teams(&self) -> bool {
        self.inner().requires_even_teams()
    }

    fn requires_prev_results(&self) -> bool {
        self.inner().requires_prev_results()
    }

    fn check_teams(&self, teams: &[Participant]) -> Result<()> {
        self.inner().check_teams(teams)
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        self.inner().make_draw(teams, results, rng)
    }
}

// ============================================================================
// FACTORY
// ============================================================================

fn preallocated(options: &OptionMap) -> bool {
    matches!(options.get("side_allocations"), Some(OptionValue::Text(v)) if v == "preallocated")
}

/// A room needs at least two teams
fn check_format(format: Format) -> Result<()> {
    if format.teams_per_debate() < 2 {
        return Err(ConfigError::InvalidValue {
            option: "teams_per_debate".to_string(),
            value: format.teams_per_debate().to_string(),
        }
        .into());
    }
    Ok(())
}

fn unsupported(format: Format, draw_type: DrawType) -> ConfigError {
    ConfigError::UnsupportedDrawType {
        draw_type: draw_type.name().to_string(),
        format: format.name().to_string(),
    }
}

/// Build the generator for a format and draw type, validating its options
///
/// # Arguments
/// * `format` - two-team, BP or polyformat
/// * `draw_type` - kind of round
/// * `options` - flat option map; unknown keys are rejected
pub fn build_generator(format: Format, draw_type: DrawType, options: &OptionMap) -> Result<Generator> {
    check_format(format)?;
    let generator = match (format, draw_type) {
        (_, DrawType::Manual) => {
            expect_no_options(options)?;
            Generator::Manual(ManualDrawGenerator::new(format))
        }
        (Format::TwoTeam, DrawType::Random) => {
            Generator::Random(RandomDrawGenerator::new(RandomConfig::from_options(options)?))
        }
        (Format::TwoTeam, DrawType::RoundRobin) => {
            Generator::RoundRobin(RoundRobinDrawGenerator::new(RoundRobinConfig::from_options(options)?))
        }
        (Format::TwoTeam, DrawType::PowerPaired) if preallocated(options) => {
            Generator::PowerPairedWithAllocatedSides(AllocatedPowerPairedDrawGenerator::new(
                AllocatedPowerPairConfig::from_options(options)?,
            ))
        }
        (Format::TwoTeam, DrawType::PowerPaired) => {
            Generator::PowerPaired(PowerPairedDrawGenerator::new(PowerPairConfig::from_options(options)?))
        }
        (Format::TwoTeam, DrawType::FirstElimination) => {
            PairOptions::from_options(options)?;
            Generator::FirstElimination(FirstEliminationDrawGenerator)
        }
        (Format::TwoTeam, DrawType::Elimination) => {
            PairOptions::from_options(options)?;
            Generator::Elimination(SubsequentEliminationDrawGenerator)
        }
        (Format::Bp, DrawType::Random) => {
            expect_no_options(options)?;
            Generator::RandomBp(RandomBpDrawGenerator)
        }
        (Format::Bp, DrawType::PowerPaired) => {
            Generator::BpHungarian(BpHungarianDrawGenerator::new(BpHungarianConfig::from_options(options)?))
        }
        (Format::Bp, DrawType::PartialElimination) => {
            expect_no_options(options)?;
            Generator::PartialBpElimination(PartialBpEliminationDrawGenerator)
        }
        (Format::Bp, DrawType::AfterPartialElimination) => {
            expect_no_options(options)?;
            Generator::AfterPartialBpElimination(AfterPartialBpEliminationDrawGenerator)
        }
        (Format::Bp, DrawType::FirstElimination) => {
            expect_no_options(options)?;
            Generator::FirstBpElimination(FirstBpEliminationDrawGenerator)
        }
        (Format::Bp, DrawType::Elimination) => {
            expect_no_options(options)?;
            Generator::BpElimination(SubsequentBpEliminationDrawGenerator)
        }
        (Format::Poly(n), DrawType::Random) => {
            expect_no_options(options)?;
            Generator::RandomPoly(RandomPolyDrawGenerator::new(n))
        }
        (Format::TwoTeam, DrawType::PartialElimination | DrawType::AfterPartialElimination)
        | (Format::Bp, DrawType::RoundRobin)
        | (Format::Poly(_), _) => {
            return Err(unsupported(format, draw_type).into());
        }
    };

    tracing::debug!(generator = generator.name(), "Built draw generator");
    Ok(generator)
}

/// Option keys recognised by the generator `build_generator` would choose, sorted
pub fn available_options(format: Format, draw_type: DrawType, options: &OptionMap) -> Result<Vec<&'static str>> {
    check_format(format)?;
    let base = PairOptions::KEYS;
    let mut keys: Vec<&'static str> = match (format, draw_type) {
        (_, DrawType::Manual) => Vec::new(),
        (Format::TwoTeam, DrawType::Random) => [base, RandomConfig::KEYS].concat(),
        (Format::TwoTeam, DrawType::PowerPaired) if preallocated(options) => {
            [base, AllocatedPowerPairConfig::KEYS].concat()
        }
        (Format::TwoTeam, DrawType::PowerPaired) => [base, PowerPairConfig::KEYS].concat(),
        (Format::TwoTeam, DrawType::FirstElimination | DrawType::Elimination) => base.to_vec(),
        (Format::TwoTeam, DrawType::RoundRobin) => [base, RoundRobinConfig::KEYS].concat(),
        (Format::Poly(_), DrawType::Random) => Vec::new(),
        (Format::TwoTeam, DrawType::PartialElimination | DrawType::AfterPartialElimination)
        | (Format::Bp, DrawType::RoundRobin)
        | (Format::Poly(_), _) => {
            return Err(unsupported(format, draw_type).into());
        }
        (Format::Bp, DrawType::PowerPaired) => BpHungarianConfig::KEYS.to_vec(),
        (Format::Bp, _) => Vec::new(),
    };
    keys.sort_unstable();
    Ok(keys)
}
