//! Error taxonomy for draw generation
//!
//! Three kinds of failure are kept apart:
//! - [`DrawUserError`]: the input is wrong in a way the tournament operator can fix
//! - [`DrawFatalError`]: an internal invariant was violated (a bug or malformed caller state)
//! - [`ConfigError`]: the generator was configured with bad options

use thiserror::Error;

use crate::participant::TeamId;

/// Result alias used throughout the draw crates
pub type Result<T> = std::result::Result<T, DrawError>;

/// Any failure raised while building a generator or generating a draw
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    #[error(transparent)]
    User(#[from] DrawUserError),
    #[error(transparent)]
    Fatal(#[from] DrawFatalError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DrawError {
    /// Whether the operator can fix this by correcting the input
    pub fn is_user_error(&self) -> bool {
        matches!(self, DrawError::User(_))
    }

    /// Whether this indicates an internal failure
    pub fn is_fatal(&self) -> bool {
        matches!(self, DrawError::Fatal(_))
    }
}

/// Input problems the operator can correct
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawUserError {
    #[error("There were no teams for the draw.")]
    NoTeams,

    #[error("The number of teams presented for the draw ({teams}) was not a multiple of {per_debate}.")]
    TeamCountNotMultiple { teams: usize, per_debate: usize },

    #[error("There are only {0} teams breaking in this category; there need to be at least two to generate an elimination round draw.")]
    TooFewBreakingTeams(usize),

    #[error("There were {aff} affirmative teams but {neg} negative teams.")]
    SideCountMismatch { aff: usize, neg: usize },

    #[error("{noninteger} out of {total} teams have a noninteger first metric in the team standings. Intermediate brackets require the first team standings metric to be an integer (typically points or wins).")]
    NonIntegerPoints { noninteger: usize, total: usize },

    #[error("Results from the previous round are required for this draw type.")]
    MissingPriorResults,

    #[error("{0} debates in the previous round don't have a result.")]
    UnresolvedDebates(usize),

    #[error("{0} debates in the previous round don't have exactly two teams advancing.")]
    WrongAdvancingCount(usize),

    #[error("The number of teams ({0}) in this round is not a power of two.")]
    TeamsNotPowerOfTwo(usize),

    #[error("The number of debates ({0}) in the previous round is not a power of two of at least two.")]
    DebatesNotPowerOfTwo(usize),

    #[error("The room ranks of the partial elimination round indicate that an odd number of teams ({0}) bypassed it.")]
    OddBypassCount(usize),

    #[error("The room ranks of the partial elimination round indicate that {bypassing} teams bypassed it, but {debates} debates were held in it.")]
    BypassMismatch { bypassing: usize, debates: usize },

    #[error("{needed} teams were expected to bypass the previous round, but only {available} teams were presented.")]
    NotEnoughBypassingTeams { needed: usize, available: usize },

    #[error("The Rényi order can't be negative, and it's currently set to {0}.")]
    NegativeRenyiOrder(f64),

    #[error("Team {team} is not in the debate ranked {room_rank}.")]
    TeamNotInPairing { team: TeamId, room_rank: u32 },
}

/// Internal invariant violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawFatalError {
    #[error("The last bracket ({0}) is still odd after pull-ups.")]
    OddLastBracket(f64),

    #[error("The last brackets still needed pull-ups: {0} teams short.")]
    UnfilledPullups(usize),

    #[error("There are still unfilled intermediate brackets: {0:?}")]
    UnfilledIntermediateBrackets(Vec<f64>),

    #[error("Unfilled pool at bracket {0} had both affirmative and negative teams.")]
    MixedUnfilledPool(f64),

    #[error("Bracket {points} has {aff} affirmative teams but {neg} negative teams.")]
    UnbalancedBracket { points: f64, aff: usize, neg: usize },

    #[error("{offending} out of {total} teams don't have a valid '{attribute}' attribute.")]
    InvalidAttribute {
        attribute: &'static str,
        offending: usize,
        total: usize,
    },

    #[error("Teams must be presented in order of non-increasing points (team at position {0} is out of order).")]
    UnsortedTeams(usize),

    #[error("Tried to do a {kind} draw with an invalid break size: {size}")]
    InvalidBreakSize { kind: &'static str, size: usize },

    #[error("Tried to do a four-way fold with a non-multiple of four: {0}")]
    FourWayFold(usize),

    #[error("Break rounds only make sense for break sizes above 1, found {0}.")]
    BreakTooSmall(usize),

    #[error("Room {0} was left with fewer than four teams.")]
    IncompleteRoom(u32),

    #[error("No feasible assignment exists for a {0}x{0} cost matrix.")]
    InfeasibleAssignment(usize),

    #[error("No perfect matching exists among {0} teams.")]
    NoPerfectMatching(usize),

    #[error("The cost matrix is not square: {rows} rows, {columns} columns in row {row}.")]
    NonSquareCostMatrix { rows: usize, columns: usize, row: usize },
}

/// Generator configuration problems
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unrecognised options: {}", .0.join(", "))]
    UnknownOptions(Vec<String>),

    #[error("Option '{option}' expects {expected}.")]
    WrongType {
        option: String,
        expected: &'static str,
    },

    #[error("Invalid value for option '{option}': {value}")]
    InvalidValue { option: String, value: String },

    #[error("The draw type '{draw_type}' can't be used with the {format} format.")]
    UnsupportedDrawType { draw_type: String, format: String },

    #[error("Option '{0}' is required for this draw type.")]
    MissingOption(String),
}
