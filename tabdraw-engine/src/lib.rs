//! TABDRAW Engine - Draw generators for debating tournaments
//!
//! This crate turns a list of teams (and, for elimination rounds, the results
//! of the previous round) into the pairings for a round:
//! - Random draws, two-team, BP and polyformat
//! - Power-paired two-team draws, with free or preallocated sides
//! - Graph pairing by minimum-cost matching, for random and power-paired draws
//! - Round-robin draws within divisions
//! - Power-paired BP draws by minimum-cost assignment
//! - Two-team and BP elimination rounds, with partial breaks
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: build_generator, DrawGenerator::generate (orchestration)
//! - Level 2: make_draw of each generator (phases)
//! - Level 3: brackets, pull-ups, pairing methods, room layouts (steps)
//! - Level 4: option parsing, checks, side allocation (utilities)

mod bp_elimination;
mod bp_hungarian;
mod context;
mod elimination;
mod generator;
mod graph;
mod options;
mod powerpair;
mod powerpair_sided;
mod random;
mod round_robin;

pub use bp_elimination::{
    four_way_fold, AfterPartialBpEliminationDrawGenerator, FirstBpEliminationDrawGenerator,
    PartialBpEliminationDrawGenerator, SubsequentBpEliminationDrawGenerator,
};
pub use bp_hungarian::{define_rooms, BpHungarianDrawGenerator, CostFunction, RoomSpec};
pub use elimination::{
    is_pow2, next_pow2, partial_break_round_split, FirstEliminationDrawGenerator,
    SubsequentEliminationDrawGenerator,
};
pub use generator::{
    available_options, build_generator, DrawGenerator, DrawType, Format, Generator, ManualDrawGenerator,
    PriorResults,
};
pub use options::{
    option_map, AllocatedPowerPairConfig, AssignmentMethod, BpHungarianConfig, Choice, ConflictAvoidance,
    OddBracket, OptionMap, OptionValue, PairOptions, PairingMethod, PositionCost, PowerPairConfig,
    PullupRestriction, RandomConfig, RoomPullup, RoundRobinConfig, SideAllocation, SidedOddBracket, SidedPairingMethod,
};
pub use powerpair::{make_raw_brackets, Bracket, PowerPairedDrawGenerator};
pub use powerpair_sided::{make_sided_brackets, AllocatedPowerPairedDrawGenerator, SidedBracket};
pub use graph::pairing_penalty;
pub use random::{RandomBpDrawGenerator, RandomDrawGenerator, RandomPolyDrawGenerator};
pub use round_robin::{make_division_brackets, RoundRobinDrawGenerator};
