//! Generator options - the flat option map and the typed configs read from it
//!
//! Level 4 - Utilities and configuration
//!
//! Every generator family declares its option keys and defaults here. A map
//! with a key outside the declared table, a value of the wrong type, or a
//! string outside the allowed choices is rejected when the generator is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabdraw_core::{ConfigError, DrawUserError, Result, SwapOptimizer};

/// A single option value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

/// Flat option map as supplied by the caller
pub type OptionMap = BTreeMap<String, OptionValue>;

/// Build an option map from key/value pairs
pub fn option_map<V: Into<OptionValue>>(entries: impl IntoIterator<Item = (&'static str, V)>) -> OptionMap {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.into()))
        .collect()
}

// ============================================================================
// CHOICE OPTIONS
// ============================================================================

/// A string-valued option with a closed set of choices
pub trait Choice: Copy + PartialEq + 'static {
    /// Accepted names, aliases included
    const CHOICES: &'static [(&'static str, Self)];

    fn parse(value: &str) -> Option<Self> {
        Self::CHOICES
            .iter()
            .find(|(name, _)| *name == value)
            .map(|(_, choice)| *choice)
    }

    /// Canonical name
    fn name(self) -> &'static str;
}

/// How sides are decided once rooms are formed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideAllocation {
    /// Team with the larger aff surplus goes negative; ties broken randomly
    Balance,
    /// Uniform shuffle
    Random,
    /// Sides come from each team's `allocated_side`
    Preallocated,
    /// Leave sides as drawn
    None,
}

impl Choice for SideAllocation {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("balance", SideAllocation::Balance),
        ("random", SideAllocation::Random),
        ("preallocated", SideAllocation::Preallocated),
        ("none", SideAllocation::None),
    ];

    fn name(self) -> &'static str {
        match self {
            SideAllocation::Balance => "balance",
            SideAllocation::Random => "random",
            SideAllocation::Preallocated => "preallocated",
            SideAllocation::None => "none",
        }
    }
}

/// Odd-bracket resolution for power-paired draws
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OddBracket {
    PullupTop,
    PullupBottom,
    PullupMiddle,
    PullupRandom,
    Intermediate,
    IntermediateBubbleUpDown,
}

impl Choice for OddBracket {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("pullup_top", OddBracket::PullupTop),
        ("pullup_bottom", OddBracket::PullupBottom),
        ("pullup_middle", OddBracket::PullupMiddle),
        ("pullup_random", OddBracket::PullupRandom),
        ("intermediate", OddBracket::Intermediate),
        ("intermediate_bubble_up_down", OddBracket::IntermediateBubbleUpDown),
    ];

    fn name(self) -> &'static str {
        match self {
            OddBracket::PullupTop => "pullup_top",
            OddBracket::PullupBottom => "pullup_bottom",
            OddBracket::PullupMiddle => "pullup_middle",
            OddBracket::PullupRandom => "pullup_random",
            OddBracket::Intermediate => "intermediate",
            OddBracket::IntermediateBubbleUpDown => "intermediate_bubble_up_down",
        }
    }
}

impl OddBracket {
    pub fn is_intermediate(self) -> bool {
        matches!(self, OddBracket::Intermediate | OddBracket::IntermediateBubbleUpDown)
    }
}

/// How teams within a bracket are paired
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairingMethod {
    Slide,
    Fold,
    Random,
    Adjacent,
    FoldTopAdjacentRest,
}

impl Choice for PairingMethod {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("slide", PairingMethod::Slide),
        ("fold", PairingMethod::Fold),
        ("random", PairingMethod::Random),
        ("adjacent", PairingMethod::Adjacent),
        ("fold_top_adjacent_rest", PairingMethod::FoldTopAdjacentRest),
    ];

    fn name(self) -> &'static str {
        match self {
            PairingMethod::Slide => "slide",
            PairingMethod::Fold => "fold",
            PairingMethod::Random => "random",
            PairingMethod::Adjacent => "adjacent",
            PairingMethod::FoldTopAdjacentRest => "fold_top_adjacent_rest",
        }
    }
}

/// Conflict avoidance applied after pairing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictAvoidance {
    Off,
    /// One-up-one-down for power-paired draws, random swaps for random draws
    OneUpOneDown,
    /// Pair each bracket by minimum-cost matching over conflict penalties
    Graph,
}

impl Choice for ConflictAvoidance {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("off", ConflictAvoidance::Off),
        ("one_up_one_down", ConflictAvoidance::OneUpOneDown),
        ("on", ConflictAvoidance::OneUpOneDown),
        ("graph", ConflictAvoidance::Graph),
    ];

    fn name(self) -> &'static str {
        match self {
            ConflictAvoidance::Off => "off",
            ConflictAvoidance::OneUpOneDown => "one_up_one_down",
            ConflictAvoidance::Graph => "graph",
        }
    }
}

/// Which teams may be pulled up out of a bracket
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullupRestriction {
    None,
    /// Teams with the fewest pull-ups so far
    LeastToDate,
    /// Teams with the lowest draw strength by wins
    LowestDsWins,
    /// Teams with the lowest draw strength by speaks
    LowestDsSpeaks,
}

impl Choice for PullupRestriction {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("none", PullupRestriction::None),
        ("least_to_date", PullupRestriction::LeastToDate),
        ("lowest_ds_wins", PullupRestriction::LowestDsWins),
        ("lowest_ds_speaks", PullupRestriction::LowestDsSpeaks),
    ];

    fn name(self) -> &'static str {
        match self {
            PullupRestriction::None => "none",
            PullupRestriction::LeastToDate => "least_to_date",
            PullupRestriction::LowestDsWins => "lowest_ds_wins",
            PullupRestriction::LowestDsSpeaks => "lowest_ds_speaks",
        }
    }
}

/// Odd-bracket resolution when sides are preallocated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidedOddBracket {
    PullupTop,
    PullupBottom,
    PullupRandom,
    Intermediate1,
    Intermediate2,
}

impl Choice for SidedOddBracket {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("pullup_top", SidedOddBracket::PullupTop),
        ("pullup_bottom", SidedOddBracket::PullupBottom),
        ("pullup_random", SidedOddBracket::PullupRandom),
        ("intermediate1", SidedOddBracket::Intermediate1),
        ("intermediate2", SidedOddBracket::Intermediate2),
    ];

    fn name(self) -> &'static str {
        match self {
            SidedOddBracket::PullupTop => "pullup_top",
            SidedOddBracket::PullupBottom => "pullup_bottom",
            SidedOddBracket::PullupRandom => "pullup_random",
            SidedOddBracket::Intermediate1 => "intermediate1",
            SidedOddBracket::Intermediate2 => "intermediate2",
        }
    }
}

/// Pairing within a bracket when sides are preallocated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidedPairingMethod {
    Slide,
    Fold,
    Random,
}

impl Choice for SidedPairingMethod {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("slide", SidedPairingMethod::Slide),
        ("fold", SidedPairingMethod::Fold),
        ("random", SidedPairingMethod::Random),
    ];

    fn name(self) -> &'static str {
        match self {
            SidedPairingMethod::Slide => "slide",
            SidedPairingMethod::Fold => "fold",
            SidedPairingMethod::Random => "random",
        }
    }
}

/// Where BP pull-up teams may be placed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomPullup {
    /// Any room of the bracket above
    Anywhere,
    /// A single designated room
    OneRoom,
}

impl Choice for RoomPullup {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("anywhere", RoomPullup::Anywhere),
        ("one_room", RoomPullup::OneRoom),
    ];

    fn name(self) -> &'static str {
        match self {
            RoomPullup::Anywhere => "anywhere",
            RoomPullup::OneRoom => "one_room",
        }
    }
}

/// BP position cost family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionCost {
    Simple,
    Entropy,
    Variance,
}

impl Choice for PositionCost {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("simple", PositionCost::Simple),
        ("entropy", PositionCost::Entropy),
        ("variance", PositionCost::Variance),
    ];

    fn name(self) -> &'static str {
        match self {
            PositionCost::Simple => "simple",
            PositionCost::Entropy => "entropy",
            PositionCost::Variance => "variance",
        }
    }
}

/// BP assignment solver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentMethod {
    Hungarian,
    HungarianPreshuffled,
}

impl Choice for AssignmentMethod {
    const CHOICES: &'static [(&'static str, Self)] = &[
        ("hungarian", AssignmentMethod::Hungarian),
        ("hungarian_preshuffled", AssignmentMethod::HungarianPreshuffled),
    ];

    fn name(self) -> &'static str {
        match self {
            AssignmentMethod::Hungarian => "hungarian",
            AssignmentMethod::HungarianPreshuffled => "hungarian_preshuffled",
        }
    }
}

// ============================================================================
// OPTION READER
// ============================================================================

/// Typed access to an option map restricted to a set of keys
pub(crate) struct OptionReader<'a> {
    options: &'a OptionMap,
}

impl<'a> OptionReader<'a> {
    /// Reject any key not in `allowed`
    pub fn new(options: &'a OptionMap, allowed: &[&str]) -> std::result::Result<Self, ConfigError> {
        let unknown: Vec<String> = options
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownOptions(unknown));
        }
        Ok(Self { options })
    }

    pub fn flag(&self, key: &str, default: bool) -> std::result::Result<bool, ConfigError> {
        match self.options.get(key) {
            None => Ok(default),
            Some(OptionValue::Bool(value)) => Ok(*value),
            Some(_) => Err(wrong_type(key, "a boolean")),
        }
    }

    pub fn number(&self, key: &str, default: f64) -> std::result::Result<f64, ConfigError> {
        match self.options.get(key) {
            None => Ok(default),
            Some(OptionValue::Number(value)) if value.is_finite() => Ok(*value),
            Some(_) => Err(wrong_type(key, "a finite number")),
        }
    }

    pub fn count(&self, key: &str, default: usize) -> std::result::Result<usize, ConfigError> {
        match self.options.get(key) {
            None => Ok(default),
            Some(OptionValue::Number(value)) if *value >= 0.0 && value.fract() == 0.0 => {
                Ok(*value as usize)
            }
            Some(_) => Err(wrong_type(key, "a non-negative integer")),
        }
    }

    pub fn required_count(&self, key: &str) -> std::result::Result<usize, ConfigError> {
        if !self.options.contains_key(key) {
            return Err(ConfigError::MissingOption(key.to_string()));
        }
        self.count(key, 0)
    }

    pub fn choice<C: Choice>(&self, key: &str, default: C) -> std::result::Result<C, ConfigError> {
        match self.options.get(key) {
            None => Ok(default),
            Some(OptionValue::Text(value)) => C::parse(value).ok_or_else(|| ConfigError::InvalidValue {
                option: key.to_string(),
                value: value.clone(),
            }),
            Some(_) => Err(wrong_type(key, "a string")),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        option: key.to_string(),
        expected,
    }
}

// ============================================================================
// TYPED CONFIGS
// ============================================================================

/// Options shared by every two-team generator
#[derive(Clone, Debug, PartialEq)]
pub struct PairOptions {
    pub side_allocations: SideAllocation,
    pub avoid_history: bool,
    pub avoid_institution: bool,
    pub history_penalty: f64,
    pub institution_penalty: f64,
    /// Graph pairing cost per unit of shared side imbalance
    pub side_penalty: f64,
}

impl Default for PairOptions {
    fn default() -> Self {
        Self {
            side_allocations: SideAllocation::Balance,
            avoid_history: true,
            avoid_institution: true,
            history_penalty: 1e3,
            institution_penalty: 1.0,
            side_penalty: 0.0,
        }
    }
}

impl PairOptions {
    pub const KEYS: &'static [&'static str] = &[
        "side_allocations",
        "avoid_history",
        "avoid_institution",
        "history_penalty",
        "institution_penalty",
        "side_penalty",
    ];

    /// Read and validate the base two-team options
    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let reader = OptionReader::new(options, Self::KEYS)?;
        Ok(Self::read(&reader, Self::default())?)
    }

    fn read(reader: &OptionReader<'_>, defaults: Self) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            side_allocations: reader.choice("side_allocations", defaults.side_allocations)?,
            avoid_history: reader.flag("avoid_history", defaults.avoid_history)?,
            avoid_institution: reader.flag("avoid_institution", defaults.avoid_institution)?,
            history_penalty: reader.number("history_penalty", defaults.history_penalty)?,
            institution_penalty: reader.number("institution_penalty", defaults.institution_penalty)?,
            side_penalty: reader.number("side_penalty", defaults.side_penalty)?,
        })
    }

    /// Set side allocation policy
    pub fn with_side_allocations(mut self, side_allocations: SideAllocation) -> Self {
        self.side_allocations = side_allocations;
        self
    }

    /// Turn both kinds of conflict avoidance on or off
    pub fn with_conflict_checks(mut self, avoid_history: bool, avoid_institution: bool) -> Self {
        self.avoid_history = avoid_history;
        self.avoid_institution = avoid_institution;
        self
    }

    /// Set the side-imbalance penalty used by graph pairing
    pub fn with_side_penalty(mut self, side_penalty: f64) -> Self {
        self.side_penalty = side_penalty;
        self
    }

    /// Swap optimiser carrying these penalties
    pub fn optimizer(&self) -> SwapOptimizer {
        SwapOptimizer::new(
            self.avoid_history,
            self.avoid_institution,
            self.history_penalty,
            self.institution_penalty,
        )
    }
}

/// Random two-team draw configuration
#[derive(Clone, Debug, PartialEq)]
pub struct RandomConfig {
    pub base: PairOptions,
    /// Attempts per conflicted room before it is flagged
    pub max_swap_attempts: usize,
    pub avoid_conflicts: ConflictAvoidance,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            base: PairOptions::default(),
            max_swap_attempts: 20,
            avoid_conflicts: ConflictAvoidance::Off,
        }
    }
}

impl RandomConfig {
    pub const KEYS: &'static [&'static str] = &["max_swap_attempts", "avoid_conflicts"];

    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let reader = OptionReader::new(options, &all_keys(Self::KEYS))?;
        let defaults = Self::default();
        Ok(Self {
            base: PairOptions::read(&reader, defaults.base)?,
            max_swap_attempts: reader.count("max_swap_attempts", defaults.max_swap_attempts)?,
            avoid_conflicts: reader.choice("avoid_conflicts", defaults.avoid_conflicts)?,
        })
    }

    /// Set conflict avoidance
    pub fn with_avoid_conflicts(mut self, avoid_conflicts: ConflictAvoidance) -> Self {
        self.avoid_conflicts = avoid_conflicts;
        self
    }
}

/// Round-robin draw configuration
#[derive(Clone, Debug, PartialEq)]
pub struct RoundRobinConfig {
    pub base: PairOptions,
    /// Round of the round robin being drawn, counting from 1
    pub round_seq: usize,
}

impl RoundRobinConfig {
    pub const KEYS: &'static [&'static str] = &["round_seq"];

    pub fn new(round_seq: usize) -> Self {
        Self {
            base: PairOptions::default(),
            round_seq,
        }
    }

    /// Read the options; `round_seq` has no default
    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let reader = OptionReader::new(options, &all_keys(Self::KEYS))?;
        let round_seq = reader.required_count("round_seq")?;
        if round_seq == 0 {
            return Err(ConfigError::InvalidValue {
                option: "round_seq".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(Self {
            base: PairOptions::read(&reader, PairOptions::default())?,
            round_seq,
        })
    }

    /// Replace the base two-team options
    pub fn with_base(mut self, base: PairOptions) -> Self {
        self.base = base;
        self
    }
}

/// Power-paired two-team draw configuration
#[derive(Clone, Debug, PartialEq)]
pub struct PowerPairConfig {
    pub base: PairOptions,
    pub odd_bracket: OddBracket,
    pub pairing_method: PairingMethod,
    pub avoid_conflicts: ConflictAvoidance,
    pub pullup_restriction: PullupRestriction,
}

impl Default for PowerPairConfig {
    fn default() -> Self {
        Self {
            base: PairOptions::default(),
            odd_bracket: OddBracket::IntermediateBubbleUpDown,
            pairing_method: PairingMethod::Slide,
            avoid_conflicts: ConflictAvoidance::OneUpOneDown,
            pullup_restriction: PullupRestriction::None,
        }
    }
}

impl PowerPairConfig {
    pub const KEYS: &'static [&'static str] = &[
        "odd_bracket",
        "pairing_method",
        "avoid_conflicts",
        "pullup_restriction",
    ];

    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let reader = OptionReader::new(options, &all_keys(Self::KEYS))?;
        let defaults = Self::default();
        Ok(Self {
            base: PairOptions::read(&reader, defaults.base)?,
            odd_bracket: reader.choice("odd_bracket", defaults.odd_bracket)?,
            pairing_method: reader.choice("pairing_method", defaults.pairing_method)?,
            avoid_conflicts: reader.choice("avoid_conflicts", defaults.avoid_conflicts)?,
            pullup_restriction: reader.choice("pullup_restriction", defaults.pullup_restriction)?,
        })
    }

    /// Set odd-bracket resolution
    pub fn with_odd_bracket(mut self, odd_bracket: OddBracket) -> Self {
        self.odd_bracket = odd_bracket;
        self
    }

    /// Set pairing method
    pub fn with_pairing_method(mut self, pairing_method: PairingMethod) -> Self {
        self.pairing_method = pairing_method;
        self
    }

    /// Set conflict avoidance
    pub fn with_avoid_conflicts(mut self, avoid_conflicts: ConflictAvoidance) -> Self {
        self.avoid_conflicts = avoid_conflicts;
        self
    }
}

/// Power-paired draw configuration for preallocated sides
#[derive(Clone, Debug, PartialEq)]
pub struct AllocatedPowerPairConfig {
    pub base: PairOptions,
    pub odd_bracket: SidedOddBracket,
    pub pairing_method: SidedPairingMethod,
    pub avoid_conflicts: ConflictAvoidance,
}

impl Default for AllocatedPowerPairConfig {
    fn default() -> Self {
        Self {
            base: PairOptions::default().with_side_allocations(SideAllocation::Preallocated),
            odd_bracket: SidedOddBracket::Intermediate1,
            pairing_method: SidedPairingMethod::Fold,
            avoid_conflicts: ConflictAvoidance::Off,
        }
    }
}

impl AllocatedPowerPairConfig {
    pub const KEYS: &'static [&'static str] = &["odd_bracket", "pairing_method", "avoid_conflicts"];

    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let reader = OptionReader::new(options, &all_keys(Self::KEYS))?;
        let defaults = Self::default();
        Ok(Self {
            base: PairOptions::read(&reader, defaults.base)?,
            odd_bracket: reader.choice("odd_bracket", defaults.odd_bracket)?,
            pairing_method: reader.choice("pairing_method", defaults.pairing_method)?,
            avoid_conflicts: reader.choice("avoid_conflicts", defaults.avoid_conflicts)?,
        })
    }

    /// Set odd-bracket resolution
    pub fn with_odd_bracket(mut self, odd_bracket: SidedOddBracket) -> Self {
        self.odd_bracket = odd_bracket;
        self
    }

    /// Set pairing method
    pub fn with_pairing_method(mut self, pairing_method: SidedPairingMethod) -> Self {
        self.pairing_method = pairing_method;
        self
    }
}

/// BP power-paired (Hungarian) configuration
#[derive(Clone, Debug, PartialEq)]
pub struct BpHungarianConfig {
    pub pullup: RoomPullup,
    pub position_cost: PositionCost,
    /// Rényi order for the entropy cost; 1 is Shannon, 0 is Hartley
    pub renyi_order: f64,
    /// Costs are raised to this power before solving
    pub exponent: f64,
    pub assignment_method: AssignmentMethod,
}

impl Default for BpHungarianConfig {
    fn default() -> Self {
        Self {
            pullup: RoomPullup::Anywhere,
            position_cost: PositionCost::Entropy,
            renyi_order: 1.0,
            exponent: 4.0,
            assignment_method: AssignmentMethod::HungarianPreshuffled,
        }
    }
}

impl BpHungarianConfig {
    pub const KEYS: &'static [&'static str] = &[
        "pullup",
        "position_cost",
        "renyi_order",
        "exponent",
        "assignment_method",
    ];

    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let reader = OptionReader::new(options, Self::KEYS)?;
        let defaults = Self::default();
        let config = Self {
            pullup: reader.choice("pullup", defaults.pullup)?,
            position_cost: reader.choice("position_cost", defaults.position_cost)?,
            renyi_order: reader.number("renyi_order", defaults.renyi_order)?,
            exponent: reader.number("exponent", defaults.exponent)?,
            assignment_method: reader.choice("assignment_method", defaults.assignment_method)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that are well-typed but unusable
    pub fn validate(&self) -> Result<()> {
        if self.position_cost == PositionCost::Entropy && self.renyi_order < 0.0 {
            return Err(DrawUserError::NegativeRenyiOrder(self.renyi_order).into());
        }
        Ok(())
    }

    /// Set the position cost
    pub fn with_position_cost(mut self, position_cost: PositionCost) -> Self {
        self.position_cost = position_cost;
        self
    }

    /// Set the Rényi order
    pub fn with_renyi_order(mut self, renyi_order: f64) -> Self {
        self.renyi_order = renyi_order;
        self
    }

    /// Set room pull-up distribution
    pub fn with_pullup(mut self, pullup: RoomPullup) -> Self {
        self.pullup = pullup;
        self
    }

    /// Set assignment method
    pub fn with_assignment_method(mut self, assignment_method: AssignmentMethod) -> Self {
        self.assignment_method = assignment_method;
        self
    }
}

/// Base two-team keys followed by `extra`
fn all_keys(extra: &[&'static str]) -> Vec<&'static str> {
    PairOptions::KEYS.iter().chain(extra).copied().collect()
}

/// Reject every option; for generators that take none
pub(crate) fn expect_no_options(options: &OptionMap) -> Result<()> {
    OptionReader::new(options, &[])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabdraw_core::DrawError;

    #[test]
    fn test_defaults_when_empty() {
        let config = PowerPairConfig::from_options(&OptionMap::new()).unwrap();
        assert_eq!(config, PowerPairConfig::default());
        assert_eq!(config.base.history_penalty, 1e3);
        assert_eq!(config.odd_bracket, OddBracket::IntermediateBubbleUpDown);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let options = option_map([("odd_bracket", "pullup_top"), ("colour", "blue")]);
        let err = PowerPairConfig::from_options(&options).unwrap_err();
        assert_eq!(
            err,
            DrawError::Config(ConfigError::UnknownOptions(vec!["colour".to_string()]))
        );
    }

    #[test]
    fn test_invalid_choice_rejected() {
        let options = option_map([("pairing_method", "zigzag")]);
        assert!(PowerPairConfig::from_options(&options).is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut options = OptionMap::new();
        options.insert("avoid_history".into(), OptionValue::Text("yes".into()));
        assert!(PairOptions::from_options(&options).is_err());

        let mut options = OptionMap::new();
        options.insert("max_swap_attempts".into(), OptionValue::Number(2.5));
        assert!(RandomConfig::from_options(&options).is_err());
    }

    #[test]
    fn test_values_are_read() {
        let mut options = option_map([("odd_bracket", "pullup_top"), ("pairing_method", "fold")]);
        options.insert("avoid_institution".into(), false.into());
        options.insert("history_penalty".into(), 50.0.into());
        let config = PowerPairConfig::from_options(&options).unwrap();
        assert_eq!(config.odd_bracket, OddBracket::PullupTop);
        assert_eq!(config.pairing_method, PairingMethod::Fold);
        assert!(!config.base.avoid_institution);
        assert_eq!(config.base.history_penalty, 50.0);
    }

    fn assert_names_parse<C: Choice + std::fmt::Debug>() {
        for (_, choice) in C::CHOICES {
            assert_eq!(C::parse(choice.name()), Some(*choice));
        }
    }

    #[test]
    fn test_choice_names_round_trip() {
        assert_eq!(ConflictAvoidance::parse("on"), Some(ConflictAvoidance::OneUpOneDown));
        assert_eq!(ConflictAvoidance::OneUpOneDown.name(), "one_up_one_down");
        assert_eq!(ConflictAvoidance::parse("graph"), Some(ConflictAvoidance::Graph));
        assert_eq!(SidedOddBracket::Intermediate2.name(), "intermediate2");

        assert_names_parse::<SideAllocation>();
        assert_names_parse::<OddBracket>();
        assert_names_parse::<PairingMethod>();
        assert_names_parse::<ConflictAvoidance>();
        assert_names_parse::<PullupRestriction>();
        assert_names_parse::<SidedOddBracket>();
        assert_names_parse::<SidedPairingMethod>();
        assert_names_parse::<RoomPullup>();
        assert_names_parse::<PositionCost>();
        assert_names_parse::<AssignmentMethod>();
    }

    #[test]
    fn test_graph_penalties_are_read() {
        let mut options = option_map([("avoid_conflicts", "graph")]);
        options.insert("side_penalty".into(), 3.0.into());
        let config = PowerPairConfig::from_options(&options).unwrap();
        assert_eq!(config.avoid_conflicts, ConflictAvoidance::Graph);
        assert_eq!(config.base.side_penalty, 3.0);
        assert_eq!(PairOptions::default().side_penalty, 0.0);
    }

    #[test]
    fn test_round_seq_is_required() {
        let err = RoundRobinConfig::from_options(&OptionMap::new()).unwrap_err();
        assert_eq!(
            err,
            DrawError::Config(ConfigError::MissingOption("round_seq".to_string()))
        );

        let config = RoundRobinConfig::from_options(&option_map([("round_seq", 3u32)])).unwrap();
        assert_eq!(config, RoundRobinConfig::new(3));
        assert!(RoundRobinConfig::from_options(&option_map([("round_seq", 0u32)])).is_err());
    }

    #[test]
    fn test_negative_renyi_order_is_user_error() {
        let options = option_map([("renyi_order", -0.5)]);
        let err = BpHungarianConfig::from_options(&options).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_option_values_from_json() {
        let options: OptionMap =
            serde_json::from_str(r#"{"avoid_history": false, "history_penalty": 10, "odd_bracket": "intermediate"}"#)
                .unwrap();
        let config = PowerPairConfig::from_options(&options).unwrap();
        assert!(!config.base.avoid_history);
        assert_eq!(config.base.history_penalty, 10.0);
        assert_eq!(config.odd_bracket, OddBracket::Intermediate);
    }
}
