//! TABDRAW Core - Data model and optimisation primitives for debate draws
//!
//! This crate provides the pieces every draw generator builds on:
//! - Participants (teams) and the attributes a draw reads from them
//! - Pairings, prior-round results and draw flags
//! - The error taxonomy shared by all generators
//! - The one-up-one-down swap optimiser
//! - A minimum-cost perfect assignment solver (Hungarian method)
//! - A minimum-cost perfect matching solver for general graphs (blossom method)

pub mod assignment;
pub mod error;
pub mod flags;
pub mod matching;
pub mod pairing;
pub mod participant;
pub mod swap;

// Re-exports for convenient access
pub use assignment::{assignment_cost, solve_assignment, CostMatrix};
pub use error::{ConfigError, DrawError, DrawFatalError, DrawUserError, Result};
pub use flags::DrawFlag;
pub use matching::{matching_cost, min_cost_perfect_matching};
pub use pairing::{BpResultPairing, Pairing, ResultPairing};
pub use participant::{Participant, Side, TeamId};
pub use swap::{best_nonadjacent_selection, SwapOptimizer, SwapOutcome, EXCLUDE_PENALTY};
