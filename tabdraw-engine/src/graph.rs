//! Graph pairing - each bracket paired by minimum-cost matching
//!
//! Level 3 - Steps
//!
//! Rather than pairing a bracket by position and repairing conflicts
//! afterwards, every possible debate in the bracket is priced and the
//! cheapest complete set of debates is taken. With free sides that is a
//! perfect matching over the bracket; with preallocated sides it is an
//! assignment of negative teams to affirmative teams.

use tabdraw_core::{
    assignment_cost, matching_cost, min_cost_perfect_matching, solve_assignment, DrawFatalError,
    Pairing, Participant, Result,
};

use crate::options::{PairOptions, SideAllocation};
use crate::powerpair::Bracket;
use crate::powerpair_sided::SidedBracket;

/// Cost of putting two teams in the same debate
///
/// History and institution clashes cost their configured penalties. When
/// sides are balanced, two teams leaning towards the same side also cost
/// `side_penalty` per unit of their mean imbalance, since one of them will
/// have to take that side again.
pub fn pairing_penalty(a: &Participant, b: &Participant, options: &PairOptions) -> f64 {
    let mut penalty = 0.0;
    if options.avoid_history {
        penalty += a.seen(b) as f64 * options.history_penalty;
    }
    if options.avoid_institution && a.same_institution(b) {
        penalty += options.institution_penalty;
    }

    if options.side_allocations == SideAllocation::Balance && options.side_penalty > 0.0 {
        let (lean_a, lean_b) = (a.side_imbalance(), b.side_imbalance());
        let shared = (lean_a.signum() * lean_b.signum()).max(0);
        let magnitude = (lean_a.abs() + lean_b.abs()) / 2;
        penalty += (shared * magnitude) as f64 * options.side_penalty;
    }
    penalty
}

/// Pair each bracket by minimum-cost perfect matching
///
/// Brackets must already be even. Within a bracket, rooms are ordered by
/// their higher-placed team; room ranks run across brackets from 1.
pub(crate) fn graph_pairings(
    brackets: Vec<Bracket>,
    teams: &[Participant],
    options: &PairOptions,
) -> Result<Vec<Vec<Pairing<usize>>>> {
    let mut room_rank = 1u32;
    let mut out = Vec::with_capacity(brackets.len());

    for bracket in brackets {
        let members = &bracket.teams;
        let costs: Vec<Vec<Option<f64>>> = members
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                members
                    .iter()
                    .enumerate()
                    .map(|(j, &b)| (i != j).then(|| pairing_penalty(&teams[a], &teams[b], options)))
                    .collect()
            })
            .collect();

        let pairs = min_cost_perfect_matching(&costs)?;
        tracing::debug!(
            bracket = bracket.points,
            teams = members.len(),
            cost = matching_cost(&costs, &pairs),
            "Graph-paired bracket"
        );

        let pairings = pairs
            .into_iter()
            .map(|(i, j)| {
                let pairing = Pairing::new(vec![members[i], members[j]], bracket.points, room_rank);
                room_rank += 1;
                pairing
            })
            .collect();
        out.push(pairings);
    }
    Ok(out)
}

/// Match each bracket's negative teams to its affirmative teams at minimum cost
///
/// Rooms follow the order of the affirmative pool.
pub(crate) fn graph_sided_pairings(
    brackets: Vec<SidedBracket>,
    teams: &[Participant],
    options: &PairOptions,
) -> Result<Vec<Vec<Pairing<usize>>>> {
    let mut room_rank = 1u32;
    let mut out = Vec::with_capacity(brackets.len());

    for bracket in brackets {
        if !bracket.is_balanced() {
            return Err(DrawFatalError::UnbalancedBracket {
                points: bracket.points,
                aff: bracket.aff.len(),
                neg: bracket.neg.len(),
            }
            .into());
        }

        let costs: Vec<Vec<Option<f64>>> = bracket
            .aff
            .iter()
            .map(|&a| {
                bracket
                    .neg
                    .iter()
                    .map(|&n| Some(pairing_penalty(&teams[a], &teams[n], options)))
                    .collect()
            })
            .collect();

        let assignment = solve_assignment(&costs)?;
        tracing::debug!(
            bracket = bracket.points,
            teams = 2 * bracket.aff.len(),
            cost = assignment_cost(&costs, &assignment),
            "Graph-paired sided bracket"
        );

        let pairings = bracket
            .aff
            .iter()
            .zip(&assignment)
            .map(|(&aff, &col)| {
                let pairing = Pairing::new(vec![aff, bracket.neg[col]], bracket.points, room_rank);
                room_rank += 1;
                pairing
            })
            .collect();
        out.push(pairings);
    }
    Ok(out)
}
