//! Power-paired BP draws by minimum-cost assignment
//!
//! Rooms are laid out from the points distribution first, each with the set
//! of points levels allowed in it. Every team is then assigned to one
//! (room, position) slot so that the total position cost is minimised; a
//! team may only take a slot in a room that allows its points. With the
//! default options this is WUDC-compliant.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: BpHungarianDrawGenerator::make_draw (orchestration)
//! - Level 2: define_rooms, cost_matrix, solve, make_pairings
//! - Level 3: room layouts (anywhere, one room) and the assignment solvers
//! - Level 4: position cost functions

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tabdraw_core::{
    assignment_cost, solve_assignment, CostMatrix, DrawFatalError, DrawFlag, DrawUserError, Pairing,
    Participant, Result,
};

use crate::context::{check_attribute, DrawContext};
use crate::generator::{DrawGenerator, PriorResults};
use crate::options::{AssignmentMethod, BpHungarianConfig, RoomPullup};

/// Positions in a BP room, in speaking order (OG, OO, CG, CO)
const POSITIONS: usize = 4;

/// One room of the draw before teams are placed
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSpec {
    /// Bracket the room belongs to
    pub level: f64,
    /// Points levels allowed in the room, highest first
    pub allowed: Vec<f64>,
}

impl RoomSpec {
    pub fn new(level: f64, allowed: Vec<f64>) -> Self {
        Self { level, allowed }
    }

    pub fn allows(&self, points: f64) -> bool {
        self.allowed.contains(&points)
    }
}

/// BP power-paired draw
#[derive(Clone, Debug, PartialEq)]
pub struct BpHungarianDrawGenerator {
    config: BpHungarianConfig,
}

impl BpHungarianDrawGenerator {
    pub fn new(config: BpHungarianConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BpHungarianConfig {
        &self.config
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

impl DrawGenerator for BpHungarianDrawGenerator {
    fn teams_per_debate(&self) -> usize {
        POSITIONS
    }

    fn check_teams(&self, teams: &[Participant]) -> Result<()> {
        check_attribute(teams, "side_history", |t| t.side_history.len() == POSITIONS)
    }

    fn make_draw(
        &self,
        teams: &[Participant],
        _results: Option<&PriorResults>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Pairing>> {
        let cost = CostFunction::from_config(&self.config)?;
        let points: Vec<f64> = teams.iter().map(|t| t.points).collect();

        let rooms = define_rooms(&points, self.config.pullup);
        let costs = cost_matrix(teams, &rooms, cost, self.config.exponent);
        let assignment = solve(&costs, self.config.assignment_method, rng)?;

        let mut ctx = DrawContext::new(teams);
        let pairings = make_pairings(&rooms, &assignment, &mut ctx)?;
        Ok(ctx.finish(pairings))
    }
}

// ============================================================================
// LEVEL 2 - DRAW STEPS
// ============================================================================

/// Lay out rooms for a points distribution
///
/// # Arguments
/// * `points` - one value per team, in any order
/// * `pullup` - how pull-up teams may be spread over the bracket above
///
/// # Returns
/// One [`RoomSpec`] per room, top room first
pub fn define_rooms(points: &[f64], pullup: RoomPullup) -> Vec<RoomSpec> {
    match pullup {
        RoomPullup::Anywhere => define_rooms_anywhere(points),
        RoomPullup::OneRoom => define_rooms_one_room(points),
    }
}

/// Cost of every (team, slot) pair; slots are ordered by room, then position
pub(crate) fn cost_matrix(
    teams: &[Participant],
    rooms: &[RoomSpec],
    cost: CostFunction,
    exponent: f64,
) -> CostMatrix {
    teams
        .iter()
        .map(|team| {
            rooms
                .iter()
                .flat_map(|room| {
                    let allowed = room.allows(team.points);
                    (0..POSITIONS).map(move |pos| {
                        allowed.then(|| cost.cost(pos, &team.side_history).powf(exponent))
                    })
                })
                .collect()
        })
        .collect()
}

/// Solve the assignment, returning the slot for each team
pub(crate) fn solve<R: Rng + ?Sized>(
    costs: &[Vec<Option<f64>>],
    method: AssignmentMethod,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let start = Instant::now();
    tracing::info!(teams = costs.len(), "Running assignment algorithm");

    let assignment = match method {
        AssignmentMethod::Hungarian => solve_assignment(costs)?,
        AssignmentMethod::HungarianPreshuffled => solve_preshuffled(costs, rng)?,
    };

    tracing::info!(
        elapsed_secs = start.elapsed().as_secs_f64(),
        total_cost = assignment_cost(costs, &assignment),
        "Assignment complete"
    );
    Ok(assignment)
}

/// Build rooms from the solved assignment and flag pull-up teams
pub(crate) fn make_pairings(
    rooms: &[RoomSpec],
    assignment: &[usize],
    ctx: &mut DrawContext,
) -> Result<Vec<Pairing<usize>>> {
    let mut slots: Vec<[Option<usize>; POSITIONS]> = vec![[None; POSITIONS]; rooms.len()];
    for (team, &slot) in assignment.iter().enumerate() {
        slots[slot / POSITIONS][slot % POSITIONS] = Some(team);
    }

    let mut pairings = Vec::with_capacity(rooms.len());
    for (i, (room, slot)) in rooms.iter().zip(slots).enumerate() {
        let rank = i as u32 + 1;
        let members: Vec<usize> = slot
            .iter()
            .copied()
            .collect::<Option<Vec<usize>>>()
            .ok_or(DrawFatalError::IncompleteRoom(rank))?;

        let points: Vec<f64> = members.iter().map(|&t| ctx.teams[t].points).collect();
        if points.iter().any(|&p| !room.allows(p)) {
            tracing::error!(
                room = rank,
                allowed = ?room.allowed,
                found = ?points,
                "Teams placed in a room their points don't allow"
            );
        }

        let top = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for (&team, &p) in members.iter().zip(&points) {
            if p < top {
                ctx.flag_team(team, DrawFlag::Pullup);
            }
        }
        pairings.push(Pairing::new(members, room.level, rank));
    }
    Ok(pairings)
}

// ============================================================================
// LEVEL 3 - ROOM LAYOUTS AND SOLVERS
// ============================================================================

/// Distinct points levels with their team counts, highest first
fn points_counts(points: &[f64]) -> Vec<(f64, usize)> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for p in sorted {
        match counts.last_mut() {
            Some((level, count)) if *level == p => *count += 1,
            _ => counts.push((p, 1)),
        }
    }
    counts
}

/// Pull-up teams may go to any room of the bracket above
///
/// Brackets are taken from the top. A bracket that doesn't fill whole rooms
/// takes just enough teams from the next level down to do so, and those
/// teams may be placed in any of its rooms. A level smaller than what the
/// bracket above still needs is absorbed whole.
fn define_rooms_anywhere(points: &[f64]) -> Vec<RoomSpec> {
    let mut rooms = Vec::new();
    let mut allowed: Vec<f64> = Vec::new();
    let mut level: Option<f64> = None;
    let mut nteams = 0usize;
    let mut needed = 0usize;

    let mut close = |level: Option<f64>, allowed: Vec<f64>, nteams: usize| {
        if let Some(level) = level {
            let room = RoomSpec::new(level, allowed);
            rooms.extend(std::iter::repeat(room).take(nteams / POSITIONS));
        }
    };

    for (p, mut count) in points_counts(points) {
        if needed < count {
            if needed > 0 {
                allowed.push(p);
                count -= needed;
                nteams += needed;
            }
            close(level.take(), std::mem::take(&mut allowed), nteams);
            nteams = 0;
        }

        allowed.push(p);
        level.get_or_insert(p);
        nteams += count;
        needed = (POSITIONS - nteams % POSITIONS) % POSITIONS;
    }
    close(level, allowed, nteams);

    rooms
}

/// All pull-up teams of a bracket share one room
fn define_rooms_one_room(points: &[f64]) -> Vec<RoomSpec> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
        .chunks(POSITIONS)
        .map(|room| {
            let mut allowed = room.to_vec();
            allowed.dedup();
            RoomSpec::new(room[0], allowed)
        })
        .collect()
}

/// Hungarian method with rows and columns permuted at random first
fn solve_preshuffled<R: Rng + ?Sized>(costs: &[Vec<Option<f64>>], rng: &mut R) -> Result<Vec<usize>> {
    let n = costs.len();
    let mut rows: Vec<usize> = (0..n).collect();
    let mut cols: Vec<usize> = (0..n).collect();
    rows.shuffle(&mut *rng);
    cols.shuffle(&mut *rng);

    let shuffled: CostMatrix = rows
        .iter()
        .map(|&i| cols.iter().map(|&j| costs[i][j]).collect())
        .collect();
    let solved = solve_assignment(&shuffled)?;

    let mut assignment = vec![0usize; n];
    for (i, j) in solved.into_iter().enumerate() {
        assignment[rows[i]] = cols[j];
    }
    Ok(assignment)
}

// ============================================================================
// LEVEL 4 - POSITION COSTS
// ============================================================================

/// Cost of placing a team in a position given its position history
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CostFunction {
    /// Times already in the position
    Simple,
    /// Population variance of the history after the placement
    Variance,
    /// Shannon entropy (Rényi order 1)
    Shannon,
    /// Hartley entropy (Rényi order 0)
    Hartley,
    /// Rényi entropy of the given order
    Renyi(f64),
}

impl CostFunction {
    /// Resolve the configured cost family, logging the entropy chosen
    pub fn from_config(config: &BpHungarianConfig) -> Result<Self> {
        use crate::options::PositionCost as Family;

        Ok(match config.position_cost {
            Family::Simple => CostFunction::Simple,
            Family::Variance => CostFunction::Variance,
            Family::Entropy => {
                let order = config.renyi_order;
                if order == 1.0 {
                    tracing::info!("Using Shannon entropy (α = 1)");
                    CostFunction::Shannon
                } else if order == 0.0 {
                    tracing::info!("Using Hartley entropy (α = 0)");
                    CostFunction::Hartley
                } else if order > 0.0 {
                    tracing::info!(order, "Using Rényi entropy");
                    CostFunction::Renyi(order)
                } else {
                    return Err(DrawUserError::NegativeRenyiOrder(order).into());
                }
            }
        })
    }

    /// Cost of `pos` for a team that has held each position `history[i]` times
    ///
    /// Entropy costs are `n·(2 − H)`, with `n` the rounds including this one,
    /// so a perfectly even history costs nothing.
    pub fn cost(self, pos: usize, history: &[u32]) -> f64 {
        match self {
            CostFunction::Simple => history[pos] as f64,
            CostFunction::Variance => {
                let (updated, n) = with_placement(pos, history);
                let mean = n / updated.len() as f64;
                updated.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / updated.len() as f64
            }
            CostFunction::Shannon => {
                let (updated, n) = with_placement(pos, history);
                let entropy: f64 = updated
                    .iter()
                    .filter(|&&h| h > 0.0)
                    .map(|h| {
                        let p = h / n;
                        -p * p.log2()
                    })
                    .sum();
                (2.0 - entropy) * n
            }
            CostFunction::Hartley => {
                let (updated, n) = with_placement(pos, history);
                let support = updated.iter().filter(|&&h| h > 0.0).count() as f64;
                (2.0 - support.log2()) * n
            }
            CostFunction::Renyi(order) => {
                let (updated, n) = with_placement(pos, history);
                let sum: f64 = updated.iter().map(|h| (h / n).powf(order)).sum();
                (2.0 - sum.log2() / (1.0 - order)) * n
            }
        }
    }
}

/// History after one more round in `pos`, and its total
fn with_placement(pos: usize, history: &[u32]) -> (Vec<f64>, f64) {
    let mut updated: Vec<f64> = history.iter().map(|&h| h as f64).collect();
    updated[pos] += 1.0;
    let n = updated.iter().sum();
    (updated, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PositionCost as Family;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tabdraw_core::DrawError;

    fn rooms(expected: &[(f64, &[f64])]) -> Vec<RoomSpec> {
        expected
            .iter()
            .map(|&(level, allowed)| RoomSpec::new(level, allowed.to_vec()))
            .collect()
    }

    fn points(values: &[u32]) -> Vec<f64> {
        values.iter().map(|&v| v as f64).collect()
    }

    #[test]
    fn test_define_rooms_distinct_brackets() {
        let data = points(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        let expected = rooms(&[
            (11.0, &[11.0, 10.0, 9.0, 8.0]),
            (7.0, &[7.0, 6.0, 5.0, 4.0]),
            (3.0, &[3.0, 2.0, 1.0, 0.0]),
        ]);
        assert_eq!(define_rooms(&data, RoomPullup::Anywhere), expected);
        assert_eq!(define_rooms(&data, RoomPullup::OneRoom), expected);
    }

    #[test]
    fn test_define_rooms_same_either_way() {
        let data = points(&[3, 3, 2, 2, 2, 2, 1, 1, 1, 1, 0, 0]);
        let expected = rooms(&[(3.0, &[3.0, 2.0]), (2.0, &[2.0, 1.0]), (1.0, &[1.0, 0.0])]);
        assert_eq!(define_rooms(&data, RoomPullup::Anywhere), expected);
        assert_eq!(define_rooms(&data, RoomPullup::OneRoom), expected);

        let data = points(&[4, 3, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0]);
        let expected = rooms(&[(4.0, &[4.0, 3.0, 2.0]), (2.0, &[2.0]), (0.0, &[0.0])]);
        assert_eq!(define_rooms(&data, RoomPullup::Anywhere), expected);
        assert_eq!(define_rooms(&data, RoomPullup::OneRoom), expected);
    }

    #[test]
    fn test_define_rooms_large_bracket() {
        let data = points(&[4, 4, 4, 3, 3, 3, 3, 3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 0]);
        assert_eq!(
            define_rooms(&data, RoomPullup::Anywhere),
            rooms(&[
                (4.0, &[4.0, 3.0]),
                (3.0, &[3.0]),
                (2.0, &[2.0, 1.0]),
                (2.0, &[2.0, 1.0]),
                (2.0, &[2.0, 1.0]),
                (1.0, &[1.0, 0.0]),
            ])
        );
        assert_eq!(
            define_rooms(&data, RoomPullup::OneRoom),
            rooms(&[
                (4.0, &[4.0, 3.0]),
                (3.0, &[3.0]),
                (2.0, &[2.0]),
                (2.0, &[2.0]),
                (2.0, &[2.0, 1.0]),
                (1.0, &[1.0, 0.0]),
            ])
        );
    }

    #[test]
    fn test_define_rooms_pullups_spread() {
        let data = points(&[7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 6, 6, 6, 6, 6]);
        assert_eq!(
            define_rooms(&data, RoomPullup::Anywhere),
            rooms(&[(7.0, &[7.0, 6.0]), (7.0, &[7.0, 6.0]), (7.0, &[7.0, 6.0]), (6.0, &[6.0])])
        );
        assert_eq!(
            define_rooms(&data, RoomPullup::OneRoom),
            rooms(&[(7.0, &[7.0]), (7.0, &[7.0]), (7.0, &[7.0, 6.0]), (6.0, &[6.0])])
        );
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_position_costs() {
        assert_eq!(CostFunction::Simple.cost(2, &[1, 0, 2, 0]), 2.0);
        assert!(approx(CostFunction::Variance.cost(0, &[0, 0, 0, 0]), 0.1875));

        assert!(approx(CostFunction::Shannon.cost(3, &[1, 1, 1, 0]), 0.0));
        assert!(approx(CostFunction::Shannon.cost(0, &[0, 0, 0, 0]), 2.0));
        assert!(approx(CostFunction::Hartley.cost(1, &[2, 0, 0, 0]), 3.0));
        assert!(approx(
            CostFunction::Renyi(2.0).cost(0, &[1, 1, 0, 0]),
            (2.0 - 1.8f64.log2()) * 3.0
        ));
    }

    #[test]
    fn test_renyi_approaches_shannon() {
        let history = [3, 1, 0, 0];
        let shannon = CostFunction::Shannon.cost(2, &history);
        let renyi = CostFunction::Renyi(0.999).cost(2, &history);
        assert!((shannon - renyi).abs() < 0.05);
    }

    #[test]
    fn test_cost_selection() {
        let config = BpHungarianConfig::default();
        assert_eq!(CostFunction::from_config(&config).unwrap(), CostFunction::Shannon);
        let config = config.with_renyi_order(0.0);
        assert_eq!(CostFunction::from_config(&config).unwrap(), CostFunction::Hartley);
        let config = config.with_renyi_order(2.0);
        assert_eq!(CostFunction::from_config(&config).unwrap(), CostFunction::Renyi(2.0));
        let config = config.with_position_cost(Family::Variance);
        assert_eq!(CostFunction::from_config(&config).unwrap(), CostFunction::Variance);

        let config = BpHungarianConfig::default().with_renyi_order(-1.0);
        assert_eq!(
            CostFunction::from_config(&config).unwrap_err(),
            DrawError::User(DrawUserError::NegativeRenyiOrder(-1.0))
        );
    }

    #[test]
    fn test_cost_matrix_disallows_other_brackets() {
        let teams: Vec<Participant> = [1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| Participant::new(i as u32, p).with_side_history(vec![0; 4]))
            .collect();
        let rooms = define_rooms(&points(&[1, 1, 1, 1, 0, 0, 0, 0]), RoomPullup::Anywhere);
        let costs = cost_matrix(&teams, &rooms, CostFunction::Simple, 2.0);

        assert_eq!(costs.len(), 8);
        assert!(costs.iter().all(|row| row.len() == 8));
        assert_eq!(&costs[0][..4], &[Some(0.0); 4]);
        assert_eq!(&costs[0][4..], &[None; 4]);
        assert_eq!(&costs[7][..4], &[None; 4]);
    }

    /// Team `i` has been in every position except `i`
    fn missing_one_position() -> Vec<Participant> {
        (0..4)
            .map(|i| {
                let history = (0..4).map(|pos| u32::from(pos != i)).collect();
                Participant::new(i as u32 + 1, 3.0).with_side_history(history)
            })
            .collect()
    }

    #[test]
    fn test_teams_take_missing_positions() {
        let teams = missing_one_position();
        for method in [AssignmentMethod::Hungarian, AssignmentMethod::HungarianPreshuffled] {
            let generator = BpHungarianDrawGenerator::new(BpHungarianConfig::default().with_assignment_method(method));
            let mut rng = ChaCha8Rng::seed_from_u64(5);
            let draw = generator.generate(&teams, None, &mut rng).unwrap();
            assert_eq!(draw.len(), 1);
            assert_eq!(draw[0].teams, vec![1, 2, 3, 4]);
            assert_eq!(draw[0].bracket, 3.0);
        }
    }

    #[test]
    fn test_pullup_flags() {
        let teams: Vec<Participant> = [2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| Participant::new(i as u32, p).with_side_history(vec![0; 4]))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let draw = BpHungarianDrawGenerator::new(BpHungarianConfig::default())
            .generate(&teams, None, &mut rng)
            .unwrap();

        assert_eq!(draw.len(), 2);
        assert_eq!((draw[0].room_rank, draw[0].bracket), (1, 2.0));
        assert_eq!((draw[1].room_rank, draw[1].bracket), (2, 1.0));
        assert!(draw[0].contains(0));

        let pulled: Vec<u32> = draw
            .iter()
            .flat_map(|p| p.teams.iter().copied())
            .filter(|&t| p_flags(&draw, t).contains(&DrawFlag::Pullup))
            .collect();
        assert_eq!(pulled.len(), 3);
        assert!(pulled.iter().all(|t| draw[0].contains(*t) && *t != 0));
    }

    fn p_flags(draw: &[Pairing], team: u32) -> Vec<DrawFlag> {
        draw.iter()
            .find(|p| p.contains(team))
            .map(|p| p.flags_for(team).to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_every_team_placed_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let teams: Vec<Participant> = (0..24u32)
            .map(|i| {
                let history = (0..4).map(|_| rng.gen_range(0..3u32)).collect();
                Participant::new(i, (i / 5) as f64).with_side_history(history)
            })
            .rev()
            .collect();
        let draw = BpHungarianDrawGenerator::new(BpHungarianConfig::default())
            .generate(&teams, None, &mut rng)
            .unwrap();

        let mut placed: Vec<u32> = draw.iter().flat_map(|p| p.teams.iter().copied()).collect();
        placed.sort_unstable();
        assert_eq!(placed, (0..24).collect::<Vec<_>>());
        assert!(draw.iter().all(|p| p.teams.len() == 4));
        let ranks: Vec<u32> = draw.iter().map(|p| p.room_rank).collect();
        assert_eq!(ranks, (1..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_side_history_required() {
        let teams: Vec<Participant> = (0..4).map(|i| Participant::new(i, 0.0).with_side_history(vec![0, 0])).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = BpHungarianDrawGenerator::new(BpHungarianConfig::default())
            .generate(&teams, None, &mut rng)
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
