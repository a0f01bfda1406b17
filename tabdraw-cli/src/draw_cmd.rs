//! Draw command - generate one round's draw from a JSON request
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_request(), generate(), report()
//! - Level 3: prior_results(), create_rng()
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use tabdraw_core::{BpResultPairing, Pairing, Participant, ResultPairing, TeamId};
use tabdraw_engine::{build_generator, DrawGenerator, DrawType, Format, OptionMap, PriorResults};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct DrawArgs {
    /// Draw request JSON file
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Random seed (fresh entropy when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output pairings as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything needed to draw one round
#[derive(Clone, Debug, Deserialize)]
pub struct DrawRequest {
    pub format: Format,
    pub draw_type: DrawType,
    #[serde(default)]
    pub options: OptionMap,
    /// Teams in standings order
    pub teams: Vec<Participant>,
    /// Previous round, for elimination draws
    #[serde(default)]
    pub results: Vec<ResultEntry>,
}

/// One debate of the previous round
#[derive(Clone, Debug, Deserialize)]
pub struct ResultEntry {
    pub teams: Vec<TeamId>,
    pub room_rank: u32,
    /// Two-team winner
    #[serde(default)]
    pub winner: Option<TeamId>,
    /// BP teams advancing
    #[serde(default)]
    pub advancing: Vec<TeamId>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run draw command
pub fn run(args: DrawArgs) -> Result<()> {
    let request = load_request(&args.input)?;

    tracing::info!(
        "Drawing {} {} round for {} teams",
        request.format.name(),
        request.draw_type.name(),
        request.teams.len()
    );

    let pairings = generate(&request, args.seed)?;
    report(&request, &pairings, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_request(path: &Path) -> Result<DrawRequest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draw request: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse draw request: {}", path.display()))
}

/// Build the generator and run it
pub fn generate(request: &DrawRequest, seed: Option<u64>) -> Result<Vec<Pairing>> {
    let generator = build_generator(request.format, request.draw_type, &request.options)
        .context("Invalid generator options")?;
    let results = prior_results(request)?;
    let mut rng = create_rng(seed);

    let pairings = generator
        .generate(&request.teams, results.as_ref(), &mut rng)
        .with_context(|| format!("Failed to generate {} draw", generator.name()))?;
    Ok(pairings)
}

fn report(request: &DrawRequest, pairings: &[Pairing], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(pairings)?);
        return Ok(());
    }

    let names: FxHashMap<TeamId, &str> = request
        .teams
        .iter()
        .filter(|t| !t.name.is_empty())
        .map(|t| (t.id, t.name.as_str()))
        .collect();

    for pairing in pairings {
        println!("{}", format_pairing(pairing, &names));
    }
    println!("{} debates", pairings.len());
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn prior_results(request: &DrawRequest) -> Result<Option<PriorResults>> {
    if request.results.is_empty() {
        return Ok(None);
    }

    let results = match request.format {
        Format::TwoTeam => PriorResults::TwoTeam(
            request
                .results
                .iter()
                .map(|r| ResultPairing::new(Pairing::new(r.teams.clone(), 0.0, r.room_rank), r.winner))
                .collect::<tabdraw_core::Result<_>>()?,
        ),
        Format::Bp => PriorResults::Bp(
            request
                .results
                .iter()
                .map(|r| {
                    BpResultPairing::new(Pairing::new(r.teams.clone(), 0.0, r.room_rank), r.advancing.clone())
                })
                .collect::<tabdraw_core::Result<_>>()?,
        ),
        Format::Poly(_) => {
            tracing::warn!("Polyformat draws don't read prior results; ignoring them");
            return Ok(None);
        }
    };
    Ok(Some(results))
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn format_pairing(pairing: &Pairing, names: &FxHashMap<TeamId, &str>) -> String {
    let teams: Vec<String> = pairing
        .teams
        .iter()
        .map(|&id| {
            let label = names.get(&id).map_or_else(|| format!("#{}", id), |name| name.to_string());
            let flags = pairing.flags_for(id);
            if flags.is_empty() {
                label
            } else {
                let codes: Vec<&str> = flags.iter().map(|f| f.code()).collect();
                format!("{} ({})", label, codes.join(", "))
            }
        })
        .collect();

    let mut line = format!("Room {:>3} [{}]  {}", pairing.room_rank, pairing.bracket, teams.join(" vs "));
    if !pairing.flags.is_empty() {
        let codes: Vec<&str> = pairing.flags.iter().map(|f| f.code()).collect();
        line.push_str(&format!("  <{}>", codes.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabdraw_core::DrawFlag;

    const REQUEST: &str = r#"{
        "format": "two_team",
        "draw_type": "elimination",
        "teams": [],
        "results": [
            {"teams": [1, 4], "room_rank": 1, "winner": 4},
            {"teams": [2, 3], "room_rank": 2, "winner": 2}
        ]
    }"#;

    #[test]
    fn test_parse_and_generate_elimination() {
        let request: DrawRequest = serde_json::from_str(REQUEST).unwrap();
        assert!(request.options.is_empty());

        let pairings = generate(&request, Some(1)).unwrap();
        assert_eq!(pairings.len(), 1);
        let mut teams = pairings[0].teams.clone();
        teams.sort_unstable();
        assert_eq!(teams, vec![2, 4]);
    }

    #[test]
    fn test_winner_outside_room_rejected() {
        let mut request: DrawRequest = serde_json::from_str(REQUEST).unwrap();
        request.results[0].winner = Some(9);
        assert!(prior_results(&request).is_err());
    }

    #[test]
    fn test_format_pairing() {
        let mut pairing = Pairing::new(vec![1, 2], 3.0, 1);
        pairing.add_team_flags(2, [DrawFlag::Pullup]);
        pairing.add_flag(DrawFlag::MaxSwapped);

        let mut names = FxHashMap::default();
        names.insert(1, "Alpha");
        assert_eq!(
            format_pairing(&pairing, &names),
            "Room   1 [3]  Alpha vs #2 (pullup)  <max_swapped>"
        );
    }
}
