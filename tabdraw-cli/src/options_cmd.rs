//! Options and flags commands - describe what generators accept and emit

use anyhow::{Context, Result};
use clap::Args;

use tabdraw_core::DrawFlag;
use tabdraw_engine::{available_options, option_map, DrawType, Format, OptionMap};

#[derive(Args)]
pub struct OptionsArgs {
    /// Debate format (two_team, bp, poly:N)
    #[arg(long, value_parser = parse_format)]
    pub format: Format,

    /// Kind of round (random, power_paired, elimination, ...)
    #[arg(long, value_parser = parse_draw_type)]
    pub draw_type: DrawType,

    /// Sides are fixed in advance
    #[arg(long)]
    pub preallocated: bool,
}

/// Run options command
pub fn run(args: OptionsArgs) -> Result<()> {
    let options = if args.preallocated {
        option_map([("side_allocations", "preallocated")])
    } else {
        OptionMap::new()
    };

    let keys = available_options(args.format, args.draw_type, &options).with_context(|| {
        format!(
            "No generator for {} {} draws",
            args.format.name(),
            args.draw_type.name()
        )
    })?;

    if keys.is_empty() {
        println!("This generator takes no options");
    }
    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

/// Print every flag's wire name and description
pub fn print_flags() {
    for flag in DrawFlag::ALL {
        println!("{:<14}{}", flag.code(), flag.description());
    }
}

fn parse_format(value: &str) -> std::result::Result<Format, String> {
    if let Some(count) = value.strip_prefix("poly:") {
        return count
            .parse()
            .map(Format::Poly)
            .map_err(|_| format!("bad team count in '{}' (expected poly:N)", value));
    }
    [Format::TwoTeam, Format::Bp]
        .into_iter()
        .find(|f| f.name() == value)
        .ok_or_else(|| format!("unknown format '{}' (expected two_team, bp or poly:N)", value))
}

fn parse_draw_type(value: &str) -> std::result::Result<DrawType, String> {
    DrawType::ALL
        .into_iter()
        .find(|t| t.name() == value)
        .ok_or_else(|| {
            let names: Vec<&str> = DrawType::ALL.iter().map(|t| t.name()).collect();
            format!("unknown draw type '{}' (expected one of {})", value, names.join(", "))
        })
}
