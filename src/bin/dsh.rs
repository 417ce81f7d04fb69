use anyhow::{bail, Context};
use clap::Parser;
use geoshift::prelude::*;
use std::io::BufRead;

/// DSH: The datum shifter.
///
/// Applies a three parameter geocentric datum shift to coordinates read
/// from stdin, one coordinate per line, as whitespace separated
/// "longitude latitude [height]" (degrees and meters).
///
/// Example: shift ED50 coordinates onto WGS84:
///
///     echo 12.0 55.0 0 | dsh --from intl --to WGS84 --dx -87 --dy -96 --dz -120
#[derive(Parser, Debug)]
#[command(name = "dsh", version, about)]
struct Cli {
    /// Source ellipsoid (builtin name, e.g. WGS84, GRS80, intl)
    #[arg(long, default_value = "WGS84")]
    from: String,

    /// Target ellipsoid
    #[arg(long, default_value = "WGS84")]
    to: String,

    /// Geocentric translation, meters
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dx: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dy: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dz: f64,

    /// Run the shift in the inverse direction
    #[arg(long)]
    inv: bool,

    /// Use the 2D variants: heights forced to zero, inverse by iteration
    #[arg(long)]
    two_d: bool,

    /// Reproduce the legacy cross product eccentricity on the target side
    #[arg(long)]
    legacy: bool,

    /// Iteration cap for the 2D inverse
    #[arg(long, default_value_t = 10)]
    max_iterations: u32,

    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

fn main() -> anyhow::Result<()> {
    let options = Cli::parse();
    env_logger::Builder::new()
        .filter_level(options.verbose.log_level_filter())
        .init();

    let eccentricity = if options.legacy {
        TargetEccentricity::Legacy
    } else {
        TargetEccentricity::Proper
    };

    let shift = DatumShift::new(DatumShiftDef {
        source: Ellipsoid::named(&options.from)?,
        target: Ellipsoid::named(&options.to)?,
        dx: options.dx,
        dy: options.dy,
        dz: options.dz,
        max_iterations: options.max_iterations,
        eccentricity,
        ..DatumShiftDef::default()
    })
    .context("bad shift definition")?;

    if shift.is_null() {
        log::info!("null shift: input will pass through (almost) unchanged");
    }

    let direction = if options.inv { Inv } else { Fwd };

    for (index, line) in std::io::stdin().lock().lines().enumerate() {
        let number = index + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let coordinate =
            parse_coordinate(line).with_context(|| format!("malformed input at line {number}"))?;

        let result = if options.two_d {
            shift
                .apply_2d(&coordinate, direction)
                .with_context(|| format!("shift failed at line {number}"))?
                .coordinate()
        } else {
            shift
                .apply(&coordinate, direction)
                .with_context(|| format!("shift failed at line {number}"))?
        };
        println!("{result}");
    }
    Ok(())
}

fn parse_coordinate(line: &str) -> anyhow::Result<Geographic> {
    let fields: Vec<f64> = line
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    match fields[..] {
        [longitude, latitude] => Ok(Geographic::gis(longitude, latitude, 0.)),
        [longitude, latitude, height] => Ok(Geographic::gis(longitude, latitude, height)),
        _ => bail!("expected 2 or 3 fields, got {}", fields.len()),
    }
}
