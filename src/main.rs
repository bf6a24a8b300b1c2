use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use biome_tiles::config::{default_pyramid, load_levels, PipelineConfig};
use biome_tiles::coords::{TileSizePolicy, SINGLE_TILE_SIZE};
use biome_tiles::error::PipelineError;
use biome_tiles::noise_sampler::NoiseSampler;
use biome_tiles::pipeline::{generate_pyramid, generate_single, generate_tile, RunSummary};
use biome_tiles::raster::RasterOptions;
use biome_tiles::render::TileOutcome;
use biome_tiles::sampler::{BiomeFlavor, Dimension, SamplerSettings};

#[derive(Parser, Debug)]
#[command(name = "biome_tiles")]
#[command(about = "Render biome map tiles for a tiled-map viewer")]
struct Cli {
    #[command(flatten)]
    options: CommonOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonOptions {
    /// Root directory for {seed}/{zoom}/{x}/{y}.png tiles
    #[arg(short, long, global = true, default_value = "tiles")]
    output: PathBuf,

    /// Zoom levels rendered at the same time (0 = one per CPU)
    #[arg(short, long, global = true, default_value = "0")]
    workers: usize,

    /// Pixel block edge per sampled cell
    #[arg(long, global = true, default_value = "4")]
    pixels_per_cell: u32,

    /// Use this tile edge (in cells) at every zoom level instead of doubling per level
    #[arg(long, global = true)]
    tile_size: Option<u32>,

    /// Tile edge (in cells) at zoom level 0 when doubling per level
    #[arg(long, global = true, default_value = "64")]
    base_unit: u32,

    /// Biome size
    #[arg(long, global = true, value_enum, default_value_t = BiomeFlavor::LargeBiomes)]
    flavor: BiomeFlavor,

    /// Dimension to sample
    #[arg(long, global = true, value_enum, default_value_t = Dimension::Overworld)]
    dimension: Dimension,

    /// Keep cell row 0 at the top of each tile
    #[arg(long, global = true)]
    no_flip: bool,

    /// Darken the edges of each cell block
    #[arg(long, global = true)]
    cell_outline: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a centred viewport's worth of tiles at one zoom level
    GenerateSingle {
        seed: u64,
        #[arg(allow_negative_numbers = true)]
        zoom_level: i64,
    },
    /// Render every level of a tile pyramid concurrently
    GeneratePyramid {
        seed: u64,
        /// JSON array of {zoom, tiles_per_side, scale, tile_size} (built-in table if omitted)
        #[arg(long)]
        levels: Option<PathBuf>,
    },
    /// Render exactly one tile
    GenerateTile {
        seed: u64,
        #[arg(allow_negative_numbers = true)]
        tile_x: i32,
        #[arg(allow_negative_numbers = true)]
        tile_y: i32,
        #[arg(allow_negative_numbers = true)]
        zoom_level: i64,
        scale: u32,
        /// Use the 96-cell tile edge at any zoom level (--tile-size takes precedence)
        #[arg(long)]
        standalone_size: bool,
    },
}

impl CommonOptions {
    fn tile_policy(&self, standalone: bool) -> TileSizePolicy {
        match self.tile_size {
            Some(size) => TileSizePolicy::Fixed { size },
            None if standalone => TileSizePolicy::Fixed {
                size: SINGLE_TILE_SIZE,
            },
            None => TileSizePolicy::Doubling {
                base_unit: self.base_unit,
            },
        }
    }

    fn to_config(&self, standalone: bool) -> Result<PipelineConfig, PipelineError> {
        if self.pixels_per_cell == 0 {
            return Err(PipelineError::InvalidArgument(
                "pixels per cell must be positive".into(),
            ));
        }

        Ok(PipelineConfig {
            output_root: self.output.clone(),
            workers: self.workers,
            raster: RasterOptions {
                pixels_per_cell: self.pixels_per_cell,
                flip: !self.no_flip,
                cell_outline: self.cell_outline,
            },
            sampler: SamplerSettings {
                flavor: self.flavor,
                dimension: self.dimension,
                ..SamplerSettings::default()
            },
            tile_size: self.tile_policy(standalone),
        })
    }
}

fn zoom_level(value: i64) -> Result<u32, PipelineError> {
    if value < 0 {
        return Err(PipelineError::InvalidArgument(
            "Zoom level must be non-negative".into(),
        ));
    }
    u32::try_from(value).map_err(|_| {
        PipelineError::InvalidArgument(format!("zoom level {} is too large", value))
    })
}

/// Exit status for a command line clap could not turn into a `Cli`.
///
/// Help and version requests succeed; every usage error exits with 1.
fn parse_failure_code(e: &clap::Error) -> u8 {
    if e.use_stderr() {
        1
    } else {
        0
    }
}

fn report(summary: &RunSummary) {
    for level in &summary.levels {
        println!(
            "Zoom level {}: {} rendered, {} cached, {} failed",
            level.zoom_level, level.rendered, level.cached, level.failed
        );
    }
    println!("{}", summary.progress.summary());
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let standalone = matches!(
        cli.command,
        Command::GenerateTile {
            standalone_size: true,
            ..
        }
    );
    let config = cli.options.to_config(standalone)?;

    match cli.command {
        Command::GenerateSingle {
            seed,
            zoom_level: zoom,
        } => {
            let zoom = zoom_level(zoom)?;
            println!("Generating zoom level {} for seed {}", zoom, seed);
            let summary = generate_single(&config, seed, zoom, NoiseSampler::new)?;
            report(&summary);
        }
        Command::GeneratePyramid { seed, levels } => {
            let levels = match levels {
                Some(path) => load_levels(&path)?,
                None => default_pyramid(),
            };
            println!("Generating {} zoom levels for seed {}", levels.len(), seed);
            let summary = generate_pyramid(&config, seed, &levels, NoiseSampler::new)?;
            report(&summary);
        }
        Command::GenerateTile {
            seed,
            tile_x,
            tile_y,
            zoom_level: zoom,
            scale,
            ..
        } => {
            let zoom = zoom_level(zoom)?;
            let mut sampler = NoiseSampler::new();
            match generate_tile(&config, seed, tile_x, tile_y, zoom, scale, &mut sampler)? {
                TileOutcome::Rendered(path) => {
                    println!("Tile generated and saved to {}", path.display())
                }
                TileOutcome::Cached(path) => {
                    println!("Tile already present at {}", path.display())
                }
                TileOutcome::Failed(e) => {
                    eprintln!("Tile {}_{} not generated: {}", tile_x, tile_y, e)
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_code(&e));
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let argv = std::iter::once("biome_tiles").chain(args.iter().copied());
        Cli::try_parse_from(argv)
    }

    #[test]
    fn test_negative_zoom_is_rejected_before_any_work() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let out_arg = out.to_str().unwrap();

        assert!(zoom_level(-1).is_err());
        assert_eq!(zoom_level(3).unwrap(), 3);

        let single = parse(&["-o", out_arg, "generate-single", "1", "-1"]).unwrap();
        assert!(matches!(run(single), Err(PipelineError::InvalidArgument(_))));

        let tile = parse(&["-o", out_arg, "generate-tile", "1", "0", "0", "-2", "4"]).unwrap();
        assert!(matches!(run(tile), Err(PipelineError::InvalidArgument(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_usage_errors_exit_with_one() {
        let missing = parse(&["generate-tile", "1", "0", "0"]).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse_failure_code(&missing), 1);

        let extra = parse(&["generate-single", "1", "2", "3"]).unwrap_err();
        assert_eq!(parse_failure_code(&extra), 1);

        let no_command = parse(&[]).unwrap_err();
        assert_eq!(parse_failure_code(&no_command), 1);

        let help = parse(&["--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse_failure_code(&help), 0);
    }

    #[test]
    fn test_dimension_and_flavor_parse_as_value_enums() {
        let cli = parse(&["generate-pyramid", "7"]).unwrap();
        let config = cli.options.to_config(false).unwrap();
        assert_eq!(config.sampler.dimension, Dimension::Overworld);
        assert_eq!(config.sampler.flavor, BiomeFlavor::LargeBiomes);

        let cli = parse(&[
            "generate-pyramid",
            "7",
            "--dimension",
            "nether",
            "--flavor",
            "normal",
        ])
        .unwrap();
        let config = cli.options.to_config(false).unwrap();
        assert_eq!(config.sampler.dimension, Dimension::Nether);
        assert_eq!(config.sampler.flavor, BiomeFlavor::Normal);

        let err = parse(&["--dimension", "moon", "generate-pyramid", "7"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(parse_failure_code(&err), 1);
    }

    #[test]
    fn test_tile_size_options() {
        let cli = parse(&["generate-tile", "1", "0", "0", "2", "4"]).unwrap();
        assert_eq!(
            cli.options.to_config(false).unwrap().tile_size,
            TileSizePolicy::Doubling { base_unit: 64 }
        );

        let standalone = ["generate-tile", "1", "0", "0", "2", "4", "--standalone-size"];
        let cli = parse(&standalone).unwrap();
        assert!(matches!(
            cli.command,
            Command::GenerateTile {
                standalone_size: true,
                ..
            }
        ));
        assert_eq!(
            cli.options.tile_policy(true),
            TileSizePolicy::Fixed { size: 96 }
        );

        let fixed = ["--tile-size", "32", "generate-tile", "1", "0", "0", "2", "4"];
        let cli = parse(&fixed).unwrap();
        assert_eq!(cli.options.tile_policy(true), TileSizePolicy::Fixed { size: 32 });
    }

    #[test]
    fn test_zero_pixels_per_cell_is_rejected() {
        let cli = parse(&["--pixels-per-cell", "0", "generate-pyramid", "1"]).unwrap();
        assert!(matches!(
            cli.options.to_config(false),
            Err(PipelineError::InvalidArgument(_))
        ));
    }
}
