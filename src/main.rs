//! IntervalRemap CLI entry point
//!
//! Pushes the seed ranges of an almanac through its map stages.

use clap::{Parser, Subcommand, ValueEnum};
use interval_remap::core::{MergePolicy, RemapOptions, Remapper};
use interval_remap::formats::{parse_almanac_file, Almanac, SeedMode};
use interval_remap::Pipeline;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// How seed values become initial ranges (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum SeedModeArg {
    /// Consecutive values are (start, length) pairs
    #[default]
    #[value(name = "pairs")]
    Pairs,
    /// Every value is its own length-1 range
    #[value(name = "points")]
    Points,
}

impl From<SeedModeArg> for SeedMode {
    fn from(arg: SeedModeArg) -> Self {
        match arg {
            SeedModeArg::Pairs => SeedMode::Pairs,
            SeedModeArg::Points => SeedMode::Points,
        }
    }
}

/// When to merge fragments (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum MergeArg {
    /// Keep every fragment
    #[default]
    #[value(name = "never")]
    Never,
    /// Merge after every stage
    #[value(name = "between")]
    Between,
    /// Merge once at the end
    #[value(name = "final")]
    Final,
}

impl From<MergeArg> for MergePolicy {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::Never => MergePolicy::Never,
            MergeArg::Between => MergePolicy::BetweenStages,
            MergeArg::Final => MergePolicy::Final,
        }
    }
}

#[derive(Parser)]
#[command(name = "interval-remap")]
#[command(about = "Push integer ranges through a pipeline of translation stages")]
#[command(version)]
struct Cli {
    /// Reject overlapping or zero-length map entries before running
    #[arg(long, global = true)]
    validate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remap seed ranges and write the final ranges
    Remap {
        /// Almanac input file (plain, .gz or .bz2)
        input: PathBuf,
        /// Output file (optional, stdout if not specified)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Seed interpretation: pairs or points
        #[arg(long = "seeds", default_value = "pairs")]
        seed_mode: SeedModeArg,
        /// Fragment merging: never, between or final
        #[arg(long, default_value = "never")]
        merge: MergeArg,
        /// Number of threads (0: all CPUs)
        #[arg(short = 't', long, default_value = "1")]
        threads: usize,
    },
    /// Print the lowest start of the final ranges
    Lowest {
        /// Almanac input file (plain, .gz or .bz2)
        input: PathBuf,
        /// Seed interpretation: pairs or points
        #[arg(long = "seeds", default_value = "pairs")]
        seed_mode: SeedModeArg,
        /// Number of threads (0: all CPUs)
        #[arg(short = 't', long, default_value = "1")]
        threads: usize,
    },
    /// Map single values through every stage
    Point {
        /// Almanac input file (plain, .gz or .bz2)
        input: PathBuf,
        /// Values to map
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
    },
}

fn load_almanac(input: &PathBuf, validate: bool) -> anyhow::Result<(Almanac, Pipeline)> {
    let start = Instant::now();
    eprintln!("Loading almanac: {:?}", input);

    let almanac = parse_almanac_file(input)
        .map_err(|e| anyhow::anyhow!("Failed to load almanac: {}", e))?;

    if let Some(stage) = almanac.first_broken_link() {
        log::warn!(
            "Stage {} ({}) does not follow on from {}",
            stage,
            almanac.stages[stage].header,
            almanac.stages[stage - 1].header
        );
    }

    let pipeline = if validate {
        almanac.try_pipeline()?
    } else {
        almanac.pipeline()
    };

    eprintln!(
        "Loaded {} seeds and {} stages in {:.2}s",
        almanac.seeds.len(),
        pipeline.stage_count(),
        start.elapsed().as_secs_f64()
    );
    Ok((almanac, pipeline))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Remap { input, output, seed_mode, merge, threads } => {
            let (almanac, pipeline) = load_almanac(&input, cli.validate)?;
            let initial = almanac.initial_ranges(seed_mode.into());

            let options = RemapOptions { merge: merge.into(), threads };
            let remapper = Remapper::with_options(pipeline, options);
            let (ranges, stats) = remapper.remap_with_stats(&initial)?;

            let sink: Box<dyn Write> = match &output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout().lock()),
            };
            let mut writer = BufWriter::with_capacity(128 * 1024, sink);
            for range in &ranges {
                writeln!(writer, "{}\t{}", range.start(), range.length())?;
            }
            writer.flush()?;

            eprintln!("\n=== Remap Statistics ===");
            eprintln!("Input ranges:    {}", stats.input_ranges);
            eprintln!("Input length:    {}", stats.input_length);
            eprintln!("Output ranges:   {}", stats.output_ranges);
            eprintln!("Output length:   {}", stats.output_length);
            for (i, count) in stats.stage_fragments.iter().enumerate() {
                eprintln!("  - Stage {:<2}     {} fragments", i, count);
            }
            match interval_remap::lowest_start(&ranges) {
                Some(lowest) => eprintln!("Lowest start:    {}", lowest),
                None => eprintln!("Lowest start:    none"),
            }
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Lowest { input, seed_mode, threads } => {
            let (almanac, pipeline) = load_almanac(&input, cli.validate)?;
            let initial = almanac.initial_ranges(seed_mode.into());

            let options = RemapOptions { merge: MergePolicy::Never, threads };
            let lowest = Remapper::with_options(pipeline, options).lowest(&initial)?;
            match lowest {
                Some(value) => println!("{}", value),
                None => anyhow::bail!("No ranges reached the last stage"),
            }
        }

        Commands::Point { input, values } => {
            let (_, pipeline) = load_almanac(&input, cli.validate)?;
            for value in values {
                println!("{}\t{}", value, pipeline.map_point(value));
            }
        }
    }

    Ok(())
}
