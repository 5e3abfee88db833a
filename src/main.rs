use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use recode_subs::pipeline::{self, PipelineConfig};
use recode_subs::Notation;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NotationArg {
    /// Middle base of a three-base context decides, e.g. AGA>T
    Trinucleotide,
    /// First base decides, e.g. G>A
    Single,
}

impl From<NotationArg> for Notation {
    fn from(arg: NotationArg) -> Self {
        match arg {
            NotationArg::Trinucleotide => Notation::Trinucleotide,
            NotationArg::Single => Notation::SingleBase,
        }
    }
}

#[derive(Parser)]
#[command(name = "recode-subs")]
#[command(about = "Report substitutions on the pyrimidine strand, one record per line")]
struct Args {
    #[arg(short = 'i', long, default_value = "-", help = "Input file (.gz ok, - for stdin)")]
    input: PathBuf,

    #[arg(short = 'o', long, default_value = "-", help = "Output file (.gz ok, - for stdout)")]
    output: PathBuf,

    #[arg(short = 'm', long, value_enum, default_value = "trinucleotide", help = "Record layout")]
    notation: NotationArg,

    #[arg(short = 't', long, default_value = "4", help = "Number of worker threads")]
    threads: usize,

    #[arg(short = 'b', long, default_value = "100000", help = "Records per batch")]
    batch_size: usize,

    #[arg(short = 'v', long, default_value = "false", help = "Verbose output showing progress")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let config = PipelineConfig {
        notation: args.notation.into(),
        threads: args.threads,
        batch_size: args.batch_size,
    };
    config.validate()?;

    info!(
        "Recoding {} as {:?} with {} threads",
        args.input.display(),
        config.notation,
        config.threads
    );
    let start = Instant::now();

    let stats = pipeline::recode_file(&args.input, &args.output, &config)?;

    info!(
        "Recoded {} records ({} complemented) in {} batches, {:.1}s",
        stats.records,
        stats.flipped,
        stats.batches,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
