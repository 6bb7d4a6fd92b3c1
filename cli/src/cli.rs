use std::path::PathBuf;

use buildcross::{io::TagFilter, CrossingConfig};

/// Building line-of-sight obstruction counter
#[derive(clap::Parser, Debug)]
#[command(name = "buildcross", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Count obstructions between every pair of buildings and write the results
    Count(CountArgs),

    /// Load footprints and report the ones that would be excluded
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// GeoJSON FeatureCollection, or JSON array of building records
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Keep only features whose properties match key=value, defaults to building=yes
    #[arg(long, conflicts_with = "all")]
    pub tag: Option<TagFilter>,

    /// Keep every areal feature regardless of its properties
    #[arg(long)]
    pub all: bool,
}

impl InputArgs {
    pub fn filter(&self) -> TagFilter {
        if self.all {
            TagFilter::any()
        } else {
            self.tag.clone().unwrap_or_default()
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Absolute coordinate tolerance, derived from the data when omitted
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Number of worker threads, defaults to all cores
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Scan every footprint for each pair instead of querying the spatial index
    #[arg(long)]
    pub no_index: bool,
}

impl CountArgs {
    pub fn config(&self) -> CrossingConfig {
        CrossingConfig {
            epsilon: self.epsilon,
            threads: self.threads,
            use_index: !self.no_index,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,
}
