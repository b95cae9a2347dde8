use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pbatch",
    about = "Characterize PDB ensembles and batch them by sequence length",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Characterize ensembles: catalog table, statistics and report
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Partition ensembles from the catalog and relocate them into batches
    #[command(visible_alias = "b")]
    Batch(BatchArgs),

    /// Analyze, then batch from the fresh catalog
    #[command(visible_alias = "r")]
    Run(RunArgs),
}

impl Command {
    pub fn source(&self) -> &SourceOptions {
        match self {
            Command::Analyze(args) => &args.source,
            Command::Batch(args) => &args.source,
            Command::Run(args) => &args.source,
        }
    }
}

/// Source selection and output options shared by all commands.
#[derive(Args)]
pub struct SourceOptions {
    /// Project directories, or source directories holding the PDB files
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Pipeline configuration (TOML); command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extension of the structure files to scan [default: pdb]
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Prefix of the sub-directory holding the structure files [default: completed_]
    #[arg(long, value_name = "PREFIX")]
    pub source_prefix: Option<String>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args)]
#[command(next_help_heading = "Length Bins")]
pub struct BinOptions {
    /// Width of a sequence length bin in residues [default: 50]
    #[arg(long, value_name = "N")]
    pub bin_width: Option<usize>,

    /// Lengths above this share one open-ended bin [default: 2500]
    #[arg(long, value_name = "N")]
    pub ceiling: Option<usize>,
}

#[derive(Args)]
#[command(next_help_heading = "Partitioning")]
pub struct PartitionOptions {
    /// Longest chain handled by the balanced short regime [default: 600]
    #[arg(long, value_name = "N")]
    pub threshold: Option<usize>,

    /// Number of balanced short-regime batches [default: 4]
    #[arg(long, value_name = "K")]
    pub short_batches: Option<usize>,

    /// Maximum files per long-regime batch [default: 90]
    #[arg(long, value_name = "N")]
    pub max_batch_size: Option<usize>,

    /// Keep catalog order inside long bins instead of sorting by length
    #[arg(long)]
    pub keep_order: bool,
}

#[derive(Args)]
#[command(next_help_heading = "Relocation")]
pub struct RelocationOptions {
    /// Copy files into batch directories instead of moving them
    #[arg(long)]
    pub copy: bool,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceOptions,

    #[command(flatten)]
    pub bins: BinOptions,
}

#[derive(Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub source: SourceOptions,

    /// Re-scan the structure files instead of loading the catalog table
    #[arg(long)]
    pub rescan: bool,

    #[command(flatten)]
    pub bins: BinOptions,

    #[command(flatten)]
    pub partition: PartitionOptions,

    #[command(flatten)]
    pub relocation: RelocationOptions,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceOptions,

    #[command(flatten)]
    pub bins: BinOptions,

    #[command(flatten)]
    pub partition: PartitionOptions,

    #[command(flatten)]
    pub relocation: RelocationOptions,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn batch_flags_parse() {
        let cli = Cli::try_parse_from([
            "pbatch",
            "batch",
            "/data/cat2",
            "--max-batch-size",
            "30",
            "--copy",
            "--rescan",
            "-vv",
        ])
        .unwrap();
        let Command::Batch(args) = cli.command else {
            panic!("expected batch command");
        };
        assert_eq!(args.source.paths, [PathBuf::from("/data/cat2")]);
        assert_eq!(args.partition.max_batch_size, Some(30));
        assert!(args.relocation.copy);
        assert!(args.rescan);
        assert_eq!(args.source.verbose, 2);
    }

    #[test]
    fn analyze_rejects_partition_flags() {
        assert!(Cli::try_parse_from(["pbatch", "analyze", "/x", "--max-batch-size", "3"]).is_err());
    }
}
