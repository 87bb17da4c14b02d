use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "wordfreq",
    about = "Rank the files of indexed corpora by how often they use a word",
    long_about = "Reads query words from stdin, one per line. For each word, \
                  prints `<frequency> <filename>` for every indexed file that \
                  contains it, most frequent first."
)]
pub struct Cli {
    /// Root directory holding one indexed subdirectory per corpus
    #[arg(short = 'd', long = "dir", value_name = "DIRECTORY_NAME")]
    pub dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the word index of one corpus directory
    Index(IndexArgs),
    /// Serve lookups for one corpus over stdin/stdout
    #[command(hide = true)]
    Worker(WorkerArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Index --

#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Corpus directory to index
    pub dir: PathBuf,

    /// Only index files whose relative path matches this glob
    #[arg(long, default_value = "*")]
    pub include: String,
}

// -- Worker --

#[derive(Debug, Parser)]
pub struct WorkerArgs {
    /// Corpus directory whose index this worker serves
    pub dir: PathBuf,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "wordfreq",
            &mut std::io::stdout(),
        );
    }
}
