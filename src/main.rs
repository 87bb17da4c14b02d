use std::{
    io::{self, BufWriter},
    path::Path,
    process::ExitCode,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wordfreq::{
    Limits,
    QueryMaster,
    RootDir,
    WorkerCommand,
    WorkerPool,
    cli::{Cli, Command, IndexArgs, WorkerArgs},
    error::Result,
    indexer,
    worker,
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("WORDFREQ_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wordfreq: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        dir,
        verbose,
        quiet,
        command,
    } = cli;

    match command {
        None => cmd_query(dir.as_deref(), verbose, quiet),
        Some(Command::Index(args)) => cmd_index(&args),
        Some(Command::Worker(args)) => cmd_worker(&args),
        Some(Command::Completions(args)) => {
            args.generate();
            Ok(())
        }
    }
}

fn cmd_query(dir: Option<&Path>, verbose: u8, quiet: bool) -> Result<()> {
    let limits = Limits::default();
    let root = RootDir::resolve(dir)?;

    // Fails before anything is spawned when the root holds too many corpora.
    let corpora = root.corpora(limits.max_workers)?;

    let command = WorkerCommand::current_exe(verbose, quiet)?;
    let pool = WorkerPool::spawn(&corpora, &command)?;
    tracing::debug!(
        root = %root.root().display(),
        workers = pool.len(),
        pids = ?pool.pids(),
        "worker pool ready"
    );

    let master = QueryMaster::new(pool.into_channels(), limits.max_records);
    let summary = master.run(io::stdin().lock(), io::stdout().lock())?;
    tracing::debug!(
        queries = summary.queries,
        closed = summary.closed,
        "shut down workers"
    );
    Ok(())
}

fn cmd_worker(args: &WorkerArgs) -> Result<()> {
    let answered = worker::run_worker(
        &args.dir,
        io::stdin().lock(),
        BufWriter::new(io::stdout().lock()),
    )?;
    tracing::trace!(corpus = %args.dir.display(), answered, "worker exiting");
    Ok(())
}

fn cmd_index(args: &IndexArgs) -> Result<()> {
    if !args.dir.is_dir() {
        return Err(wordfreq::Error::Config(format!(
            "path is not a directory: {}",
            args.dir.display()
        )));
    }

    let index = indexer::index_directory(&args.dir, &args.include)?;
    println!(
        "Indexed {} files ({} words) in {}",
        index.files().len(),
        index.entries().len(),
        args.dir.display()
    );
    Ok(())
}
