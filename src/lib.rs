//! wordfreq - ranked word-frequency queries over a pool of corpus workers.
//!
//! A root directory holds one indexed subdirectory per corpus. The query
//! master starts one worker process per corpus, broadcasts every query
//! word to all of them over fixed-size pipe messages, and merges the
//! per-file counts they send back into a single ranking.
//!
//! # Quick start
//!
//! ```no_run
//! use wordfreq::{Limits, QueryMaster, RootDir, WorkerCommand, WorkerPool};
//!
//! let limits = Limits::default();
//! let root = RootDir::resolve(None).unwrap();
//! let corpora = root.corpora(limits.max_workers).unwrap();
//!
//! let command = WorkerCommand::current_exe(0, false).unwrap();
//! let pool = WorkerPool::spawn(&corpora, &command).unwrap();
//! let master = QueryMaster::new(pool.into_channels(), limits.max_records);
//!
//! let stdin = std::io::stdin().lock();
//! let stdout = std::io::stdout().lock();
//! master.run(stdin, stdout).unwrap();
//! ```

pub mod cli;
pub mod error;
pub mod index;
pub mod indexer;
pub mod limits;
pub mod master;
pub mod pool;
pub mod protocol;
pub mod ranking;
pub mod root_dir;
pub mod worker;

pub use error::{Error, Result};
pub use index::WordIndex;
pub use limits::Limits;
pub use master::QueryMaster;
pub use pool::{WorkerCommand, WorkerPool};
pub use root_dir::RootDir;
