use std::{
    io::{self, BufReader, Read, Write},
    path::PathBuf,
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use crate::{
    error::{Error, Result},
    protocol::{self, QueryBuffer, ResultRecord},
    root_dir::Corpus,
};

/// The master's ends of one worker's channel pair.
///
/// `W` carries query buffers to the worker; `R` carries result records
/// back. The query end is closed exactly once, by [`close_query`], which
/// is how the worker learns to exit.
///
/// [`close_query`]: WorkerChannel::close_query
pub struct WorkerChannel<W, R> {
    name: String,
    query: Option<W>,
    results: R,
}

impl<W: Write, R: Read> WorkerChannel<W, R> {
    pub fn new(name: impl Into<String>, query: W, results: R) -> Self {
        Self {
            name: name.into(),
            query: Some(query),
            results,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.query.is_some()
    }

    pub fn send_query(&mut self, buf: &QueryBuffer) -> io::Result<()> {
        let Some(query) = self.query.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "query channel already closed",
            ));
        };
        query.write_all(buf)?;
        query.flush()
    }

    /// Read the next record of the current response.
    ///
    /// Any failure, including the stream ending before a terminator, is a
    /// protocol error: there is no way to resynchronize mid-response.
    pub fn recv_record(&mut self) -> Result<ResultRecord> {
        protocol::read_record(&mut self.results).map_err(|source| {
            Error::Protocol {
                worker: self.name.clone(),
                source,
            }
        })
    }

    /// Close the query end. Returns `false` if it was already closed.
    pub fn close_query(&mut self) -> bool {
        self.query.take().is_some()
    }
}

/// A channel pair backed by a worker process's stdin and stdout.
pub type ProcessChannel = WorkerChannel<ChildStdin, BufReader<ChildStdout>>;

/// How to start one worker process.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub verbose: u8,
    pub quiet: bool,
}

impl WorkerCommand {
    /// Start workers by re-running the current executable.
    pub fn current_exe(verbose: u8, quiet: bool) -> Result<Self> {
        Ok(Self {
            program: std::env::current_exe()?,
            verbose,
            quiet,
        })
    }

    fn command(&self, corpus: &Corpus) -> Command {
        let mut cmd = Command::new(&self.program);
        for _ in 0..self.verbose {
            cmd.arg("--verbose");
        }
        if self.quiet {
            cmd.arg("--quiet");
        }
        cmd.arg("worker")
            .arg(&corpus.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }
}

/// One worker process per corpus, in corpus order.
pub struct WorkerPool {
    channels: Vec<ProcessChannel>,
    children: Vec<Child>,
}

impl WorkerPool {
    /// Start a worker for every corpus and keep the master's channel ends.
    ///
    /// `Command::spawn` drops the child's pipe ends in this process, and
    /// std opens every pipe close-on-exec, so later workers never inherit
    /// an earlier worker's channels. On failure the channels created so far
    /// are dropped, which closes their query ends and lets those workers
    /// exit.
    pub fn spawn(corpora: &[Corpus], command: &WorkerCommand) -> Result<Self> {
        let mut pool = Self {
            channels: Vec::with_capacity(corpora.len()),
            children: Vec::with_capacity(corpora.len()),
        };

        for corpus in corpora {
            let spawn_error = |source: io::Error| Error::Spawn {
                worker: corpus.name.clone(),
                source,
            };

            let mut child =
                command.command(corpus).spawn().map_err(spawn_error)?;
            let (Some(query), Some(results)) =
                (child.stdin.take(), child.stdout.take())
            else {
                return Err(spawn_error(io::Error::other(
                    "worker started without piped stdio",
                )));
            };

            tracing::debug!(
                slot = pool.channels.len(),
                corpus = %corpus.path.display(),
                pid = child.id(),
                "spawned worker"
            );

            pool.channels.push(WorkerChannel::new(
                corpus.name.as_str(),
                query,
                BufReader::new(results),
            ));
            pool.children.push(child);
        }

        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.children.iter().map(Child::id).collect()
    }

    /// Hand the channels to the query master.
    ///
    /// Worker processes are not waited on; each exits once its query
    /// channel is closed.
    pub fn into_channels(self) -> Vec<ProcessChannel> {
        self.channels
    }
}
