use std::io::{BufRead, Read, Write};

use crate::{
    error::Result,
    limits::MAX_WORD,
    pool::WorkerChannel,
    protocol::{self, QueryBuffer, ResultRecord},
    ranking::{self, RankedList},
};

/// Totals reported once the query input is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Input lines answered.
    pub queries: usize,
    /// Query channels closed at shutdown.
    pub closed: usize,
}

/// Drives the query loop over a fixed set of workers.
///
/// Each query is broadcast to every worker before any response is read,
/// so workers look words up concurrently. Responses are then drained one
/// worker at a time in slot order, which makes the merge deterministic: a
/// slow worker delays every worker after it.
pub struct QueryMaster<W: Write, R: Read> {
    workers: Vec<WorkerChannel<W, R>>,
    max_records: usize,
}

impl<W: Write, R: Read> QueryMaster<W, R> {
    pub fn new(workers: Vec<WorkerChannel<W, R>>, max_records: usize) -> Self {
        Self {
            workers,
            max_records,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Answer one raw input line.
    ///
    /// Returns at most `max_records` ranked records followed by the
    /// terminator. A worker whose result stream fails or ends early aborts
    /// the whole query.
    pub fn query(&mut self, line: &[u8]) -> Result<Vec<ResultRecord>> {
        let buf = protocol::encode_query(line);
        self.broadcast(&buf);

        let mut ranked = RankedList::new();
        for worker in &mut self.workers {
            loop {
                let record = worker.recv_record()?;
                if record.is_terminator() {
                    break;
                }
                ranked.insert(record);
            }
        }

        tracing::trace!(matches = ranked.len(), "merged responses");
        Ok(ranked.finalize(self.max_records))
    }

    fn broadcast(&mut self, buf: &QueryBuffer) {
        for worker in &mut self.workers {
            if let Err(e) = worker.send_query(buf) {
                tracing::warn!(
                    worker = worker.name(),
                    error = %e,
                    "write to worker failed"
                );
            }
        }
    }

    /// Answer every line of `input`, printing ranked results to `output`,
    /// then shut the workers down.
    pub fn run<I: BufRead, O: Write>(
        mut self,
        mut input: I,
        mut output: O,
    ) -> Result<RunSummary> {
        let mut line = Vec::with_capacity(MAX_WORD);
        let mut queries = 0;

        while input.read_until(b'\n', &mut line)? > 0 {
            let records = self.query(&line)?;
            ranking::write_records(&mut output, &records)?;
            output.flush()?;

            queries += 1;
            line.clear();
        }

        let closed = self.shutdown();
        tracing::debug!(queries, closed, "query input exhausted");
        Ok(RunSummary { queries, closed })
    }

    /// Close every query channel, signalling the workers to exit.
    ///
    /// Returns how many channels this call closed.
    pub fn shutdown(mut self) -> usize {
        self.workers
            .iter_mut()
            .map(WorkerChannel::close_query)
            .filter(|&closed| closed)
            .count()
    }
}
