use std::{
    io::{Read, Write},
    path::Path,
};

use crate::{
    error::Result,
    index::WordIndex,
    protocol::{self, ResultRecord},
};

/// Load the index of `dir` and answer queries until `input` is closed.
///
/// A load failure ends this worker only; the master notices when the
/// result channel closes before a terminator arrives.
pub fn run_worker<R: Read, W: Write>(
    dir: &Path,
    input: R,
    output: W,
) -> Result<usize> {
    let index = WordIndex::load(dir)?;
    serve(&index, input, output)
}

/// Answer query buffers from `input` with result records on `output`.
///
/// Each response is the lookup result in registry order, terminator last,
/// flushed as a unit. Write failures are logged and the loop moves on to
/// the next query. Returns the number of queries answered once the
/// master closes the query channel.
pub fn serve<R: Read, W: Write>(
    index: &WordIndex,
    mut input: R,
    mut output: W,
) -> Result<usize> {
    let mut answered = 0;

    while let Some(buf) = protocol::read_query(&mut input)? {
        let word = protocol::decode_query(&buf);
        let records = index.lookup(&word);
        tracing::trace!(word, matches = records.len() - 1, "answering query");

        send_response(&mut output, &records);
        answered += 1;
    }

    tracing::debug!(answered, "query channel closed");
    Ok(answered)
}

fn send_response<W: Write>(output: &mut W, records: &[ResultRecord]) {
    for record in records {
        if let Err(e) = protocol::write_record(output, record) {
            tracing::warn!(error = %e, "write to master failed");
        }
    }
    if let Err(e) = output.flush() {
        tracing::warn!(error = %e, "flush to master failed");
    }
}
