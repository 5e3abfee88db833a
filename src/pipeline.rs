//! Streaming recoder: newline-delimited records in, canonical records out.
//!
//! A reader thread cuts the input into numbered batches, a pool of workers
//! canonicalizes them, and the calling thread writes finished batches back in
//! input order.
//!
//! The reader needs a permit for every batch it dispatches and the writer hands
//! one back for every batch it writes, so at most `threads * 2` batches are
//! between the two at any time. Batches that finish ahead of an earlier one wait
//! in a reorder map whose size is bounded by the same window.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, warn};

use crate::canon::{normalize_counted, Notation};
use crate::error::RecodeError;
use crate::io::{create_writer, open_reader, STDIO_PATH};

/// Settings for [`run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub notation: Notation,
    pub threads: usize,
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { notation: Notation::Trinucleotide, threads: 4, batch_size: 100_000 }
    }
}

impl PipelineConfig {
    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.threads == 0 {
            return Err(RecodeError::InvalidParameter {
                parameter: "threads".to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(RecodeError::InvalidParameter {
                parameter: "batch-size".to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }

    /// Maximum number of batches dispatched but not yet written.
    #[must_use]
    pub fn window(&self) -> usize {
        self.threads * 2
    }
}

/// Counts reported after a successful run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records read and written.
    pub records: usize,
    /// Records whose decision base was G or A and were complemented.
    pub flipped: usize,
    /// Batches processed.
    pub batches: usize,
    /// Most batches held back at once waiting for an earlier batch.
    pub peak_pending: usize,
}

struct RecordBatch {
    seq: u64,
    /// 1-based line number of the first record.
    first_line: usize,
    records: Vec<String>,
}

struct RecodedBatch {
    seq: u64,
    first_line: usize,
    /// Canonical records and the number that were complemented.
    result: crate::Result<(Vec<String>, usize)>,
}

/// Recodes every line of `reader` into `writer`.
///
/// Stops at the first malformed record; the error names its line number.
/// Batches before the failing one have already been written by then, so on
/// error the caller must treat `writer`'s contents as incomplete and discard
/// them. [`recode_file`] does this for files.
pub fn run<R, W>(reader: R, mut writer: W, config: &PipelineConfig) -> Result<PipelineStats>
where
    R: BufRead + Send,
    W: Write,
{
    config.validate()?;
    let decision_index = config.notation.decision_index();
    let batch_size = config.batch_size;
    let window = config.window();

    thread::scope(|scope| {
        let (batch_tx, batch_rx) = bounded::<RecordBatch>(window);
        let (output_tx, output_rx) = bounded::<RecodedBatch>(window);
        let (permit_tx, permit_rx) = permits(window);

        let reader_handle =
            scope.spawn(move || read_batches(reader, batch_size, &batch_tx, &permit_rx));

        for _ in 0..config.threads {
            let rx = batch_rx.clone();
            let tx = output_tx.clone();
            scope.spawn(move || {
                while let Ok(batch) = rx.recv() {
                    if tx.send(recode_batch(batch, decision_index)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(batch_rx);
        drop(output_tx);

        let stats = write_in_order(output_rx, permit_tx, &mut writer)?;
        writer.flush().context("Failed to flush output")?;

        reader_handle.join().map_err(|_| anyhow!("Reader thread panicked"))??;
        Ok(stats)
    })
}

/// Recodes the file at `input` into `output`, either of which may be `-`.
///
/// On failure a partially written `output` file is removed.
pub fn recode_file(input: &Path, output: &Path, config: &PipelineConfig) -> Result<PipelineStats> {
    config.validate()?;
    let reader = open_reader(input)?;
    let writer = create_writer(output)?;

    let result = run(reader, writer, config);
    if result.is_err() && output.as_os_str() != STDIO_PATH {
        if let Err(e) = fs::remove_file(output) {
            warn!("Failed to remove incomplete output {}: {e}", output.display());
        }
    }
    result
}

/// A channel preloaded with `window` permits.
fn permits(window: usize) -> (Sender<()>, Receiver<()>) {
    let (tx, rx) = bounded(window);
    for _ in 0..window {
        // capacity is exactly `window` and `rx` is alive, so this never fails
        if tx.send(()).is_err() {
            break;
        }
    }
    (tx, rx)
}

fn read_batches<R: BufRead>(
    reader: R,
    batch_size: usize,
    tx: &Sender<RecordBatch>,
    permits: &Receiver<()>,
) -> Result<()> {
    let mut seq = 0u64;
    let mut first_line = 1usize;
    let mut records = Vec::with_capacity(batch_size);

    for (i, line) in reader.lines().enumerate() {
        let mut line = line.with_context(|| format!("Failed to read line {}", i + 1))?;
        if line.ends_with('\r') {
            line.pop();
        }
        records.push(line);

        if records.len() == batch_size {
            let batch = RecordBatch { seq, first_line, records };
            if !dispatch(batch, tx, permits) {
                // downstream stopped on an error of its own
                return Ok(());
            }
            seq += 1;
            first_line += batch_size;
            records = Vec::with_capacity(batch_size);
        }
    }

    if !records.is_empty() && !dispatch(RecordBatch { seq, first_line, records }, tx, permits) {
        debug!("Downstream stopped before the final batch {seq}");
    }
    Ok(())
}

/// Waits for a permit and sends `batch`. Returns false once downstream is gone.
fn dispatch(batch: RecordBatch, tx: &Sender<RecordBatch>, permits: &Receiver<()>) -> bool {
    permits.recv().is_ok() && tx.send(batch).is_ok()
}

fn recode_batch(batch: RecordBatch, decision_index: usize) -> RecodedBatch {
    RecodedBatch {
        seq: batch.seq,
        first_line: batch.first_line,
        result: normalize_counted(&batch.records, decision_index),
    }
}

/// Drains `rx`, holding early batches until every earlier one has been written.
///
/// Takes both channel ends by value so that returning early closes them and
/// unblocks the workers and the reader.
fn write_in_order<W: Write>(
    rx: Receiver<RecodedBatch>,
    permits: Sender<()>,
    writer: &mut W,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();
    let mut pending: BTreeMap<u64, RecodedBatch> = BTreeMap::new();
    let mut next_seq = 0u64;

    for batch in rx {
        pending.insert(batch.seq, batch);
        stats.peak_pending = stats.peak_pending.max(pending.len() - 1);

        while let Some(batch) = pending.remove(&next_seq) {
            let (records, flipped) = batch.result.map_err(|e| malformed(e, batch.first_line))?;
            for record in &records {
                writer.write_all(record.as_bytes())?;
                writer.write_all(b"\n")?;
            }

            stats.records += records.len();
            stats.flipped += flipped;
            stats.batches += 1;
            debug!(
                "Wrote batch {} ({} records, {} total)",
                batch.seq,
                records.len(),
                stats.records
            );
            next_seq += 1;

            if permits.send(()).is_err() {
                debug!("Reader finished, permit for batch {} not returned", batch.seq);
            }
        }
    }

    Ok(stats)
}

fn malformed(error: RecodeError, first_line: usize) -> anyhow::Error {
    match error.record_index() {
        Some(index) => anyhow::Error::new(error)
            .context(format!("Malformed substitution on line {}", first_line + index)),
        None => anyhow::Error::new(error),
    }
}
