//! Chunked, multi-threaded normalization of large batches.
//!
//! The batch is cut into contiguous chunks that are handed to a pool of scoped
//! workers over a bounded channel. Each finished chunk lands in the slot for its
//! chunk number, so output order never depends on completion order.

use std::thread;

use crossbeam_channel::bounded;

use crate::canon::normalize;
use crate::error::{RecodeError, Result};

/// Records per chunk handed to a worker.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Parallel equivalent of [`normalize`] using `threads` workers.
///
/// Produces exactly what [`normalize`] would: the same output, or the error for
/// the lowest-indexed malformed record.
pub fn normalize_parallel<S>(
    subs: &[S],
    decision_index: usize,
    threads: usize,
) -> Result<Vec<String>>
where
    S: AsRef<str> + Sync,
{
    normalize_parallel_chunked(subs, decision_index, threads, DEFAULT_CHUNK_SIZE)
}

/// [`normalize_parallel`] with an explicit chunk size.
pub fn normalize_parallel_chunked<S>(
    subs: &[S],
    decision_index: usize,
    threads: usize,
    chunk_size: usize,
) -> Result<Vec<String>>
where
    S: AsRef<str> + Sync,
{
    if threads == 0 {
        return Err(invalid("threads", "must be >= 1"));
    }
    if chunk_size == 0 {
        return Err(invalid("chunk-size", "must be >= 1"));
    }
    if threads == 1 || subs.len() <= chunk_size {
        return normalize(subs, decision_index);
    }

    let num_chunks = subs.len().div_ceil(chunk_size);
    let mut slots: Vec<Option<Vec<String>>> = vec![None; num_chunks];
    let mut first_error: Option<RecodeError> = None;

    thread::scope(|scope| {
        let (job_tx, job_rx) = bounded::<(usize, &[S])>(threads * 2);
        let (result_tx, result_rx) = bounded::<(usize, Result<Vec<String>>)>(threads * 2);

        for _ in 0..threads.min(num_chunks) {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok((chunk_no, chunk)) = rx.recv() {
                    let result = normalize(chunk, decision_index)
                        .map_err(|e| e.offset_index(chunk_no * chunk_size));
                    if tx.send((chunk_no, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);
        drop(result_tx);

        scope.spawn(move || {
            for job in subs.chunks(chunk_size).enumerate() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
        });

        for (chunk_no, result) in result_rx {
            match result {
                Ok(records) => slots[chunk_no] = Some(records),
                Err(e) => {
                    let replace = match (&first_error, e.record_index()) {
                        (None, _) => true,
                        (Some(prev), Some(index)) => prev.record_index().is_some_and(|p| index < p),
                        (Some(_), None) => false,
                    };
                    if replace {
                        first_error = Some(e);
                    }
                }
            }
        }
    });

    if let Some(e) = first_error {
        return Err(e);
    }

    let mut out = Vec::with_capacity(subs.len());
    for slot in slots {
        out.extend(slot.into_iter().flatten());
    }
    Ok(out)
}

fn invalid(parameter: &str, reason: &str) -> RecodeError {
    RecodeError::InvalidParameter { parameter: parameter.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<String> {
        const CONTEXTS: [&str; 6] = ["AGA>T", "TCA>G", "GGN>A", "CTT>A", "AAC>G", "NAN>C"];
        (0..n).map(|i| CONTEXTS[i % CONTEXTS.len()].to_string()).collect()
    }

    #[test]
    fn test_matches_sequential() {
        let subs = sample(1_003);
        let expected = normalize(&subs, 1).unwrap();
        for threads in [1, 2, 3, 8] {
            let got = normalize_parallel_chunked(&subs, 1, threads, 17).unwrap();
            assert_eq!(got, expected, "threads={threads}");
        }
    }

    #[test]
    fn test_empty_batch() {
        let subs: Vec<String> = Vec::new();
        assert!(normalize_parallel_chunked(&subs, 1, 4, 3).unwrap().is_empty());
    }

    #[test]
    fn test_error_has_global_index() {
        let mut subs = sample(100);
        subs[57] = "A".to_string();
        let err = normalize_parallel_chunked(&subs, 1, 4, 10).unwrap_err();
        assert_eq!(err.record_index(), Some(57));
    }

    #[test]
    fn test_lowest_index_error_wins() {
        let mut subs = sample(200);
        subs[5] = String::new();
        subs[150] = "G".to_string();
        subs[90] = "T".to_string();
        let err = normalize_parallel_chunked(&subs, 1, 6, 7).unwrap_err();
        assert_eq!(err, normalize(&subs, 1).unwrap_err());
        assert_eq!(err.record_index(), Some(5));
    }

    #[test]
    fn test_invalid_parameters() {
        let subs = sample(4);
        assert!(matches!(
            normalize_parallel(&subs, 1, 0),
            Err(RecodeError::InvalidParameter { .. })
        ));
        assert!(matches!(
            normalize_parallel_chunked(&subs, 1, 2, 0),
            Err(RecodeError::InvalidParameter { .. })
        ));
    }
}
