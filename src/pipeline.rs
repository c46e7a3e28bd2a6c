//! Fan-out of decoded records to one worker thread per adapter.
//!
//! Each worker is fed through a bounded channel, so a slow adapter makes the
//! reader wait instead of letting records pile up in memory. A worker whose
//! thread has died stops receiving; every record it misses from then on is
//! counted as dropped.

use std::sync::mpsc::{self, SyncSender};
use std::thread::{self, JoinHandle};

use crate::adapter::{LogAdapter, StreamStats};
use crate::error::GelfError;
use crate::record::RawLogRecord;

/// Records buffered per worker before the reader blocks.
pub const CHANNEL_CAPACITY: usize = 1024;

struct Worker {
    name: String,
    tx: Option<SyncSender<RawLogRecord>>,
    handle: JoinHandle<StreamStats>,
    /// Records this worker never received.
    lost: u64,
}

/// Totals after every worker has been joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    pub stats: StreamStats,
    /// Workers whose thread panicked.
    pub panicked: usize,
}

/// Worker threads fed in input order.
pub struct FanOut {
    workers: Vec<Worker>,
}

impl FanOut {
    /// Start one thread per adapter, each buffering up to `capacity` records.
    pub fn spawn(adapters: Vec<Box<dyn LogAdapter>>, capacity: usize) -> Result<Self, GelfError> {
        let workers = adapters
            .into_iter()
            .map(|adapter| spawn_worker(adapter, capacity))
            .collect::<Result<_, _>>()?;
        Ok(Self { workers })
    }

    /// Hand `record` to every live worker, blocking while a worker's buffer
    /// is full.
    pub fn dispatch(&mut self, record: RawLogRecord) {
        let last = self
            .workers
            .iter()
            .rposition(|w| w.tx.is_some())
            .unwrap_or(usize::MAX);
        let mut pending = Some(record);

        for (index, worker) in self.workers.iter_mut().enumerate() {
            let Some(ref tx) = worker.tx else {
                worker.lost += 1;
                continue;
            };
            let item = if index == last { pending.take() } else { pending.clone() };
            let Some(item) = item else {
                continue;
            };
            if tx.send(item).is_err() {
                tracing::warn!(adapter = %worker.name, "adapter stopped, dropping its records");
                worker.tx = None;
                worker.lost += 1;
            }
        }
    }

    /// Close every channel and wait for the workers to drain.
    pub fn finish(self) -> FanOutSummary {
        let mut summary = FanOutSummary::default();
        for worker in self.workers {
            drop(worker.tx);
            match worker.handle.join() {
                Ok(stats) => summary.stats.absorb(stats),
                Err(_) => {
                    tracing::error!(adapter = %worker.name, "adapter thread panicked");
                    summary.panicked += 1;
                }
            }
            summary.stats.dropped += worker.lost;
        }
        summary
    }
}

fn spawn_worker(mut adapter: Box<dyn LogAdapter>, capacity: usize) -> Result<Worker, GelfError> {
    let name = adapter.name().to_string();
    let (tx, rx) = mpsc::sync_channel::<RawLogRecord>(capacity);
    let handle = thread::Builder::new()
        .name(format!("adapter {name}"))
        .spawn(move || adapter.stream(&mut rx.into_iter()))?;
    Ok(Worker {
        name,
        tx: Some(tx),
        handle,
        lost: 0,
    })
}
