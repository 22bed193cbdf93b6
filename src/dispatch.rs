//! Parallel chunk dispatch.
//!
//! Chunks run on a dedicated rayon pool. Workers report back over a channel
//! and a single collector thread settles one result slot per chunk, enforcing
//! per-chunk timeouts and the optional request deadline. A chunk that fails,
//! times out or panics never affects its siblings.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};

use crate::chunk::Chunk;
use crate::config::AnalysisConfig;
use crate::error::{ChunkFailure, Error, Result};
use crate::model::ChunkAnalysis;

/// Cooperative cancellation flag shared between the collector and a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Work performed on each chunk.
pub trait ChunkProcessor: Send + Sync {
    /// Process one chunk, polling `cancel` where it can stop early.
    fn process(
        &self,
        chunk: &Chunk,
        cancel: &CancelToken,
    ) -> std::result::Result<ChunkAnalysis, ChunkFailure>;
}

/// Dispatcher limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Worker threads
    pub max_concurrency: usize,

    /// Time budget per chunk, measured from when it starts
    pub per_chunk_timeout: Duration,

    /// Time budget for the whole dispatch
    pub deadline: Option<Duration>,
}

impl DispatchOptions {
    /// Create options with no request deadline.
    pub fn new(max_concurrency: usize, per_chunk_timeout: Duration) -> Self {
        Self {
            max_concurrency,
            per_chunk_timeout,
            deadline: None,
        }
    }

    /// Set the request deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Dispatcher view of an analysis configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            per_chunk_timeout: config.chunk_timeout(),
            deadline: config.request_deadline(),
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

enum Event {
    Started(usize, Instant),
    Finished(usize, std::result::Result<ChunkAnalysis, ChunkFailure>),
}

/// Fans chunks out to a thread pool and collects one result per chunk.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    options: DispatchOptions,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    /// Create a dispatcher from an analysis configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(DispatchOptions::from_config(config))
    }

    /// Get the dispatcher options.
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Process every chunk and return one analysis per chunk, ordered by
    /// chunk index.
    ///
    /// Failed, timed-out and panicking chunks come back as error-tagged
    /// analyses. The call itself fails only when the worker pool cannot be
    /// built.
    pub fn dispatch<P>(&self, chunks: &[Arc<Chunk>], processor: Arc<P>) -> Result<Vec<ChunkAnalysis>>
    where
        P: ChunkProcessor + 'static,
    {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        if self.options.max_concurrency == 0 {
            return Err(Error::InvalidConfiguration(
                "max concurrency must be positive".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.max_concurrency)
            .thread_name(|i| format!("pdfsift-worker-{}", i))
            .build()
            .map_err(|e| Error::Dispatch(e.to_string()))?;

        log::debug!(
            "dispatching {} chunks on {} workers",
            chunks.len(),
            self.options.max_concurrency
        );

        let started_at = Instant::now();
        let tokens: Vec<CancelToken> = chunks.iter().map(|_| CancelToken::new()).collect();
        let (tx, rx) = unbounded();

        for (slot, chunk) in chunks.iter().enumerate() {
            let tx = tx.clone();
            let chunk = Arc::clone(chunk);
            let processor = Arc::clone(&processor);
            let token = tokens[slot].clone();

            pool.spawn(move || {
                // Settled by the deadline before a worker got to it.
                if token.is_cancelled() {
                    return;
                }
                let _ = tx.send(Event::Started(slot, Instant::now()));
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    processor.process(&chunk, &token)
                }))
                .unwrap_or_else(|payload| {
                    Err(ChunkFailure::internal(
                        chunk.index,
                        format!("chunk processor panicked: {}", panic_message(payload.as_ref())),
                    ))
                });
                let _ = tx.send(Event::Finished(slot, outcome));
            });
        }
        drop(tx);

        let deadline = self.options.deadline.map(|d| started_at + d);
        let mut collector = Collector::new(chunks, &tokens, self.options.per_chunk_timeout);
        collector.run(&rx, deadline);

        let mut results = collector.into_results();
        results.sort_by_key(|a| a.chunk_index);

        let failed = results.iter().filter(|a| !a.is_ok()).count();
        log::debug!(
            "dispatch finished in {:?}: {} chunks, {} failed",
            started_at.elapsed(),
            results.len(),
            failed
        );
        Ok(results)
    }
}

/// Result slots, each settled exactly once.
struct Collector<'a> {
    chunks: &'a [Arc<Chunk>],
    tokens: &'a [CancelToken],
    timeout: Duration,
    slots: Vec<Option<ChunkAnalysis>>,
    started: Vec<Option<Instant>>,
    pending: usize,
}

impl<'a> Collector<'a> {
    fn new(chunks: &'a [Arc<Chunk>], tokens: &'a [CancelToken], timeout: Duration) -> Self {
        Self {
            chunks,
            tokens,
            timeout,
            slots: vec![None; chunks.len()],
            started: vec![None; chunks.len()],
            pending: chunks.len(),
        }
    }

    fn run(&mut self, rx: &Receiver<Event>, deadline: Option<Instant>) {
        while self.pending > 0 {
            // Apply queued events before checking budgets.
            while let Ok(event) = rx.try_recv() {
                self.handle(event);
            }
            if self.pending == 0 {
                break;
            }

            let now = Instant::now();
            self.expire(now);

            if deadline.is_some_and(|d| now >= d) {
                log::warn!("request deadline exceeded with {} chunks unsettled", self.pending);
                self.settle_remaining(|index| {
                    ChunkFailure::timeout(index, "request deadline exceeded")
                });
                for token in self.tokens {
                    token.cancel();
                }
                break;
            }
            if self.pending == 0 {
                break;
            }

            let wake = self.next_expiry().into_iter().chain(deadline).min();
            let event = match wake {
                Some(at) => rx.recv_timeout(at.saturating_duration_since(now)),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match event {
                Ok(event) => self.handle(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("workers exited with {} chunks unreported", self.pending);
                    self.settle_remaining(|index| {
                        ChunkFailure::internal(index, "worker exited without reporting a result")
                    });
                    break;
                }
            }
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Started(slot, at) => {
                if self.slots[slot].is_none() {
                    self.started[slot] = Some(at);
                }
            }
            Event::Finished(slot, outcome) => {
                if self.slots[slot].is_some() {
                    log::debug!("discarding late result for chunk {}", self.chunks[slot].index);
                    return;
                }
                self.settle(slot, outcome);
            }
        }
    }

    /// Settle every started chunk whose time budget has run out.
    fn expire(&mut self, now: Instant) {
        for slot in 0..self.slots.len() {
            let overdue = self.slots[slot].is_none()
                && self.started[slot].is_some_and(|at| now >= at + self.timeout);
            if overdue {
                let index = self.chunks[slot].index;
                log::warn!("chunk {} exceeded its {:?} budget", index, self.timeout);
                self.tokens[slot].cancel();
                self.settle(
                    slot,
                    Err(ChunkFailure::timeout(
                        index,
                        format!("chunk exceeded {} ms", self.timeout.as_millis()),
                    )),
                );
            }
        }
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.slots
            .iter()
            .zip(&self.started)
            .filter(|(slot, _)| slot.is_none())
            .filter_map(|(_, started)| started.map(|at| at + self.timeout))
            .min()
    }

    fn settle(&mut self, slot: usize, outcome: std::result::Result<ChunkAnalysis, ChunkFailure>) {
        let analysis = match outcome {
            Ok(analysis) => analysis,
            Err(failure) => {
                log::debug!("{}", failure);
                ChunkAnalysis::failed(&self.chunks[slot], failure)
            }
        };
        self.slots[slot] = Some(analysis);
        self.pending -= 1;
    }

    fn settle_remaining(&mut self, failure: impl Fn(usize) -> ChunkFailure) {
        for slot in 0..self.slots.len() {
            if self.slots[slot].is_none() {
                let index = self.chunks[slot].index;
                self.settle(slot, Err(failure(index)));
            }
        }
    }

    fn into_results(self) -> Vec<ChunkAnalysis> {
        let chunks = self.chunks;
        self.slots
            .into_iter()
            .enumerate()
            .map(|(slot, analysis)| {
                analysis.unwrap_or_else(|| {
                    ChunkAnalysis::failed(
                        &chunks[slot],
                        ChunkFailure::internal(chunks[slot].index, "chunk was never settled"),
                    )
                })
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
