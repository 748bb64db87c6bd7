// src/services/poll_driver.rs
//! Polling driver for verification sessions.
//!
//! Drives one session's poll loop: a fixed-cadence series of
//! [`SessionTracker::poll_status`] calls that stops at the first terminal
//! classification, when the overall ceiling elapses, or when the status has
//! been unrecognizable for too long. Each poll result is surfaced
//! immediately over a channel so a UI can update mid-flight.
//!
//! The loop lives in a single spawned task owned by a [`PollHandle`]; the
//! handle is the only cancellation point, and dropping it aborts the task so
//! no timer keeps firing after the owning context is torn down.

// The HTTP binary only exposes single-shot polling; in-process callers
// (and the tests) drive the loop through this module.
#![allow(dead_code)]

use crate::models::session::StatusReport;
use crate::models::status::VerificationStatus;
use crate::services::session_tracker::SessionTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Cadence and termination settings for one poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between successive polls
    pub interval: Duration,

    /// Hard ceiling on the whole loop, measured from start
    pub ceiling: Duration,

    /// Consecutive `Unknown` classifications tolerated before the loop
    /// gives up with [`PollOutcome::Stalled`]
    pub unknown_threshold: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_secs(3),
            ceiling: Duration::from_secs(300),
            unknown_threshold: 5,
        }
    }
}

/// Why a poll loop stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// A terminal status was observed; the report carries any proof payload
    Terminal(StatusReport),

    /// The ceiling elapsed without a terminal status. Distinct from both
    /// success and failure
    TimedOut,

    /// The verifier kept reporting an unrecognizable status
    Stalled { consecutive_unknown: u32 },
}

/// Message stream emitted by a running poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollUpdate {
    /// One successful poll; sent for every sample, terminal or not
    Report(StatusReport),

    /// Final message; the loop stops immediately after sending it
    Outcome(PollOutcome),
}

/// Owner of one running poll loop.
///
/// Cancellation is a single entry point: call [`PollHandle::cancel`] or drop
/// the handle. Either way the underlying task is aborted and issues no
/// further polls.
pub struct PollHandle {
    task: JoinHandle<()>,
    updates: mpsc::UnboundedReceiver<PollUpdate>,
}

impl PollHandle {
    /// Receives the next update, or `None` once the loop has finished.
    pub async fn recv(&mut self) -> Option<PollUpdate> {
        self.updates.recv().await
    }

    /// Stops the loop. Safe to call more than once.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts polling `verification_request_id` on `tracker`.
///
/// The first poll fires immediately; subsequent polls wait out the
/// configured interval, and the next poll is only scheduled after the
/// previous one completes, so at most one query is in flight per session.
/// A failed poll is logged and the loop continues; only terminal statuses,
/// the ceiling, or the unknown-status threshold end it.
pub fn start(
    tracker: Arc<SessionTracker>,
    verification_request_id: String,
    config: PollConfig,
) -> PollHandle {
    let (tx, updates) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let started = Instant::now();
        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_unknown: u32 = 0;

        loop {
            ticker.tick().await;

            if started.elapsed() >= config.ceiling {
                log::info!(
                    "verification {} timed out after {:?}",
                    verification_request_id,
                    config.ceiling
                );
                let _ = tx.send(PollUpdate::Outcome(PollOutcome::TimedOut));
                break;
            }

            match tracker.poll_status(&verification_request_id).await {
                Ok(report) => {
                    let status = report.status;
                    let _ = tx.send(PollUpdate::Report(report.clone()));

                    if status.is_terminal() {
                        let _ = tx.send(PollUpdate::Outcome(PollOutcome::Terminal(report)));
                        break;
                    }

                    if status == VerificationStatus::Unknown {
                        consecutive_unknown += 1;
                        if consecutive_unknown >= config.unknown_threshold {
                            log::warn!(
                                "verification {} stalled on {} consecutive unknown statuses",
                                verification_request_id,
                                consecutive_unknown
                            );
                            let _ = tx.send(PollUpdate::Outcome(PollOutcome::Stalled {
                                consecutive_unknown,
                            }));
                            break;
                        }
                    } else {
                        debug_assert!(status.is_pending());
                        consecutive_unknown = 0;
                    }
                }
                Err(e) => {
                    // A single failed poll is transient; keep sampling.
                    debug_assert!(e.is_transient());
                    log::warn!("poll for {} failed: {}", verification_request_id, e);
                }
            }
        }
    });

    PollHandle { task, updates }
}
