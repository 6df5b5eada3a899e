//! Debounced preview updates with generation-token cancellation.
//!
//! The scheduler is a small state machine driven by the UI clock. Parameter
//! edits call [`UpdateScheduler::request_update`]; the frame loop calls
//! [`UpdateScheduler::poll`] to obtain fetches to dispatch and hands results
//! back through [`UpdateScheduler::complete`]. At most one preview request is
//! outstanding at any time. Edits that arrive while a request is in flight
//! collapse into a single pending flag that re-runs the cycle once it settles.
//!
//! Every cycle is tagged with a [`Generation`]. A completion whose generation
//! or stage does not match the request currently in flight is discarded
//! without touching the store.
//!
//! When a lock correction is needed, the initial response is held back and
//! the store keeps its previous geometry until the correction answers.

use std::fmt;

use crate::constants;
use crate::error::ServiceError;
use crate::store::ParameterStore;
use crate::types::{ApiParameters, Axis, PreviewGeometry};

/// Strictly increasing identifier of an update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which request of a cycle a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// First request of the cycle
    Initial,
    /// Follow-up request carrying solved lock paddings
    Correction,
}

/// A preview request to dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    /// Cycle the request belongs to
    pub generation: Generation,
    /// Position within the cycle
    pub stage: FetchStage,
    /// Parameter snapshot taken when the request was issued
    pub params: ApiParameters,
}

/// Outcome of handing a response to the scheduler.
#[derive(Debug, Clone)]
pub enum Completion {
    /// The response belonged to a superseded request and was dropped.
    Stale,
    /// The request failed; the cycle is over.
    Failed(ServiceError),
    /// Geometry was stored and a lock correction must be fetched.
    Correct(FetchTicket),
    /// Geometry was stored and is final for the cycle.
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Scheduled { due: f64 },
    InFlight { generation: Generation, stage: FetchStage },
}

/// Coalesces parameter edits into preview fetches.
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    phase: Phase,
    pending: bool,
    held: Option<PreviewGeometry>,
    latest: Generation,
    debounce_secs: f64,
    settle_secs: f64,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(constants::DEBOUNCE_SECS, constants::SETTLE_SECS)
    }
}

impl UpdateScheduler {
    /// Creates an idle scheduler with the given debounce and settle delays (seconds).
    pub fn new(debounce_secs: f64, settle_secs: f64) -> Self {
        Self {
            phase: Phase::Idle,
            pending: false,
            held: None,
            latest: Generation::default(),
            debounce_secs,
            settle_secs,
        }
    }

    /// Records that the parameters changed at time `now`.
    ///
    /// Restarts the debounce timer, or marks the in-flight cycle as
    /// superseded so that it re-runs when it settles.
    pub fn request_update(&mut self, now: f64) {
        match self.phase {
            Phase::InFlight { .. } => self.pending = true,
            Phase::Idle | Phase::Scheduled { .. } => {
                self.phase = Phase::Scheduled {
                    due: now + self.debounce_secs,
                };
            }
        }
    }

    /// Issues a new cycle if the debounce timer has expired.
    pub fn poll(&mut self, now: f64, store: &ParameterStore) -> Option<FetchTicket> {
        match self.phase {
            Phase::Scheduled { due } if now >= due => {
                self.latest = self.latest.next();
                self.phase = Phase::InFlight {
                    generation: self.latest,
                    stage: FetchStage::Initial,
                };
                log::debug!("Issuing preview cycle {}", self.latest);
                Some(FetchTicket {
                    generation: self.latest,
                    stage: FetchStage::Initial,
                    params: store.api_parameters(),
                })
            }
            _ => None,
        }
    }

    /// Applies the result of a fetch.
    ///
    /// After an initial fetch, locked paddings are solved against the
    /// received geometry and, if any moved, one correction fetch is returned
    /// under the same generation. The store's preview is replaced only by the
    /// final geometry of the cycle: the correction response, or the held
    /// initial response if the correction fails.
    pub fn complete(
        &mut self,
        now: f64,
        generation: Generation,
        stage: FetchStage,
        result: Result<PreviewGeometry, ServiceError>,
        store: &mut ParameterStore,
    ) -> Completion {
        let current = Phase::InFlight { generation, stage };
        if self.phase != current || generation != self.latest {
            log::debug!(
                "Discarding stale {:?} response for cycle {} (latest {})",
                stage,
                generation,
                self.latest
            );
            return Completion::Stale;
        }

        let geometry = match result {
            Ok(geometry) => geometry,
            Err(err) => {
                log::warn!("Preview cycle {} failed: {}", generation, err);
                if let Some(held) = self.held.take() {
                    store.set_preview_data(held);
                }
                self.settle(now);
                return Completion::Failed(err);
            }
        };

        if stage == FetchStage::Initial && converge_locks(&geometry, store) {
            self.held = Some(geometry);
            self.phase = Phase::InFlight {
                generation,
                stage: FetchStage::Correction,
            };
            return Completion::Correct(FetchTicket {
                generation,
                stage: FetchStage::Correction,
                params: store.api_parameters(),
            });
        }

        log::info!("Preview cycle {} accepted", generation);
        self.held = None;
        store.set_preview_data(geometry);
        self.settle(now);
        Completion::Accepted
    }

    fn settle(&mut self, now: f64) {
        if self.pending {
            self.pending = false;
            self.phase = Phase::Scheduled {
                due: now + self.settle_secs,
            };
        } else {
            self.phase = Phase::Idle;
        }
    }

    /// Whether a cycle is scheduled or in flight.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Time at which the scheduled cycle becomes due.
    pub fn deadline(&self) -> Option<f64> {
        match self.phase {
            Phase::Scheduled { due } => Some(due),
            _ => None,
        }
    }
}

/// Padding that makes `raw` plus twice the padding equal `target`.
///
/// Not clamped; a target smaller than the raw extent yields a negative value.
pub fn required_padding(target: f64, raw: f64) -> f64 {
    (target - raw) / 2.0
}

/// Solves the padding of every locked axis against `geometry`.
///
/// Both axes are evaluated before returning. Returns whether any padding
/// moved by more than [`constants::LOCK_TOLERANCE`].
pub fn converge_locks(geometry: &PreviewGeometry, store: &mut ParameterStore) -> bool {
    let mut changed = false;
    for axis in Axis::BOTH {
        let Some(target) = store.lock_target(axis) else {
            continue;
        };
        let Some(raw) = geometry.extent(axis) else {
            continue;
        };

        let required = required_padding(target, raw);
        let key = axis.padding_key();
        let current = store.parameters().number(key);
        if current.is_nan() || (current - required).abs() > constants::LOCK_TOLERANCE {
            log::debug!(
                "Locked {} {:.5}: padding {:.5} -> {:.5}",
                axis.name(),
                target,
                current,
                required
            );
            store.set_parameter(key, required);
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
impl UpdateScheduler {
    fn has_pending(&self) -> bool {
        self.pending
    }

    fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::InFlight { .. })
    }
}
