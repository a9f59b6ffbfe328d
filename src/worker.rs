//! Background generation.
//!
//! [`GenerationWorker`] runs one generation on a named background thread
//! and hands the result back over a channel. At most one run is in flight
//! per worker; further submissions are refused until it ends.
//!
//! # Examples
//!
//! ```
//! use u_timetable::config::SolverConfig;
//! use u_timetable::models::{Division, DivisionLayout, Period, TimetableInput};
//! use u_timetable::worker::GenerationWorker;
//!
//! let input = TimetableInput::new(["Mon"], vec![Period::new(1, "")])
//!     .with_class("1A")
//!     .with_division_layout(Division::LowerPrimary, DivisionLayout::new(vec![1]));
//!
//! let worker = GenerationWorker::new();
//! let ticket = worker.submit(input, SolverConfig::default().with_seed(1)).unwrap();
//! let timetable = ticket.wait().unwrap();
//! assert!(timetable.report.passed);
//! ```

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error};

use crate::config::SolverConfig;
use crate::error::{Result, TimetableError};
use crate::models::{Timetable, TimetableInput};
use crate::scheduler::TimetableGenerator;

/// Clears the in-flight flag when dropped, including during unwinding.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs generations off the caller's thread, one at a time.
#[derive(Debug, Clone, Default)]
pub struct GenerationWorker {
    in_flight: Arc<AtomicBool>,
}

impl GenerationWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts a run.
    ///
    /// # Errors
    /// `GenerationInFlight` if a previous run has not finished;
    /// `WorkerFailed` if the thread cannot be spawned.
    pub fn submit(&self, input: TimetableInput, config: SolverConfig) -> Result<GenerationTicket> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TimetableError::GenerationInFlight);
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("u-timetable-generation".into())
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    TimetableGenerator::new(config).generate(&input)
                }));
                let result = outcome.unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    error!(%message, "generation panicked");
                    Err(TimetableError::WorkerFailed(message))
                });
                // Free the worker before the caller can observe the result.
                drop(guard);
                if tx.send(result).is_err() {
                    debug!("generation result dropped: ticket was discarded");
                }
            });

        match spawned {
            Ok(_) => Ok(GenerationTicket { receiver: rx }),
            Err(e) => Err(TimetableError::WorkerFailed(e.to_string())),
        }
    }
}

/// Handle to the result of a submitted run.
#[derive(Debug)]
pub struct GenerationTicket {
    receiver: Receiver<Result<Timetable>>,
}

impl GenerationTicket {
    /// Blocks until the run ends.
    pub fn wait(self) -> Result<Timetable> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(disconnected()))
    }

    /// Returns the result if the run has ended, without blocking.
    ///
    /// A result is handed out once; later calls report a worker failure.
    pub fn try_result(&self) -> Option<Result<Timetable>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(disconnected())),
        }
    }
}

fn disconnected() -> TimetableError {
    TimetableError::WorkerFailed("worker exited without a result".into())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
