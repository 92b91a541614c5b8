use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{error, info};

use crate::channel::{ResultMessage, ResultSender, SUCCESS_TEXT};
use crate::enhance::Enhancer;
use crate::error::{Failure, SubmitError};
use crate::job::Job;

/// Runs one enhancement job at a time on a dedicated worker thread.
///
/// Every accepted job produces exactly one `Success` or `Failure` followed by
/// exactly one `Finished` on the result channel.
pub struct PipelineController {
    enhancer: Arc<dyn Enhancer>,
    sender: ResultSender,
    in_flight: Arc<AtomicBool>,
}

impl PipelineController {
    pub fn new(enhancer: Arc<dyn Enhancer>, sender: ResultSender) -> Self {
        Self {
            enhancer,
            sender,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a job has been accepted and has not yet posted `Finished`
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Hand `job` to a new worker thread. The thread is never joined; the
    /// outcome arrives only through the result channel.
    pub fn run_job(&self, job: Job) -> Result<(), SubmitError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SubmitError::Busy);
        }

        let enhancer = Arc::clone(&self.enhancer);
        let sender = self.sender.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let label = job.base_name.clone();

        let spawned = thread::Builder::new()
            .name(format!("enhance-{label}"))
            .spawn(move || {
                let _finished = FinishGuard {
                    sender: sender.clone(),
                    in_flight,
                };
                let message = process(enhancer.as_ref(), &job);
                sender.send(message);
            });

        match spawned {
            Ok(_) => {
                info!(job = %label, "job submitted");
                Ok(())
            }
            Err(err) => {
                self.in_flight.store(false, Ordering::SeqCst);
                Err(SubmitError::Spawn(err))
            }
        }
    }
}

fn process(enhancer: &dyn Enhancer, job: &Job) -> ResultMessage {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| enhancer.enhance(&job.image, &job.base_name)));
    match outcome {
        Ok(Ok(enhancement)) => {
            info!(job = %job.base_name, artifacts = enhancement.artifacts.len(), "job succeeded");
            ResultMessage::Success(SUCCESS_TEXT.to_string())
        }
        Ok(Err(err)) => {
            let failure = Failure::from(&err);
            error!(job = %job.base_name, kind = failure.kind.as_str(), "job failed: {err}");
            ResultMessage::Failure(failure)
        }
        Err(payload) => {
            let failure = Failure::from_panic(payload.as_ref());
            error!(job = %job.base_name, kind = failure.kind.as_str(), "enhancer panicked: {}", failure.message);
            ResultMessage::Failure(failure)
        }
    }
}

/// Posts `Finished` when the worker body exits, however it exits
struct FinishGuard {
    sender: ResultSender,
    in_flight: Arc<AtomicBool>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        // Clear first so a consumer reacting to `Finished` can submit again
        self.in_flight.store(false, Ordering::SeqCst);
        self.sender.send(ResultMessage::Finished);
    }
}
