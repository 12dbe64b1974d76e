use humloop_core::Result;
use humloop_core::audio::AudioAsset;
use humloop_core::validation::UploadLimits;
use humloop_core::wizard::{
    GenerationMode, GenerationOptions, GenerationResult, GenerationService, Resolution, WizardSession,
    WizardStep,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Published when a run resolves and the wizard moved because of it.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardEvent {
    pub run_id: u64,
    pub step: WizardStep,
    pub result: Option<GenerationResult>,
    pub error: Option<String>,
}

type CompletionCallback = Arc<dyn Fn(WizardEvent) + Send + Sync>;

struct ActiveRun {
    run_id: u64,
    cancel: CancellationToken,
    /// Taken by whoever waits for the run.
    task: Option<JoinHandle<Resolution>>,
}

/// Owns one [`WizardSession`] and runs its backend calls.
///
/// The state lock is never held across an await on the backend. Each run
/// gets its own cancellation token; resetting cancels the in-flight call and
/// any resolution that still arrives is discarded by run id.
pub struct GenerationWizard {
    state: Arc<Mutex<WizardSession>>,
    service: Arc<dyn GenerationService>,
    on_complete: Option<CompletionCallback>,
    active: Mutex<Option<ActiveRun>>,
}

impl GenerationWizard {
    pub fn new(mode: GenerationMode, limits: UploadLimits, service: Arc<dyn GenerationService>) -> Self {
        Self {
            state: Arc::new(Mutex::new(WizardSession::new(mode, limits))),
            service,
            on_complete: None,
            active: Mutex::new(None),
        }
    }

    /// Registers the callback that receives every applied resolution.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(WizardEvent) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    /// Copy of the current wizard state.
    pub async fn snapshot(&self) -> WizardSession {
        self.state.lock().await.clone()
    }

    pub async fn step(&self) -> WizardStep {
        self.state.lock().await.step()
    }

    pub async fn submit_upload(&self, asset: AudioAsset) -> Result<()> {
        self.state.lock().await.submit_upload(asset)
    }

    /// Moves to processing and starts the backend call in the background.
    ///
    /// Returns the run id. The outcome arrives through the completion
    /// callback, or can be awaited with [`wait`](Self::wait).
    pub async fn submit_details(&self, options: GenerationOptions) -> Result<u64> {
        let ticket = self.state.lock().await.submit_details(options)?;
        let run_id = ticket.run_id;
        let cancel = CancellationToken::new();

        let state = self.state.clone();
        let service = self.service.clone();
        let callback = self.on_complete.clone();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!(run_id, "Generation run cancelled");
                    return Resolution::Stale;
                }
                outcome = service.generate(ticket.mode, &ticket.asset, &ticket.options) => outcome,
            };

            let (resolution, event) = {
                let mut wizard = state.lock().await;
                let resolution = match outcome {
                    Ok(result) => wizard.on_backend_success(run_id, result),
                    Err(failure) => wizard.on_backend_failure(run_id, failure),
                };
                let event = WizardEvent {
                    run_id,
                    step: wizard.step(),
                    result: wizard.result().cloned(),
                    error: wizard.error().map(str::to_string),
                };
                (resolution, event)
            };

            if let Resolution::Applied(step) = resolution {
                info!(run_id, step = %step, "Generation run resolved");
                if let Some(callback) = callback {
                    callback(event);
                }
            }
            resolution
        });

        let previous = self.active.lock().await.replace(ActiveRun {
            run_id,
            cancel,
            task: Some(task),
        });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
        Ok(run_id)
    }

    /// Waits for the most recent run to finish.
    ///
    /// Returns `None` when no run is pending or another caller is already
    /// waiting. The run stays cancellable while it is awaited.
    pub async fn wait(&self) -> Option<Resolution> {
        let task = self.active.lock().await.as_mut()?.task.take()?;
        // A panicked or aborted task never applied anything.
        Some(task.await.unwrap_or(Resolution::Stale))
    }

    /// Back to the upload step, cancelling any in-flight run.
    pub async fn reset_all(&self) {
        self.cancel_active().await;
        self.state.lock().await.reset_all();
    }

    /// Same as [`reset_all`](Self::reset_all).
    pub async fn regenerate(&self) {
        self.reset_all().await;
    }

    /// Leaves the flow; identical to a reset.
    pub async fn abandon(&self) {
        self.reset_all().await;
    }

    /// Back to the details step, keeping the uploaded audio.
    pub async fn retry_details(&self) -> Result<()> {
        self.state.lock().await.retry_details()
    }

    async fn cancel_active(&self) {
        if let Some(run) = self.active.lock().await.take() {
            debug!(run_id = run.run_id, "Cancelling generation run");
            run.cancel.cancel();
        }
    }
}

impl Drop for GenerationWizard {
    fn drop(&mut self) {
        if let Some(run) = self.active.get_mut().take() {
            run.cancel.cancel();
        }
    }
}
