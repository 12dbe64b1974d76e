use super::failure::GenerationFailure;
use super::model::{GenerationMode, GenerationOptions, GenerationResult, GenerationTicket, WizardStep};
use crate::audio::AudioAsset;
use crate::error::{HumloopError, Result};
use crate::validation::{UploadLimits, validate_audio_file};
use tracing::debug;

/// What happened to a backend resolution handed to the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The resolution belonged to the current run and moved the wizard.
    Applied(WizardStep),
    /// The run was abandoned or superseded; the resolution was discarded.
    Stale,
}

/// State of one pass through the generation wizard.
///
/// All mutation goes through the transition methods, which keep these
/// invariants:
///
/// - `result` is present only in [`WizardStep::Complete`]
/// - `error` is present only in [`WizardStep::Failed`]
/// - an uploaded asset is present whenever the step is past `AwaitingUpload`
///
/// Each call to [`submit_details`](Self::submit_details) starts a new run
/// with a larger `run_id`. Backend resolutions carry the id they were issued
/// with, and anything not matching the current processing run is ignored.
#[derive(Debug, Clone)]
pub struct WizardSession {
    mode: GenerationMode,
    limits: UploadLimits,
    step: WizardStep,
    uploaded_asset: Option<AudioAsset>,
    selected_options: GenerationOptions,
    result: Option<GenerationResult>,
    error: Option<String>,
    upload_feedback: Vec<String>,
    run_id: u64,
}

impl WizardSession {
    pub fn new(mode: GenerationMode, limits: UploadLimits) -> Self {
        Self {
            mode,
            limits,
            step: WizardStep::AwaitingUpload,
            uploaded_asset: None,
            selected_options: GenerationOptions::default(),
            result: None,
            error: None,
            upload_feedback: Vec::new(),
            run_id: 0,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn uploaded_asset(&self) -> Option<&AudioAsset> {
        self.uploaded_asset.as_ref()
    }

    pub fn selected_options(&self) -> &GenerationOptions {
        &self.selected_options
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Messages from the last rejected upload. Cleared by the next attempt.
    pub fn upload_feedback(&self) -> &[String] {
        &self.upload_feedback
    }

    /// Id of the most recently started run (0 before the first).
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// `AwaitingUpload → AwaitingDetails`, guarded by audio validation.
    ///
    /// # Errors
    ///
    /// - `Validation`: the file was rejected; the step stays `AwaitingUpload`
    ///   and the messages are kept in `upload_feedback`
    /// - `InvalidTransition`: not awaiting an upload
    pub fn submit_upload(&mut self, asset: AudioAsset) -> Result<()> {
        self.expect_step(WizardStep::AwaitingUpload, "submit an upload")?;

        let validation = validate_audio_file(&asset.info(), &self.limits);
        if !validation.is_valid() {
            self.upload_feedback = validation.messages();
            debug!(file = asset.file_name(), "Upload rejected");
            return Err(HumloopError::Validation(self.upload_feedback.clone()));
        }

        self.upload_feedback.clear();
        self.uploaded_asset = Some(asset);
        self.step = WizardStep::AwaitingDetails;
        Ok(())
    }

    /// `AwaitingDetails → Processing`.
    ///
    /// The move happens before the backend is called; the returned ticket
    /// describes the call the driver must now make.
    pub fn submit_details(&mut self, options: GenerationOptions) -> Result<GenerationTicket> {
        self.expect_step(WizardStep::AwaitingDetails, "submit details")?;
        let asset = self
            .uploaded_asset
            .clone()
            .ok_or_else(|| HumloopError::internal("details submitted without an uploaded asset"))?;

        self.selected_options = options.clone();
        self.run_id += 1;
        self.step = WizardStep::Processing;
        debug!(run_id = self.run_id, mode = ?self.mode, "Generation run started");

        Ok(GenerationTicket {
            run_id: self.run_id,
            mode: self.mode,
            asset,
            options,
        })
    }

    /// `Processing → Complete` for the run identified by `run_id`.
    pub fn on_backend_success(&mut self, run_id: u64, result: GenerationResult) -> Resolution {
        if !self.is_current_run(run_id) {
            debug!(run_id, current = self.run_id, "Discarding stale generation result");
            return Resolution::Stale;
        }

        if result.media_url.trim().is_empty() {
            return self.on_backend_failure(run_id, GenerationFailure::Unknown { status: None });
        }

        self.result = Some(result);
        self.error = None;
        self.step = WizardStep::Complete;
        Resolution::Applied(self.step)
    }

    /// `Processing → Failed` for the run identified by `run_id`.
    pub fn on_backend_failure(&mut self, run_id: u64, failure: GenerationFailure) -> Resolution {
        if !self.is_current_run(run_id) {
            debug!(run_id, current = self.run_id, "Discarding stale generation failure");
            return Resolution::Stale;
        }

        self.error = Some(failure.user_message());
        self.result = None;
        self.step = WizardStep::Failed;
        Resolution::Applied(self.step)
    }

    /// Full reset to `AwaitingUpload`, discarding asset, options, result and
    /// error.
    ///
    /// Accepted from any step so that leaving the flow mid-run also works;
    /// a run still in flight becomes stale.
    pub fn reset_all(&mut self) {
        self.step = WizardStep::AwaitingUpload;
        self.uploaded_asset = None;
        self.selected_options = GenerationOptions::default();
        self.result = None;
        self.error = None;
        self.upload_feedback.clear();
    }

    /// Same as [`reset_all`](Self::reset_all).
    pub fn regenerate(&mut self) {
        self.reset_all();
    }

    /// `Complete | Failed → AwaitingDetails`, keeping the uploaded asset and
    /// the previous options.
    pub fn retry_details(&mut self) -> Result<()> {
        if !self.step.is_terminal() {
            return Err(self.invalid("retry details"));
        }
        self.result = None;
        self.error = None;
        self.step = WizardStep::AwaitingDetails;
        Ok(())
    }

    fn is_current_run(&self, run_id: u64) -> bool {
        self.step == WizardStep::Processing && run_id == self.run_id
    }

    fn expect_step(&self, expected: WizardStep, action: &'static str) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> HumloopError {
        HumloopError::InvalidTransition {
            step: self.step.to_string(),
            action,
        }
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new(GenerationMode::default(), UploadLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_audio() -> AudioAsset {
        AudioAsset::new("hum.wav", "audio/wav", vec![0u8; 1024])
    }

    fn processing_wizard() -> (WizardSession, GenerationTicket) {
        let mut wizard = WizardSession::default();
        wizard.submit_upload(valid_audio()).unwrap();
        let ticket = wizard.submit_details(GenerationOptions::default()).unwrap();
        (wizard, ticket)
    }

    #[test]
    fn test_full_round_trip() {
        let mut wizard = WizardSession::default();
        assert_eq!(wizard.step(), WizardStep::AwaitingUpload);

        wizard.submit_upload(valid_audio()).unwrap();
        assert_eq!(wizard.step(), WizardStep::AwaitingDetails);

        let ticket = wizard.submit_details(GenerationOptions::default()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Processing);

        let resolution = wizard.on_backend_success(ticket.run_id, GenerationResult::new("x", "t", 180.0));
        assert_eq!(resolution, Resolution::Applied(WizardStep::Complete));
        assert_eq!(wizard.result(), Some(&GenerationResult::new("x", "t", 180.0)));
        assert!(wizard.error().is_none());

        wizard.regenerate();
        assert_eq!(wizard.step(), WizardStep::AwaitingUpload);
        assert!(wizard.uploaded_asset().is_none());
        assert!(wizard.selected_options().is_empty());
        assert!(wizard.result().is_none());
        assert!(wizard.error().is_none());
    }

    #[test]
    fn test_rejected_upload_keeps_step_and_records_feedback() {
        let mut wizard = WizardSession::default();
        let err = wizard
            .submit_upload(AudioAsset::new("clip.mp4", "video/mp4", vec![0u8; 8]))
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(wizard.step(), WizardStep::AwaitingUpload);
        assert!(wizard.uploaded_asset().is_none());
        assert_eq!(wizard.upload_feedback().len(), 1);
        // Upload feedback is transient; it is not a terminal failure.
        assert!(wizard.error().is_none());

        wizard.submit_upload(valid_audio()).unwrap();
        assert!(wizard.upload_feedback().is_empty());
    }

    #[test]
    fn test_upload_limit_comes_from_session_limits() {
        let mut wizard = WizardSession::new(GenerationMode::Humming, UploadLimits::new(10));
        let err = wizard
            .submit_upload(AudioAsset::new("hum.wav", "audio/wav", vec![0u8; 11]))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_details_store_options_and_issue_ticket() {
        let mut wizard = WizardSession::new(GenerationMode::GenreConversion, UploadLimits::default());
        wizard.submit_upload(valid_audio()).unwrap();
        let options = GenerationOptions::default().with_genre("Jazz").with_mood("Calm");

        let ticket = wizard.submit_details(options.clone()).unwrap();

        assert_eq!(ticket.run_id, 1);
        assert_eq!(ticket.mode, GenerationMode::GenreConversion);
        assert_eq!(ticket.options, options);
        assert_eq!(ticket.asset.file_name(), "hum.wav");
        assert_eq!(wizard.selected_options(), &options);
    }

    #[test]
    fn test_recitation_failure_has_specific_message() {
        let (mut recitation_wizard, ticket) = processing_wizard();
        let recitation = GenerationFailure::from_error_body(
            Some(400),
            Some(crate::wizard::GenerationErrorBody {
                error: Some("similar to existing material".into()),
                error_type: Some("recitation_error".into()),
            }),
        );
        let resolution = recitation_wizard.on_backend_failure(ticket.run_id, recitation);
        assert_eq!(resolution, Resolution::Applied(WizardStep::Failed));

        let (mut generic_wizard, ticket) = processing_wizard();
        generic_wizard.on_backend_failure(ticket.run_id, GenerationFailure::from_error_body(Some(500), None));

        assert_eq!(recitation_wizard.step(), WizardStep::Failed);
        assert!(recitation_wizard.result().is_none());
        assert_ne!(recitation_wizard.error(), generic_wizard.error());
        assert!(recitation_wizard.error().unwrap().contains("copyrighted"));
    }

    #[test]
    fn test_stale_resolution_after_reset_is_ignored() {
        let (mut wizard, ticket) = processing_wizard();
        wizard.reset_all();

        let resolution = wizard.on_backend_success(ticket.run_id, GenerationResult::new("x", "t", 1.0));

        assert_eq!(resolution, Resolution::Stale);
        assert_eq!(wizard.step(), WizardStep::AwaitingUpload);
        assert!(wizard.result().is_none());
    }

    #[test]
    fn test_resolution_for_previous_run_is_ignored() {
        let (mut wizard, first) = processing_wizard();
        wizard.on_backend_failure(first.run_id, GenerationFailure::Unknown { status: None });
        wizard.retry_details().unwrap();
        let second = wizard.submit_details(GenerationOptions::default()).unwrap();
        assert_eq!(second.run_id, first.run_id + 1);

        let late = wizard.on_backend_success(first.run_id, GenerationResult::new("old", "t", 1.0));
        assert_eq!(late, Resolution::Stale);
        assert_eq!(wizard.step(), WizardStep::Processing);

        let current = wizard.on_backend_success(second.run_id, GenerationResult::new("new", "t", 1.0));
        assert_eq!(current, Resolution::Applied(WizardStep::Complete));
        assert_eq!(wizard.result().unwrap().media_url, "new");
    }

    #[test]
    fn test_second_resolution_for_same_run_is_ignored() {
        let (mut wizard, ticket) = processing_wizard();
        wizard.on_backend_success(ticket.run_id, GenerationResult::new("x", "t", 1.0));
        let again = wizard.on_backend_failure(ticket.run_id, GenerationFailure::Unknown { status: None });
        assert_eq!(again, Resolution::Stale);
        assert_eq!(wizard.step(), WizardStep::Complete);
        assert!(wizard.error().is_none());
    }

    #[test]
    fn test_retry_details_keeps_asset() {
        let (mut wizard, ticket) = processing_wizard();
        wizard.on_backend_failure(ticket.run_id, GenerationFailure::Unreachable { detail: "down".into() });

        wizard.retry_details().unwrap();

        assert_eq!(wizard.step(), WizardStep::AwaitingDetails);
        assert!(wizard.uploaded_asset().is_some());
        assert!(wizard.error().is_none());
    }

    #[test]
    fn test_invalid_transitions_are_rejected_without_mutation() {
        let mut wizard = WizardSession::default();
        let err = wizard.submit_details(GenerationOptions::default()).unwrap_err();
        assert!(matches!(err, HumloopError::InvalidTransition { .. }));
        assert!(wizard.retry_details().is_err());
        assert_eq!(wizard.step(), WizardStep::AwaitingUpload);

        let (mut processing, _) = processing_wizard();
        assert!(processing.submit_upload(valid_audio()).is_err());
        assert!(processing.retry_details().is_err());
        assert_eq!(processing.step(), WizardStep::Processing);
    }

    #[test]
    fn test_empty_media_url_fails_the_run() {
        let (mut wizard, ticket) = processing_wizard();
        let resolution = wizard.on_backend_success(ticket.run_id, GenerationResult::new("", "t", 1.0));
        assert_eq!(resolution, Resolution::Applied(WizardStep::Failed));
        assert!(wizard.result().is_none());
    }
}
