// src/orchestrator.rs
use chrono::{DateTime, Utc};
use log::info;

use crate::client::ApiClient;
use crate::errors::{ClientError, Result};
use crate::form::{FormState, Mode, RequestPayload};
use crate::models::{IntervalInfo, PredictResponse, ScoreResponse, Variant, VariantScore};

/// Lifecycle of one asynchronous operation slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl SlotState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SlotState::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SlotState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// One coherent snapshot of whatever the server last returned. Commits
/// replace the snapshot wholesale: plot results and score results never
/// coexist, so nothing stale can be misattributed to a fresh submit.
#[derive(Debug, Clone, Default)]
pub struct ResultState {
    pub plot_urls: Vec<String>,
    pub interval: Option<IntervalInfo>,
    pub variant: Option<Variant>,
    pub scores: Vec<VariantScore>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl ResultState {
    pub fn commit_prediction(&mut self, resp: PredictResponse) {
        self.plot_urls = resp.plot_urls;
        self.interval = Some(resp.interval);
        self.variant = resp.variant;
        self.scores = Vec::new();
        self.fetched_at = Some(Utc::now());
    }

    pub fn commit_scores(&mut self, resp: ScoreResponse) {
        self.plot_urls = Vec::new();
        self.interval = None;
        self.variant = Some(resp.variant);
        self.scores = resp.scores;
        self.fetched_at = Some(Utc::now());
    }

    pub fn has_plots(&self) -> bool {
        !self.plot_urls.is_empty()
    }

    pub fn has_scores(&self) -> bool {
        !self.scores.is_empty()
    }
}

/// Tracks the three prediction operations and the shared result snapshot.
///
/// Submission only ever triggers the slot matching the current mode, but
/// the slots are independent state machines: if the user resubmits in a
/// different mode before a prior operation settles, whichever completes
/// last wins the result snapshot (completion order, not issue order).
#[derive(Debug, Default)]
pub struct Orchestrator {
    interval_op: SlotState,
    variant_op: SlotState,
    score_op: SlotState,
    pub results: ResultState,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, mode: Mode) -> &SlotState {
        match mode {
            Mode::Predict => &self.interval_op,
            Mode::Variant => &self.variant_op,
            Mode::Score => &self.score_op,
        }
    }

    fn slot_mut(&mut self, mode: Mode) -> &mut SlotState {
        match mode {
            Mode::Predict => &mut self.interval_op,
            Mode::Variant => &mut self.variant_op,
            Mode::Score => &mut self.score_op,
        }
    }

    /// Marks a slot pending; a settled slot resets on resubmission.
    pub fn begin(&mut self, mode: Mode) {
        *self.slot_mut(mode) = SlotState::Pending;
    }

    /// Unified loading: true while any slot is pending.
    pub fn is_loading(&self) -> bool {
        self.interval_op.is_pending() || self.variant_op.is_pending() || self.score_op.is_pending()
    }

    /// Unified error: first failure in fixed slot order.
    pub fn first_error(&self) -> Option<&str> {
        self.interval_op
            .error()
            .or_else(|| self.variant_op.error())
            .or_else(|| self.score_op.error())
    }

    pub fn complete_interval_prediction(&mut self, resp: PredictResponse) {
        self.interval_op = SlotState::Succeeded;
        self.results.commit_prediction(resp);
    }

    pub fn complete_variant_prediction(&mut self, resp: PredictResponse) {
        self.variant_op = SlotState::Succeeded;
        self.results.commit_prediction(resp);
    }

    pub fn complete_scores(&mut self, resp: ScoreResponse) {
        self.score_op = SlotState::Succeeded;
        self.results.commit_scores(resp);
    }

    pub fn fail(&mut self, mode: Mode, err: &ClientError) {
        *self.slot_mut(mode) = SlotState::Failed(err.surface());
    }

    /// Drives one submit for the mode current at submit time: gate, mark
    /// pending, await the matching server operation, commit or fail.
    pub async fn submit(&mut self, client: &ApiClient, form: &FormState) -> Result<()> {
        if self.is_loading() {
            return Err(ClientError::InvalidInput(
                "a request is already in flight".to_string(),
            ));
        }
        let payload = form.build_request()?;
        let mode = form.mode;
        self.begin(mode);
        info!("submitting {} request", mode);

        let outcome = match payload {
            RequestPayload::Interval(req) => match client.predict_interval(&req).await {
                Ok(resp) => {
                    self.complete_interval_prediction(resp);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            RequestPayload::Variant(req) => match client.predict_variant(&req).await {
                Ok(resp) => {
                    self.complete_variant_prediction(resp);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            RequestPayload::Score(req) => match client.score_variant(&req).await {
                Ok(resp) => {
                    self.complete_scores(resp);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };

        if let Err(e) = outcome {
            self.fail(mode, &e);
            return Err(e);
        }
        Ok(())
    }
}
