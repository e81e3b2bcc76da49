//! Match browser
//!
//! [`MatchBrowser`] holds the browsing state and exposes explicit
//! transitions; [`BrowserSession`] performs the gateway calls those
//! transitions ask for.
//!
//! Detail lookups carry a request token. Only the result for the latest
//! token is applied, so a slow lookup for a candidate the user has already
//! swiped past cannot overwrite the current one.
//!
//! Invites do not block the swipe. Each one is tracked per candidate as
//! [`InviteStatus`] so a failed invite stays visible.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::KupidApi;
use crate::error::ClientResult;
use kupid_common::api::InviteRequest;
use kupid_common::matches::sort_by_score;
use kupid_common::{Match, MatchDetails};

#[derive(Debug, Clone, PartialEq)]
pub enum InviteStatus {
    Pending,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
}

/// A detail lookup the caller should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub token: u64,
    pub uid: String,
}

/// Effects requested by a swipe
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Swipe {
    pub invite: Option<InviteRequest>,
    pub details: Option<DetailRequest>,
}

/// Detail panel for the current candidate
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsView {
    Idle,
    Loading,
    Loaded(MatchDetails),
    /// Lookup failed or found nothing; render fallbacks
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Browsing,
    /// Every candidate seen (or none returned); offer a reprompt
    Exhausted,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct MatchBrowser {
    viewer_uid: String,
    viewer: Option<Value>,
    matches: Vec<Match>,
    index: usize,
    loaded: bool,
    load_error: Option<String>,
    details: DetailsView,
    latest_token: u64,
    invites: HashMap<String, InviteStatus>,
}

impl MatchBrowser {
    pub fn new(viewer_uid: impl Into<String>) -> Self {
        Self {
            viewer_uid: viewer_uid.into(),
            viewer: None,
            matches: Vec::new(),
            index: 0,
            loaded: false,
            load_error: None,
            details: DetailsView::Idle,
            latest_token: 0,
            invites: HashMap::new(),
        }
    }

    pub fn viewer_uid(&self) -> &str {
        &self.viewer_uid
    }

    /// Viewer's own profile, when the lookup succeeded
    pub fn viewer(&self) -> Option<&Value> {
        self.viewer.as_ref()
    }

    /// Matches in display order
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Match> {
        self.matches.get(self.index)
    }

    pub fn details(&self) -> &DetailsView {
        &self.details
    }

    pub fn invite_status(&self, candidate_uid: &str) -> Option<&InviteStatus> {
        self.invites.get(candidate_uid)
    }

    pub fn invites(&self) -> &HashMap<String, InviteStatus> {
        &self.invites
    }

    pub fn phase(&self) -> Phase {
        if !self.loaded {
            return match &self.load_error {
                Some(message) => Phase::Failed(message.clone()),
                None => Phase::Loading,
            };
        }
        if self.index >= self.matches.len() {
            Phase::Exhausted
        } else {
            Phase::Browsing
        }
    }

    /// Reset for a fresh fetch sequence
    pub fn begin_load(&mut self) {
        self.matches.clear();
        self.index = 0;
        self.loaded = false;
        self.load_error = None;
        self.details = DetailsView::Idle;
    }

    pub fn set_viewer(&mut self, profile: Option<Value>) {
        self.viewer = profile;
    }

    /// Install a fetched match list; returns the lookup for the first candidate
    pub fn set_matches(&mut self, mut matches: Vec<Match>) -> Option<DetailRequest> {
        sort_by_score(&mut matches);
        self.matches = matches;
        self.index = 0;
        self.loaded = true;
        self.load_error = None;
        self.request_details()
    }

    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.loaded = false;
        self.load_error = Some(message.into());
    }

    fn request_details(&mut self) -> Option<DetailRequest> {
        let uid = self.current()?.uid.clone();
        self.latest_token += 1;
        self.details = DetailsView::Loading;
        Some(DetailRequest {
            token: self.latest_token,
            uid,
        })
    }

    /// Apply a detail lookup result; stale tokens are ignored
    ///
    /// Returns whether the result was applied.
    pub fn apply_details(&mut self, token: u64, result: ClientResult<Option<MatchDetails>>) -> bool {
        if token != self.latest_token {
            debug!(token, latest = self.latest_token, "Discarding stale match details");
            return false;
        }
        self.details = match result {
            Ok(Some(details)) => DetailsView::Loaded(details),
            Ok(None) => DetailsView::Unavailable,
            Err(e) => {
                warn!(error = %e, "Failed to load match details");
                DetailsView::Unavailable
            }
        };
        true
    }

    /// Act on the current candidate and move to the next one
    pub fn decide(&mut self, decision: Decision) -> Swipe {
        let Some(candidate) = self.current() else {
            return Swipe::default();
        };
        let candidate_uid = candidate.uid.clone();

        let invite = match decision {
            Decision::Yes => {
                self.invites.insert(candidate_uid.clone(), InviteStatus::Pending);
                Some(InviteRequest {
                    user_id_1: self.viewer_uid.clone(),
                    user_id_2: candidate_uid,
                })
            }
            Decision::No => None,
        };

        self.index += 1;
        let details = self.request_details();
        if details.is_none() {
            self.details = DetailsView::Idle;
        }
        Swipe { invite, details }
    }

    pub fn record_invite(&mut self, candidate_uid: &str, result: ClientResult<()>) {
        let status = match result {
            Ok(()) => InviteStatus::Sent,
            Err(e) => InviteStatus::Failed(e.to_string()),
        };
        self.invites.insert(candidate_uid.to_string(), status);
    }

    /// Start over from the first candidate; the caller re-fetches
    ///
    /// Settled invite statuses are dropped. Pending ones stay so their
    /// outcomes still land.
    pub fn reprompt(&mut self) {
        self.invites.retain(|_, status| *status == InviteStatus::Pending);
        self.begin_load();
    }
}

struct InviteOutcome {
    candidate: String,
    result: ClientResult<()>,
}

/// Drives a [`MatchBrowser`] against the gateway
pub struct BrowserSession {
    api: Arc<dyn KupidApi>,
    state: MatchBrowser,
    outcomes_tx: mpsc::UnboundedSender<InviteOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<InviteOutcome>,
    in_flight: usize,
}

impl BrowserSession {
    pub fn new(api: Arc<dyn KupidApi>, viewer_uid: impl Into<String>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: MatchBrowser::new(viewer_uid),
            outcomes_tx,
            outcomes_rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &MatchBrowser {
        &self.state
    }

    /// Fetch the viewer's profile, then the matches, then the first candidate's details
    pub async fn load(&mut self) -> Phase {
        self.state.begin_load();
        let uid = self.state.viewer_uid().to_string();

        match self.api.get_user(&uid).await {
            Ok(profile) => self.state.set_viewer(profile),
            Err(e) => warn!(uid = %uid, error = %e, "Failed to load own profile"),
        }

        match self.api.search_matches(&uid).await {
            Ok(matches) => {
                info!(uid = %uid, count = matches.len(), "Matches received");
                if let Some(request) = self.state.set_matches(matches) {
                    self.fetch_details(request).await;
                }
            }
            Err(e) => {
                warn!(uid = %uid, error = %e, "Failed to fetch matches");
                self.state.fail_load(format!("Failed to fetch matches: {}", e));
            }
        }
        self.state.phase()
    }

    async fn fetch_details(&mut self, request: DetailRequest) {
        let result = self.api.document_to_user(&request.uid).await;
        self.state.apply_details(request.token, result);
    }

    /// Swipe on the current candidate; a Yes sends the invite in the background
    pub async fn decide(&mut self, decision: Decision) -> Phase {
        self.collect_invites();

        let swipe = self.state.decide(decision);
        if let Some(invite) = swipe.invite {
            self.spawn_invite(invite);
        }
        if let Some(request) = swipe.details {
            self.fetch_details(request).await;
        }
        self.state.phase()
    }

    fn spawn_invite(&mut self, invite: InviteRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.outcomes_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = api.send_invite(&invite).await;
            match &result {
                Ok(()) => info!(candidate = %invite.user_id_2, "Invite sent"),
                Err(e) => warn!(candidate = %invite.user_id_2, error = %e, "Invite failed"),
            }
            let _ = tx.send(InviteOutcome {
                candidate: invite.user_id_2,
                result,
            });
        });
    }

    /// Record invite outcomes that have already arrived
    pub fn collect_invites(&mut self) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.state.record_invite(&outcome.candidate, outcome.result);
        }
    }

    /// Wait for every background invite to finish
    pub async fn settle_invites(&mut self) {
        while self.in_flight > 0 {
            match self.outcomes_rx.recv().await {
                Some(outcome) => {
                    self.in_flight -= 1;
                    self.state.record_invite(&outcome.candidate, outcome.result);
                }
                None => break,
            }
        }
    }

    /// Reset to the first candidate and re-run the fetch sequence
    pub async fn reprompt(&mut self) -> Phase {
        info!(uid = %self.state.viewer_uid(), "Re-fetching matches");
        self.state.reprompt();
        self.load().await
    }
}
