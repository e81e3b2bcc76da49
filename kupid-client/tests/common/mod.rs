//! In-memory gateway for exercising client flows

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use kupid_client::{ClientError, ClientResult, KupidApi};
use kupid_common::api::{InviteRequest, NewUser, PreferencesUpdate};
use kupid_common::{Match, MatchDetails, ScoreBreakdown};

/// Records every call in order and answers from canned replies
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    pub add_user_error: Option<ClientError>,
    pub update_preferences_error: Option<ClientError>,
    pub existing_profile: Option<Value>,
    pub matches: Vec<Match>,
    pub search_error: Option<ClientError>,
    pub invite_error: Option<ClientError>,
    pub invites: Mutex<Vec<InviteRequest>>,
    pub added_users: Mutex<Vec<NewUser>>,
    pub preferences: Mutex<Vec<PreferencesUpdate>>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

pub fn server_error(message: &str) -> ClientError {
    ClientError::Api {
        status: 500,
        message: message.to_string(),
    }
}

pub fn candidate(uid: &str, score: f64) -> Match {
    Match {
        uid: uid.to_string(),
        display_name: format!("Candidate {}", uid),
        gender: "male".to_string(),
        sexual_orientation: "heterosexual".to_string(),
        age: Some(21),
        class_year: Some(2026),
        race: "Other".to_string(),
        religion: "None".to_string(),
        interests: "music".to_string(),
        dream_date: "Concert".to_string(),
        instagram_handle: None,
        score_breakdown: ScoreBreakdown::default(),
        final_score: score,
    }
}

#[async_trait]
impl KupidApi for FakeApi {
    async fn add_user(&self, user: &NewUser) -> ClientResult<Value> {
        self.record("add-user");
        self.added_users.lock().unwrap().push(user.clone());
        match &self.add_user_error {
            Some(e) => Err(e.clone()),
            None => Ok(json!({ "success": true, "message": "User added successfully" })),
        }
    }

    async fn update_preferences(&self, prefs: &PreferencesUpdate) -> ClientResult<Value> {
        self.record("update-preferences");
        self.preferences.lock().unwrap().push(prefs.clone());
        match &self.update_preferences_error {
            Some(e) => Err(e.clone()),
            None => Ok(json!({ "success": true, "message": "Preferences updated successfully" })),
        }
    }

    async fn get_user(&self, _uid: &str) -> ClientResult<Option<Value>> {
        self.record("get-user");
        Ok(self.existing_profile.clone())
    }

    async fn search_matches(&self, _uid: &str) -> ClientResult<Vec<Match>> {
        self.record("search-matches");
        match &self.search_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.matches.clone()),
        }
    }

    async fn document_to_user(&self, uid: &str) -> ClientResult<Option<MatchDetails>> {
        self.record("document-to-user");
        Ok(Some(MatchDetails {
            uid: Some(uid.to_string()),
            display_name: Some(format!("Candidate {}", uid)),
            ..MatchDetails::default()
        }))
    }

    async fn send_invite(&self, invite: &InviteRequest) -> ClientResult<()> {
        self.record("send-invite");
        self.invites.lock().unwrap().push(invite.clone());
        match &self.invite_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn check_onboarding(&self) -> ClientResult<bool> {
        self.record("check-onboarding");
        Ok(self.existing_profile.is_some())
    }
}
