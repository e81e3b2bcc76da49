//! Match browser sessions against an in-memory gateway

mod common;

use common::{candidate, server_error, FakeApi};
use kupid_client::browser::{BrowserSession, Decision, DetailsView, InviteStatus, Phase};
use serde_json::json;
use std::sync::Arc;

fn three_matches() -> FakeApi {
    FakeApi {
        existing_profile: Some(json!([{ "uid": "me", "display_name": "Sam" }])),
        matches: vec![candidate("a", 0.4), candidate("b", 0.9), candidate("c", 0.6)],
        ..FakeApi::default()
    }
}

#[tokio::test]
async fn test_load_fetches_profile_then_matches_then_details() {
    let api = Arc::new(three_matches());
    let mut session = BrowserSession::new(api.clone(), "me");

    assert_eq!(session.load().await, Phase::Browsing);
    assert_eq!(api.calls(), vec!["get-user", "search-matches", "document-to-user"]);

    let order: Vec<f64> = session.state().matches().iter().map(|m| m.final_score).collect();
    assert_eq!(order, vec![0.9, 0.6, 0.4]);
    assert!(session.state().viewer().is_some());
    assert!(matches!(session.state().details(), DetailsView::Loaded(d) if d.uid.as_deref() == Some("b")));
}

#[tokio::test]
async fn test_swipe_termination_and_reprompt() {
    let api = Arc::new(three_matches());
    let mut session = BrowserSession::new(api.clone(), "me");
    session.load().await;

    session.decide(Decision::Yes).await;
    session.decide(Decision::No).await;
    let phase = session.decide(Decision::Yes).await;

    assert_eq!(session.state().index(), 3);
    assert_eq!(phase, Phase::Exhausted);
    assert!(session.state().current().is_none());

    assert_eq!(session.reprompt().await, Phase::Browsing);
    assert_eq!(session.state().index(), 0);
    assert_eq!(api.count("search-matches"), 2);
}

#[tokio::test]
async fn test_invites_sent_for_yes_only() {
    let api = Arc::new(three_matches());
    let mut session = BrowserSession::new(api.clone(), "me");
    session.load().await;

    session.decide(Decision::Yes).await;
    session.decide(Decision::No).await;
    session.decide(Decision::Yes).await;
    session.settle_invites().await;

    let mut invited: Vec<String> = api.invites.lock().unwrap().iter().map(|i| i.user_id_2.clone()).collect();
    invited.sort();
    assert_eq!(invited, vec!["a".to_string(), "b".to_string()]);
    assert!(api.invites.lock().unwrap().iter().all(|i| i.user_id_1 == "me"));

    assert_eq!(session.state().invite_status("b"), Some(&InviteStatus::Sent));
    assert_eq!(session.state().invite_status("a"), Some(&InviteStatus::Sent));
    assert_eq!(session.state().invite_status("c"), None);
}

#[tokio::test]
async fn test_failed_invite_does_not_block_and_is_tracked() {
    let api = Arc::new(FakeApi {
        invite_error: Some(server_error("workflow offline")),
        ..three_matches()
    });
    let mut session = BrowserSession::new(api.clone(), "me");
    session.load().await;

    assert_eq!(session.decide(Decision::Yes).await, Phase::Browsing);
    assert_eq!(session.state().index(), 1);

    session.settle_invites().await;
    assert_eq!(
        session.state().invite_status("b"),
        Some(&InviteStatus::Failed("workflow offline".into()))
    );
}

#[tokio::test]
async fn test_search_failure_surfaces_error() {
    let api = Arc::new(FakeApi {
        search_error: Some(server_error("Failed to fetch matches")),
        ..FakeApi::default()
    });
    let mut session = BrowserSession::new(api.clone(), "me");

    assert!(matches!(session.load().await, Phase::Failed(_)));
    assert_eq!(api.count("document-to-user"), 0);
}

#[tokio::test]
async fn test_no_matches_is_exhausted() {
    let api = Arc::new(FakeApi::default());
    let mut session = BrowserSession::new(api.clone(), "me");

    assert_eq!(session.load().await, Phase::Exhausted);
    assert_eq!(api.count("document-to-user"), 0);
}
