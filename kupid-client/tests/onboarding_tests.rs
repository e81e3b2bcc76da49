//! Onboarding wizard flows against an in-memory gateway

mod common;

use common::{server_error, FakeApi};
use kupid_client::onboarding::{Advance, Field, Step, Wizard, WizardState, TOTAL_STEPS};
use kupid_client::redirect::RedirectTarget;
use serde_json::json;

/// Fill every required field and walk to the last step
fn walk_to_last_step(wizard: &mut Wizard) {
    wizard.set(Field::DisplayName, "Sam");
    wizard.set(Field::ClassYear, "2027");
    wizard.set(Field::InstagramHandle, "@sam.k");
    wizard.set(Field::Gender, "female");
    wizard.set(Field::SexualOrientation, "heterosexual");
    wizard.set(Field::Age, "20");
    wizard.set(Field::Race, "Asian");
    wizard.set(Field::Religion, "None");
    wizard.toggle_interest("art");
    wizard.toggle_interest("travel");
    wizard.set(Field::DreamDate, "Art gallery followed by sushi");
    wizard.set(Field::Budget, "$30-60");
    wizard.set(Field::PrefAge, "19-23");

    for _ in 1..TOTAL_STEPS {
        assert!(matches!(wizard.next(), Advance::Moved(_)), "stuck at {:?}", wizard.state());
    }
    assert_eq!(wizard.current_step(), Some(Step::LAST));
}

fn started(email: Option<&str>) -> Wizard {
    let mut wizard = Wizard::new("u1", email);
    wizard.begin();
    wizard
}

#[test]
fn test_invalid_inputs_do_not_advance() {
    let cases = [
        (Step::Basics, Field::ClassYear, "19999"),
        (Step::Contact, Field::Phone, "abc"),
        (Step::Age, Field::Age, "15"),
    ];

    for (step, field, bad) in cases {
        let mut wizard = started(None);
        wizard.set(Field::DisplayName, "Sam");
        wizard.set(Field::ClassYear, "2027");
        wizard.set(Field::Email, "sam@college.edu");
        wizard.set(Field::Gender, "female");
        wizard.set(Field::SexualOrientation, "bisexual");
        while wizard.current_step() != Some(step) {
            assert!(matches!(wizard.next(), Advance::Moved(_)));
        }

        wizard.set(field, bad);
        match wizard.next() {
            Advance::Rejected(message) => assert!(!message.is_empty()),
            other => panic!("{:?} = {:?} advanced: {:?}", field, bad, other),
        }
        assert_eq!(wizard.current_step(), Some(step));
        assert!(wizard.error().is_some());
    }
}

#[test]
fn test_empty_first_step_rejected() {
    let mut wizard = started(None);
    assert!(matches!(wizard.next(), Advance::Rejected(_)));
    assert_eq!(wizard.state(), &WizardState::Editing(Step::Basics));
}

#[test]
fn test_back_keeps_values() {
    let mut wizard = started(Some("sam@college.edu"));
    wizard.set(Field::DisplayName, "Sam");
    wizard.set(Field::ClassYear, "2027");
    assert_eq!(wizard.next(), Advance::Moved(Step::Contact));

    assert_eq!(wizard.back(), Some(Step::Basics));
    assert_eq!(wizard.back(), None);
    assert_eq!(wizard.data().display_name, "Sam");
    assert_eq!(wizard.data().email, "sam@college.edu");
}

#[test]
fn test_optional_preference_validated_when_filled() {
    let mut wizard = started(Some("sam@college.edu"));
    walk_to_last_step(&mut wizard);
    wizard.set(Field::PrefReligion, "Pastafarian");
    assert!(matches!(wizard.next(), Advance::Rejected(_)));

    wizard.set(Field::PrefReligion, "");
    assert_eq!(wizard.next(), Advance::ReadyToSubmit);
    assert_eq!(wizard.state(), &WizardState::Submitting);
}

#[tokio::test]
async fn test_submit_makes_two_ordered_calls() {
    let api = FakeApi::default();
    let mut wizard = started(Some("sam@college.edu"));
    walk_to_last_step(&mut wizard);
    assert_eq!(wizard.next(), Advance::ReadyToSubmit);

    assert_eq!(wizard.submit(&api).await, &WizardState::Complete);
    assert_eq!(api.calls(), vec!["add-user", "update-preferences"]);
    assert_eq!(wizard.redirect(), Some(RedirectTarget::Matches));

    let user = api.added_users.lock().unwrap()[0].clone();
    assert_eq!(user.uid, "u1");
    assert_eq!(user.email, "sam@college.edu");
    assert_eq!(user.interests, "art, travel");
    assert_eq!(user.instagram_handle, "@sam.k");

    let prefs = api.preferences.lock().unwrap()[0].clone();
    assert_eq!(prefs.user_uid, "u1");
    assert_eq!(prefs.pref_age, "19-23");
    assert_eq!(prefs.pref_class_year, 2027);
    assert_eq!(prefs.pref_gender, "any");
    assert_eq!(prefs.pref_budget, "$30-60");
}

#[tokio::test]
async fn test_add_user_failure_stops_sequence() {
    let api = FakeApi {
        add_user_error: Some(server_error("uid is required")),
        ..FakeApi::default()
    };
    let mut wizard = started(Some("sam@college.edu"));
    walk_to_last_step(&mut wizard);
    wizard.next();

    let state = wizard.submit(&api).await.clone();
    assert_eq!(state, WizardState::Failed("Failed to add user: uid is required".into()));
    assert_eq!(api.calls(), vec!["add-user"]);
    assert_eq!(wizard.redirect(), None);
}

#[tokio::test]
async fn test_preferences_failure_enters_error_state() {
    let api = FakeApi {
        update_preferences_error: Some(server_error("Unauthorized - Missing token")),
        ..FakeApi::default()
    };
    let mut wizard = started(Some("sam@college.edu"));
    walk_to_last_step(&mut wizard);
    wizard.next();

    let state = wizard.submit(&api).await.clone();
    assert!(matches!(state, WizardState::Failed(ref m) if m.starts_with("Failed to update preferences")));
    assert_eq!(api.calls(), vec!["add-user", "update-preferences"]);
    assert_eq!(wizard.current_step(), Some(Step::LAST));
}

#[tokio::test]
async fn test_missing_uid_fails_without_calls() {
    let api = FakeApi::default();
    let mut wizard = Wizard::new("", Some("sam@college.edu"));
    wizard.check_existing(&api).await;
    walk_to_last_step(&mut wizard);
    wizard.next();

    let state = wizard.submit(&api).await.clone();
    assert_eq!(state, WizardState::Failed("User ID not found. Please sign in again.".into()));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_existing_profile_skips_wizard() {
    let api = FakeApi {
        existing_profile: Some(json!([{ "success": true, "uid": "u1" }])),
        ..FakeApi::default()
    };
    let mut wizard = Wizard::new("u1", None);

    assert_eq!(wizard.check_existing(&api).await, &WizardState::AlreadyOnboarded);
    assert_eq!(wizard.redirect(), Some(RedirectTarget::Matches));
    assert_eq!(wizard.next(), Advance::Ignored);
}

#[tokio::test]
async fn test_new_user_starts_at_first_step() {
    let api = FakeApi::default();
    let mut wizard = Wizard::new("u1", None);

    assert_eq!(wizard.check_existing(&api).await, &WizardState::Editing(Step::Basics));
    assert_eq!(api.calls(), vec!["get-user"]);
}
