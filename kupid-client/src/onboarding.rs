//! Onboarding wizard
//!
//! A linear state machine over sixteen steps:
//!
//! ```text
//! Checking ─► Editing(Basics) ─► ... ─► Editing(PrefReligion) ─► Submitting ─► Complete
//!    │              ▲   next / back                                   │
//!    ▼              └──────────────────────── Failed(message) ◄───────┘
//! AlreadyOnboarded
//! ```
//!
//! `next` validates the current step and refuses to advance on bad input.
//! Submission is two sequential calls, create-user then update-preferences;
//! the first failure stops the sequence. A user record created before a
//! failed preference update is not rolled back.

use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::KupidApi;
use crate::error::{ClientError, ClientResult};
use crate::redirect::RedirectTarget;
use crate::validation;
use kupid_common::api::{NewUser, PreferencesUpdate};
use kupid_common::profile::first_profile;

pub const TOTAL_STEPS: usize = 16;

/// Pause on the completion screen before moving to the matches page
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

pub const GENDER_OPTIONS: &[&str] = &["male", "female"];
pub const ORIENTATION_OPTIONS: &[&str] = &["heterosexual", "homosexual", "bisexual"];
pub const RACE_OPTIONS: &[&str] = &[
    "Asian",
    "Black",
    "Latinx",
    "White",
    "Middle Eastern",
    "Native American",
    "Pacific Islander",
    "Mixed",
    "Other",
];
pub const RELIGION_OPTIONS: &[&str] = &["None", "Christian", "Muslim", "Jewish", "Hindu", "Buddhist", "Other"];
pub const INTEREST_OPTIONS: &[&str] = &[
    "art",
    "gaming",
    "yoga",
    "music",
    "sports",
    "reading",
    "cooking",
    "travel",
    "photography",
    "dancing",
];
pub const BUDGET_OPTIONS: &[&str] = &["$0-30", "$30-60", "$60+"];
pub const PREF_GENDER_OPTIONS: &[&str] = &["male", "female", "both"];
pub const PREF_ORIENTATION_OPTIONS: &[&str] = &["heterosexual", "homosexual", "bisexual", "any"];
pub const PREF_RACE_OPTIONS: &[&str] = &[
    "Any",
    "Asian",
    "Black",
    "Latinx",
    "White",
    "Middle Eastern",
    "Native American",
    "Pacific Islander",
    "Mixed",
    "Other",
];
pub const PREF_RELIGION_OPTIONS: &[&str] = &[
    "Any",
    "None",
    "Christian",
    "Muslim",
    "Jewish",
    "Hindu",
    "Buddhist",
    "Other",
];

pub const DEFAULT_BUDGET: &str = "$0-30";

/// One user-entered value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DisplayName,
    ClassYear,
    InstagramHandle,
    Email,
    Phone,
    Gender,
    SexualOrientation,
    Age,
    Race,
    Religion,
    Interests,
    DreamDate,
    Budget,
    PrefGender,
    PrefSexualOrientation,
    PrefAge,
    PrefClassYear,
    PrefRace,
    PrefReligion,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::DisplayName => "What's your name?",
            Field::ClassYear => "Class year (e.g. 2025)",
            Field::InstagramHandle => "Instagram handle (optional)",
            Field::Email => "Email address",
            Field::Phone => "Phone number",
            Field::Gender => "Gender",
            Field::SexualOrientation => "Sexual orientation",
            Field::Age => "Age",
            Field::Race => "Race/ethnicity",
            Field::Religion => "Religion",
            Field::Interests => "Interests",
            Field::DreamDate => "Describe your dream date",
            Field::Budget => "Date budget",
            Field::PrefGender => "Gender you're interested in",
            Field::PrefSexualOrientation => "Preferred sexual orientation",
            Field::PrefAge => "Preferred age (e.g. 22 or 21-25)",
            Field::PrefClassYear => "Preferred class year (e.g. 2025 or 2024-2026)",
            Field::PrefRace => "Preferred race/ethnicity",
            Field::PrefReligion => "Preferred religion",
        }
    }

    /// Allowed values for choice fields; `None` for free text
    pub fn options(self) -> Option<&'static [&'static str]> {
        match self {
            Field::Gender => Some(GENDER_OPTIONS),
            Field::SexualOrientation => Some(ORIENTATION_OPTIONS),
            Field::Race => Some(RACE_OPTIONS),
            Field::Religion => Some(RELIGION_OPTIONS),
            Field::Interests => Some(INTEREST_OPTIONS),
            Field::Budget => Some(BUDGET_OPTIONS),
            Field::PrefGender => Some(PREF_GENDER_OPTIONS),
            Field::PrefSexualOrientation => Some(PREF_ORIENTATION_OPTIONS),
            Field::PrefRace => Some(PREF_RACE_OPTIONS),
            Field::PrefReligion => Some(PREF_RELIGION_OPTIONS),
            _ => None,
        }
    }
}

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Basics,
    Contact,
    Gender,
    Orientation,
    Age,
    Race,
    Religion,
    Interests,
    DreamDate,
    Budget,
    PrefGender,
    PrefOrientation,
    PrefAge,
    PrefClassYear,
    PrefRace,
    PrefReligion,
}

impl Step {
    pub const ALL: [Step; TOTAL_STEPS] = [
        Step::Basics,
        Step::Contact,
        Step::Gender,
        Step::Orientation,
        Step::Age,
        Step::Race,
        Step::Religion,
        Step::Interests,
        Step::DreamDate,
        Step::Budget,
        Step::PrefGender,
        Step::PrefOrientation,
        Step::PrefAge,
        Step::PrefClassYear,
        Step::PrefRace,
        Step::PrefReligion,
    ];

    pub const FIRST: Step = Step::Basics;
    pub const LAST: Step = Step::PrefReligion;

    /// 1-based position
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn from_number(number: usize) -> Option<Step> {
        number.checked_sub(1).and_then(|i| Step::ALL.get(i)).copied()
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        Step::from_number(self.number() - 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Basics => "Let's start with the basics",
            Step::Contact => "How can we reach you?",
            Step::Gender => "What's your gender?",
            Step::Orientation => "What's your sexual orientation?",
            Step::Age => "How old are you?",
            Step::Race => "What's your race/ethnicity?",
            Step::Religion => "What's your religion?",
            Step::Interests => "What are your interests?",
            Step::DreamDate => "Describe your dream date",
            Step::Budget => "What's your date budget?",
            Step::PrefGender => "What gender are you interested in?",
            Step::PrefOrientation => "Preferred sexual orientation?",
            Step::PrefAge => "Preferred age range?",
            Step::PrefClassYear => "Preferred class year?",
            Step::PrefRace => "Preferred race/ethnicity?",
            Step::PrefReligion => "Preferred religion?",
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            Step::Basics => &[Field::DisplayName, Field::ClassYear, Field::InstagramHandle],
            Step::Contact => &[Field::Email, Field::Phone],
            Step::Gender => &[Field::Gender],
            Step::Orientation => &[Field::SexualOrientation],
            Step::Age => &[Field::Age],
            Step::Race => &[Field::Race],
            Step::Religion => &[Field::Religion],
            Step::Interests => &[Field::Interests],
            Step::DreamDate => &[Field::DreamDate],
            Step::Budget => &[Field::Budget],
            Step::PrefGender => &[Field::PrefGender],
            Step::PrefOrientation => &[Field::PrefSexualOrientation],
            Step::PrefAge => &[Field::PrefAge],
            Step::PrefClassYear => &[Field::PrefClassYear],
            Step::PrefRace => &[Field::PrefRace],
            Step::PrefReligion => &[Field::PrefReligion],
        }
    }

    /// Preference steps may be left empty
    pub fn is_optional(self) -> bool {
        self.number() >= Step::PrefGender.number()
    }
}

/// Values collected so far; discarded once submitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingData {
    pub email: String,
    pub phone: String,
    pub display_name: String,
    pub class_year: String,
    pub instagram_handle: String,
    pub gender: String,
    pub sexual_orientation: String,
    pub age: String,
    pub race: String,
    pub religion: String,
    pub interests: Vec<String>,
    pub dream_date: String,
    pub budget: String,
    pub pref_gender: String,
    pub pref_sexual_orientation: String,
    pub pref_age: String,
    pub pref_class_year: String,
    pub pref_race: String,
    pub pref_religion: String,
}

impl OnboardingData {
    fn slot(&mut self, field: Field) -> Option<&mut String> {
        let slot = match field {
            Field::DisplayName => &mut self.display_name,
            Field::ClassYear => &mut self.class_year,
            Field::InstagramHandle => &mut self.instagram_handle,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Gender => &mut self.gender,
            Field::SexualOrientation => &mut self.sexual_orientation,
            Field::Age => &mut self.age,
            Field::Race => &mut self.race,
            Field::Religion => &mut self.religion,
            Field::Interests => return None,
            Field::DreamDate => &mut self.dream_date,
            Field::Budget => &mut self.budget,
            Field::PrefGender => &mut self.pref_gender,
            Field::PrefSexualOrientation => &mut self.pref_sexual_orientation,
            Field::PrefAge => &mut self.pref_age,
            Field::PrefClassYear => &mut self.pref_class_year,
            Field::PrefRace => &mut self.pref_race,
            Field::PrefReligion => &mut self.pref_religion,
        };
        Some(slot)
    }

    /// Set a field; for interests the value is a comma-separated list
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match self.slot(field) {
            Some(slot) => *slot = value,
            None => {
                self.interests = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
    }

    pub fn get(&self, field: Field) -> String {
        let value = match field {
            Field::DisplayName => &self.display_name,
            Field::ClassYear => &self.class_year,
            Field::InstagramHandle => &self.instagram_handle,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Gender => &self.gender,
            Field::SexualOrientation => &self.sexual_orientation,
            Field::Age => &self.age,
            Field::Race => &self.race,
            Field::Religion => &self.religion,
            Field::Interests => return self.interests.join(", "),
            Field::DreamDate => &self.dream_date,
            Field::Budget => &self.budget,
            Field::PrefGender => &self.pref_gender,
            Field::PrefSexualOrientation => &self.pref_sexual_orientation,
            Field::PrefAge => &self.pref_age,
            Field::PrefClassYear => &self.pref_class_year,
            Field::PrefRace => &self.pref_race,
            Field::PrefReligion => &self.pref_religion,
        };
        value.clone()
    }

    /// Add the interest if absent, remove it if present
    pub fn toggle_interest(&mut self, interest: &str) {
        match self.interests.iter().position(|i| i == interest) {
            Some(pos) => {
                self.interests.remove(pos);
            }
            None => self.interests.push(interest.to_string()),
        }
    }

    /// Check the fields `step` collects
    pub fn validate_step(&self, step: Step) -> ClientResult<()> {
        use validation::{age, age_range, choice, class_year, contact, required, year_range};

        match step {
            Step::Basics => {
                required(&self.display_name, "Please enter your name")?;
                class_year(&self.class_year)?;
            }
            Step::Contact => contact(&self.email, &self.phone)?,
            Step::Gender => {
                choice(&self.gender, GENDER_OPTIONS, "gender")?;
            }
            Step::Orientation => {
                choice(&self.sexual_orientation, ORIENTATION_OPTIONS, "sexual orientation")?;
            }
            Step::Age => {
                age(&self.age)?;
            }
            Step::Race => {
                choice(&self.race, RACE_OPTIONS, "race/ethnicity")?;
            }
            Step::Religion => {
                choice(&self.religion, RELIGION_OPTIONS, "religion")?;
            }
            Step::Interests => {
                if self.interests.is_empty() {
                    return Err(ClientError::Validation("Please select at least one interest".to_string()));
                }
                for interest in &self.interests {
                    choice(interest, INTEREST_OPTIONS, "interests")?;
                }
            }
            Step::DreamDate => {
                required(&self.dream_date, "Please describe your dream date")?;
            }
            Step::Budget => {
                choice(&self.budget, BUDGET_OPTIONS, "budget")?;
            }
            Step::PrefGender => optional(&self.pref_gender, |v| {
                choice(v, PREF_GENDER_OPTIONS, "preferred gender").map(|_| ())
            })?,
            Step::PrefOrientation => optional(&self.pref_sexual_orientation, |v| {
                choice(v, PREF_ORIENTATION_OPTIONS, "preferred sexual orientation").map(|_| ())
            })?,
            Step::PrefAge => optional(&self.pref_age, |v| age_range(v).map(|_| ()))?,
            Step::PrefClassYear => optional(&self.pref_class_year, |v| year_range(v).map(|_| ()))?,
            Step::PrefRace => optional(&self.pref_race, |v| {
                choice(v, PREF_RACE_OPTIONS, "preferred race/ethnicity").map(|_| ())
            })?,
            Step::PrefReligion => optional(&self.pref_religion, |v| {
                choice(v, PREF_RELIGION_OPTIONS, "preferred religion").map(|_| ())
            })?,
        }
        Ok(())
    }

    /// User record for `/api/add-user`
    pub fn user_record(&self, uid: &str) -> ClientResult<NewUser> {
        let phone = self.phone.trim();
        Ok(NewUser {
            uid: uid.to_string(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            display_name: self.display_name.trim().to_string(),
            class_year: validation::class_year(&self.class_year)?,
            gender: self.gender.clone(),
            sexual_orientation: self.sexual_orientation.clone(),
            age: validation::age(&self.age)?,
            race: self.race.clone(),
            religion: self.religion.clone(),
            interests: self.interests.join(", "),
            dream_date: self.dream_date.trim().to_string(),
            budget: self.budget.clone(),
            instagram_handle: self.instagram_handle.trim().to_string(),
        })
    }

    /// Preference record for `/api/update-preferences`, blanks filled with defaults
    pub fn preference_record(&self, uid: &str) -> ClientResult<PreferencesUpdate> {
        let pref_class_year = if self.pref_class_year.trim().is_empty() {
            validation::class_year(&self.class_year)?
        } else {
            validation::year_range(&self.pref_class_year)?.0
        };

        Ok(PreferencesUpdate {
            user_uid: uid.to_string(),
            pref_class_year,
            pref_gender: or_default(&self.pref_gender, "any"),
            pref_sexual_orientation: or_default(&self.pref_sexual_orientation, "any"),
            pref_age: or_default(&self.pref_age, self.age.trim()),
            pref_race: or_default(&self.pref_race, "Any"),
            pref_religion: or_default(&self.pref_religion, "Any"),
            pref_budget: or_default(&self.budget, DEFAULT_BUDGET),
        })
    }
}

/// Empty passes; anything else must pass `check`
fn optional(value: &str, check: impl Fn(&str) -> ClientResult<()>) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Ok(());
    }
    check(value)
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    let chosen = if value.is_empty() { default } else { value };
    chosen.to_string()
}

/// Where the wizard is
#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    /// Waiting on the existing-profile lookup
    Checking,
    Editing(Step),
    Submitting,
    Complete,
    /// Submission failed; shown on the last step, `next` retries
    Failed(String),
    /// A profile already exists; nothing to collect
    AlreadyOnboarded,
}

/// Outcome of [`Wizard::next`]
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved(Step),
    /// Validation failed; the step is unchanged
    Rejected(String),
    /// Last step passed; call [`Wizard::submit`]
    ReadyToSubmit,
    /// `next` has no meaning in the current state
    Ignored,
}

/// Onboarding wizard for one signed-in user
#[derive(Debug, Clone)]
pub struct Wizard {
    uid: String,
    data: OnboardingData,
    state: WizardState,
    error: Option<String>,
}

impl Wizard {
    pub fn new(uid: impl Into<String>, email: Option<&str>) -> Self {
        let data = OnboardingData {
            email: email.unwrap_or_default().to_string(),
            ..OnboardingData::default()
        };
        Self {
            uid: uid.into(),
            data,
            state: WizardState::Checking,
            error: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn data(&self) -> &OnboardingData {
        &self.data
    }

    /// Message from the last rejected step or failed submission
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Step on screen, if any
    pub fn current_step(&self) -> Option<Step> {
        match self.state {
            WizardState::Editing(step) => Some(step),
            WizardState::Failed(_) => Some(Step::LAST),
            _ => None,
        }
    }

    pub fn progress_percent(&self) -> u32 {
        let done = match self.state {
            WizardState::Checking | WizardState::AlreadyOnboarded => 0,
            WizardState::Submitting | WizardState::Complete => TOTAL_STEPS,
            _ => self.current_step().map(Step::number).unwrap_or(0),
        };
        ((done as f64 / TOTAL_STEPS as f64) * 100.0).round() as u32
    }

    /// Skip the existing-profile lookup and show the first step
    pub fn begin(&mut self) {
        if self.state == WizardState::Checking {
            self.state = WizardState::Editing(Step::FIRST);
        }
    }

    /// Ask the gateway whether this user already has a profile
    ///
    /// A lookup failure is logged and the wizard starts normally.
    pub async fn check_existing(&mut self, api: &dyn KupidApi) -> &WizardState {
        if self.state != WizardState::Checking {
            return &self.state;
        }
        if self.uid.is_empty() {
            self.begin();
            return &self.state;
        }

        match api.get_user(&self.uid).await {
            Ok(Some(reply)) if first_profile(&reply).is_some() => {
                info!(uid = %self.uid, "Profile already exists, skipping onboarding");
                self.state = WizardState::AlreadyOnboarded;
            }
            Ok(_) => {
                info!(uid = %self.uid, "No profile yet, starting onboarding");
                self.begin();
            }
            Err(e) => {
                warn!(uid = %self.uid, error = %e, "Existing-profile check failed, starting onboarding");
                self.begin();
            }
        }
        &self.state
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.data.set(field, value);
    }

    pub fn toggle_interest(&mut self, interest: &str) {
        self.data.toggle_interest(interest);
    }

    /// Validate the current step and move forward
    pub fn next(&mut self) -> Advance {
        let Some(step) = self.current_step() else {
            return Advance::Ignored;
        };

        if let Err(e) = self.data.validate_step(step) {
            let message = e.to_string();
            self.error = Some(message.clone());
            return Advance::Rejected(message);
        }
        self.error = None;

        match step.next() {
            Some(next) => {
                self.state = WizardState::Editing(next);
                Advance::Moved(next)
            }
            None => {
                self.state = WizardState::Submitting;
                Advance::ReadyToSubmit
            }
        }
    }

    /// Move to the previous step; collected values are kept
    pub fn back(&mut self) -> Option<Step> {
        let step = self.current_step()?;
        let prev = step.prev()?;
        self.error = None;
        self.state = WizardState::Editing(prev);
        Some(prev)
    }

    /// Send the user record, then the preference record
    pub async fn submit(&mut self, api: &dyn KupidApi) -> &WizardState {
        if self.state != WizardState::Submitting {
            return &self.state;
        }

        match self.send(api).await {
            Ok(()) => {
                info!(uid = %self.uid, "Onboarding complete");
                self.error = None;
                self.state = WizardState::Complete;
            }
            Err(message) => {
                error!(uid = %self.uid, error = %message, "Onboarding submission failed");
                self.error = Some(message.clone());
                self.state = WizardState::Failed(message);
            }
        }
        &self.state
    }

    async fn send(&self, api: &dyn KupidApi) -> Result<(), String> {
        if self.uid.trim().is_empty() {
            return Err("User ID not found. Please sign in again.".to_string());
        }
        let user = self.data.user_record(&self.uid).map_err(|e| e.to_string())?;
        let prefs = self.data.preference_record(&self.uid).map_err(|e| e.to_string())?;

        info!(uid = %self.uid, "Adding user (1/2)");
        api.add_user(&user)
            .await
            .map_err(|e| format!("Failed to add user: {}", e))?;

        info!(uid = %self.uid, "Updating preferences (2/2)");
        api.update_preferences(&prefs)
            .await
            .map_err(|e| format!("Failed to update preferences: {}", e))?;

        Ok(())
    }

    /// Page to move to once the wizard is done with
    pub fn redirect(&self) -> Option<RedirectTarget> {
        match self.state {
            WizardState::Complete | WizardState::AlreadyOnboarded => Some(RedirectTarget::Matches),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> OnboardingData {
        let mut data = OnboardingData::default();
        data.set(Field::DisplayName, "Sam");
        data.set(Field::ClassYear, "2027");
        data.set(Field::Email, "sam@college.edu");
        data.set(Field::Gender, "female");
        data.set(Field::SexualOrientation, "heterosexual");
        data.set(Field::Age, "20");
        data.set(Field::Race, "Asian");
        data.set(Field::Religion, "None");
        data.set(Field::Interests, "art, travel");
        data.set(Field::DreamDate, "Art gallery followed by sushi");
        data.set(Field::Budget, "$30-60");
        data
    }

    #[test]
    fn test_step_numbering() {
        assert_eq!(Step::FIRST.number(), 1);
        assert_eq!(Step::LAST.number(), TOTAL_STEPS);
        assert_eq!(Step::Basics.next(), Some(Step::Contact));
        assert_eq!(Step::Basics.prev(), None);
        assert_eq!(Step::LAST.next(), None);
        assert_eq!(Step::from_number(13), Some(Step::PrefAge));
        assert!(Step::PrefGender.is_optional());
        assert!(!Step::Budget.is_optional());
    }

    #[test]
    fn test_toggle_interest() {
        let mut data = OnboardingData::default();
        data.toggle_interest("art");
        data.toggle_interest("yoga");
        data.toggle_interest("art");
        assert_eq!(data.interests, vec!["yoga".to_string()]);
        assert_eq!(data.get(Field::Interests), "yoga");
    }

    #[test]
    fn test_every_required_step_validates_when_filled() {
        let data = filled();
        for step in Step::ALL {
            assert!(data.validate_step(step).is_ok(), "step {:?} rejected", step);
        }
    }

    #[test]
    fn test_interest_outside_options_rejected() {
        let mut data = filled();
        data.set(Field::Interests, "art, skydiving");
        assert!(data.validate_step(Step::Interests).is_err());
    }

    #[test]
    fn test_preference_defaults() {
        let prefs = filled().preference_record("u1").unwrap();
        assert_eq!(prefs.user_uid, "u1");
        assert_eq!(prefs.pref_class_year, 2027);
        assert_eq!(prefs.pref_gender, "any");
        assert_eq!(prefs.pref_sexual_orientation, "any");
        assert_eq!(prefs.pref_age, "20");
        assert_eq!(prefs.pref_race, "Any");
        assert_eq!(prefs.pref_religion, "Any");
        assert_eq!(prefs.pref_budget, "$30-60");
    }

    #[test]
    fn test_preference_values_and_budget_fallback() {
        let mut data = filled();
        data.set(Field::PrefClassYear, "2026-2028");
        data.set(Field::PrefAge, "19-22");
        data.set(Field::PrefGender, "both");
        data.set(Field::Budget, "");
        let prefs = data.preference_record("u1").unwrap();
        assert_eq!(prefs.pref_class_year, 2026);
        assert_eq!(prefs.pref_age, "19-22");
        assert_eq!(prefs.pref_gender, "both");
        assert_eq!(prefs.pref_budget, DEFAULT_BUDGET);
    }

    #[test]
    fn test_user_record() {
        let user = filled().user_record("u1").unwrap();
        assert_eq!(user.class_year, 2027);
        assert_eq!(user.age, 20);
        assert_eq!(user.interests, "art, travel");
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_progress() {
        let mut wizard = Wizard::new("u1", None);
        assert_eq!(wizard.progress_percent(), 0);
        wizard.begin();
        assert_eq!(wizard.progress_percent(), 6);
    }
}
