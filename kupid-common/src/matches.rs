//! Match projections returned by the external matching workflow
//!
//! Scores are computed upstream; this crate only orders and displays them.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Fallback shown when a candidate's name is unavailable
pub const UNKNOWN: &str = "Unknown";

/// Fallback shown for any other unavailable profile field
pub const NOT_SPECIFIED: &str = "Not specified";

/// Named score components, each in [0, 1]
///
/// Component names (`race_religion`, `cosine_similarity`, `interests`, ...)
/// are owned by the matching workflow and passed through as-is.
///
/// A `null` map or a `null` component decodes as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(pub BTreeMap<String, f64>);

impl<'de> Deserialize<'de> for ScoreBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, Option<f64>>>::deserialize(deserializer)?;
        Ok(ScoreBreakdown(
            raw.unwrap_or_default()
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v)))
                .collect(),
        ))
    }
}

impl ScoreBreakdown {
    /// `(label, percent)` pairs, labels with underscores replaced by spaces
    pub fn entries(&self) -> Vec<(String, u32)> {
        self.0
            .iter()
            .map(|(name, value)| (name.replace('_', " "), percent(*value)))
            .collect()
    }
}

/// Candidate projection from `/api/search-matches`
///
/// `null` text fields decode as empty and a `null` score as NaN, so one
/// sparse candidate does not fail the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub uid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sexual_orientation: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub class_year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub race: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub religion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dream_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub score_breakdown: ScoreBreakdown,
    #[serde(default = "missing_score", deserialize_with = "score_or_missing")]
    pub final_score: f64,
}

/// Full candidate profile from `/api/document-to-user`
///
/// Every field is optional; display code falls back to [`UNKNOWN`] /
/// [`NOT_SPECIFIED`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub class_year: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub sexual_orientation: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub dream_date: Option<String>,
    #[serde(default)]
    pub instagram_handle: Option<String>,
}

impl MatchDetails {
    pub fn name_or_unknown(&self) -> &str {
        non_blank(self.display_name.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn instagram(&self) -> Option<String> {
        non_blank(self.instagram_handle.as_deref()).map(instagram_display)
    }
}

/// Decode `null` as the type's default
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn missing_score() -> f64 {
    f64::NAN
}

fn score_or_missing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Field value or [`NOT_SPECIFIED`]
pub fn or_not_specified(value: Option<&str>) -> &str {
    non_blank(value).unwrap_or(NOT_SPECIFIED)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Score in [0, 1] as a rounded percentage
pub fn percent(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Handle without any `@`
pub fn instagram_display(handle: &str) -> String {
    handle.replace('@', "")
}

/// Sort by `final_score` descending
///
/// Stable: equal scores keep their upstream order. NaN scores sort last.
pub fn sort_by_score(matches: &mut [Match]) {
    matches.sort_by(|a, b| compare_scores(b.final_score, a.final_score));
}

fn compare_scores(a: f64, b: f64) -> Ordering {
    let key = |s: f64| if s.is_nan() { f64::NEG_INFINITY } else { s };
    key(a).total_cmp(&key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(uid: &str, score: f64) -> Match {
        Match {
            uid: uid.to_string(),
            display_name: uid.to_uppercase(),
            gender: String::new(),
            sexual_orientation: String::new(),
            age: None,
            class_year: None,
            race: String::new(),
            religion: String::new(),
            interests: String::new(),
            dream_date: String::new(),
            instagram_handle: None,
            score_breakdown: ScoreBreakdown::default(),
            final_score: score,
        }
    }

    #[test]
    fn test_sort_descending() {
        let mut matches = vec![candidate("a", 0.4), candidate("b", 0.9), candidate("c", 0.6)];
        sort_by_score(&mut matches);
        let scores: Vec<f64> = matches.iter().map(|m| m.final_score).collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.4]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut matches = vec![candidate("a", 0.5), candidate("b", 0.7), candidate("c", 0.5)];
        sort_by_score(&mut matches);
        let uids: Vec<&str> = matches.iter().map(|m| m.uid.as_str()).collect();
        assert_eq!(uids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_nan_sorts_last() {
        let mut matches = vec![candidate("nan", f64::NAN), candidate("low", 0.1)];
        sort_by_score(&mut matches);
        assert_eq!(matches[0].uid, "low");
    }

    #[test]
    fn test_match_deserializes_upstream_shape() {
        let m: Match = serde_json::from_value(json!({
            "uid": "u9",
            "display_name": "Sam",
            "age": 21,
            "score_breakdown": {"cosine_similarity": 0.81, "class_year": 1.0},
            "final_score": 0.77
        }))
        .unwrap();
        assert_eq!(m.age, Some(21));
        assert_eq!(
            m.score_breakdown.entries(),
            vec![("class year".to_string(), 100), ("cosine similarity".to_string(), 81)]
        );
    }

    #[test]
    fn test_null_fields_decode_as_absent() {
        let m: Match = serde_json::from_value(json!({
            "uid": "u3",
            "display_name": null,
            "race": null,
            "age": null,
            "score_breakdown": {"interests": null, "race_religion": 0.5},
            "final_score": null
        }))
        .unwrap();
        assert_eq!(m.display_name, "");
        assert_eq!(m.race, "");
        assert_eq!(m.age, None);
        assert_eq!(m.score_breakdown.entries(), vec![("race religion".to_string(), 50)]);
        assert!(m.final_score.is_nan());

        let m: Match = serde_json::from_value(json!({"uid": "u4", "score_breakdown": null})).unwrap();
        assert!(m.score_breakdown.0.is_empty());
        assert_eq!(percent(m.final_score), 0);
    }

    #[test]
    fn test_display_fallbacks() {
        let details = MatchDetails::default();
        assert_eq!(details.name_or_unknown(), UNKNOWN);
        assert_eq!(or_not_specified(details.race.as_deref()), NOT_SPECIFIED);
        assert_eq!(or_not_specified(Some("  ")), NOT_SPECIFIED);
        assert_eq!(instagram_display("@kupid.love"), "kupid.love");
        assert_eq!(percent(0.876), 88);
    }
}
