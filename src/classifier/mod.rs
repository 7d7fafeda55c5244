//! Free-text mood classification.
//!
//! A remote classifier (anything implementing [`MoodClassifier`]) gets one
//! attempt per submission; whatever it fails to produce is covered by the
//! deterministic [`KeywordClassifier`], so a submission always ends on a
//! catalog vibe.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::vibe::{clamp_stress_level, PresetId, VibePatch};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    #[error("classifier reply has no JSON object")]
    NoJson,
    #[error("classifier reply is not a valid verdict: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("classifier picked unknown vibe '{0}'")]
    UnknownVibe(String),
}

#[async_trait]
pub trait MoodClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<VibePatch, ClassifierError>;
}

// Checked in order; the first group with a hit wins.
const KEYWORD_TABLE: &[(PresetId, &[&str])] = &[
    (PresetId::BugHunt, &["debug", "bug", "fix"]),
    (PresetId::CodeReview, &["review", "code", "read"]),
    (PresetId::ShipMode, &["ship", "deploy", "live", "push"]),
    (PresetId::Learning, &["learn", "study", "explore", "curious"]),
    (PresetId::SleepRecovery, &["rest", "sleep", "tired", "exhausted"]),
    (
        PresetId::Calm,
        &["calm", "panic", "stress", "anxiety", "angry", "upset", "mad"],
    ),
    (PresetId::Standup, &["standup", "sync", "meeting", "team"]),
    (PresetId::DeepWork, &["deep", "focus", "work", "ready", "coding"]),
];

/// Case-insensitive substring match against the keyword table. Falls back to
/// deep work when nothing matches.
pub fn match_keywords(text: &str) -> PresetId {
    let lower = text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, words)| words.iter().any(|word| lower.contains(word)))
        .map(|(preset, _)| *preset)
        .unwrap_or(PresetId::DeepWork)
}

/// Offline classifier: never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn patch_for(&self, text: &str) -> VibePatch {
        VibePatch::from(match_keywords(text).vibe())
    }
}

#[async_trait]
impl MoodClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<VibePatch, ClassifierError> {
        Ok(self.patch_for(text))
    }
}

/// What a language-model classifier is asked to answer with.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub vibe: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stress_level: Option<f64>,
    #[serde(default)]
    pub suggested_ritual: Option<String>,
}

impl Verdict {
    /// The named catalog vibe with the verdict's wording laid over it.
    pub fn into_patch(self) -> Result<VibePatch, ClassifierError> {
        let preset = PresetId::ALL
            .into_iter()
            .find(|preset| preset.label() == self.vibe)
            .ok_or_else(|| ClassifierError::UnknownVibe(self.vibe.clone()))?;

        let mut patch = VibePatch::from(preset.vibe());
        if let Some(message) = self.message {
            patch.message = Some(message);
        }
        if let Some(stress) = self.stress_level {
            patch.stress_level = Some(clamp_stress_level(stress));
        }
        if let Some(ritual) = self.suggested_ritual {
            patch.suggested_ritual = Some(ritual);
        }
        Ok(patch)
    }
}

/// Pulls the outermost `{...}` out of a free-form model reply and reads it
/// as a [`Verdict`].
pub fn parse_verdict(reply: &str) -> Result<Verdict, ClassifierError> {
    let start = reply.find('{').ok_or(ClassifierError::NoJson)?;
    let end = reply.rfind('}').ok_or(ClassifierError::NoJson)?;
    if end < start {
        return Err(ClassifierError::NoJson);
    }
    Ok(serde_json::from_str(&reply[start..=end])?)
}

/// Remote attempt first (once, no retry), keyword fallback on any failure.
pub async fn resolve_mood(remote: Option<&dyn MoodClassifier>, text: &str) -> VibePatch {
    if let Some(classifier) = remote {
        match classifier.classify(text).await {
            Ok(patch) => return patch,
            Err(err) => log::warn!("mood classifier failed, using keywords: {}", err),
        }
    }
    KeywordClassifier.patch_for(text)
}
