//! Category Encoder
//!
//! Maps free-text category labels (distortion, emotion, domain, intensity,
//! context) onto fixed scalars in [0, 1].
//!
//! Lookups are normalized: surrounding whitespace is trimmed and the label is
//! title-cased, so `" stress "`, `"STRESS"` and `"Stress"` all resolve to the
//! same entry. Keys are canonicalized with the same rule when the map is built.
//! Anything that does not resolve encodes as [`NEUTRAL_VALUE`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AlgoError;
use crate::types::NEUTRAL_VALUE;

// ==================== Built-in Maps ====================

pub const DISTORTION_LABELS: [(&str, f64); 10] = [
    ("All-or-Nothing Thinking", 0.0),
    ("Catastrophizing", 0.1),
    ("Overgeneralization", 0.2),
    ("Mind Reading", 0.3),
    ("Emotional Reasoning", 0.4),
    ("Labeling", 0.5),
    ("Personalization", 0.6),
    ("Mental Filtering", 0.7),
    ("Should Statements", 0.8),
    ("Fortune Telling", 0.9),
];

pub const EMOTION_LABELS: [(&str, f64); 10] = [
    ("Happy", 0.0),
    ("Sad", 0.1),
    ("Angry", 0.2),
    ("Anxious", 0.3),
    ("Fearful", 0.4),
    ("Stressed", 0.5),
    ("Calm", 0.6),
    ("Lonely", 0.7),
    ("Frustrated", 0.8),
    ("Hopeful", 0.9),
];

pub const DOMAIN_LABELS: [(&str, f64); 5] = [
    ("Depression", 0.0),
    ("Anxiety", 0.2),
    ("Self-Esteem", 0.4),
    ("Stress Management", 0.6),
    ("Social Skills", 0.8),
];

pub const INTERVENTION_EMOTION_LABELS: [(&str, f64); 5] = [
    ("anxiety", 0.1),
    ("sadness", 0.3),
    ("anger", 0.6),
    ("stress", 0.8),
    ("neutral", 0.5),
];

pub const INTENSITY_LABELS: [(&str, f64); 3] = [("low", 0.2), ("medium", 0.5), ("high", 0.9)];

pub const CONTEXT_LABELS: [(&str, f64); 4] = [
    ("work", 0.2),
    ("relationships", 0.5),
    ("health", 0.8),
    ("self", 0.4),
];

/// Trim and title-case a label.
///
/// Every alphabetic run starts with an uppercase letter and continues in
/// lowercase; any non-letter character starts a new run.
pub fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_word = false;
    for ch in label.trim().chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Immutable label -> scalar map for one feature dimension
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "CategoryMapRepr")]
pub struct CategoryMap {
    name: String,
    entries: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct CategoryMapRepr {
    name: String,
    entries: HashMap<String, f64>,
}

impl TryFrom<CategoryMapRepr> for CategoryMap {
    type Error = AlgoError;

    fn try_from(repr: CategoryMapRepr) -> Result<Self, Self::Error> {
        Self::new(
            repr.name,
            repr.entries.iter().map(|(label, value)| (label.as_str(), *value)),
        )
    }
}

impl CategoryMap {
    /// Build a validated map. Values must lie in [0, 1] and labels must stay
    /// unique after normalization.
    pub fn new<'a>(
        name: impl Into<String>,
        labels: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<Self, AlgoError> {
        let mut entries = HashMap::new();
        for (label, value) in labels {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AlgoError::InvalidCategoryValue {
                    label: label.to_string(),
                    value,
                });
            }
            let key = normalize_label(label);
            if entries.insert(key.clone(), value).is_some() {
                return Err(AlgoError::Duplicate {
                    kind: "category",
                    label: key,
                });
            }
        }
        Ok(Self {
            name: name.into(),
            entries,
        })
    }

    fn builtin(name: &str, labels: &[(&str, f64)]) -> Self {
        let entries = labels
            .iter()
            .map(|(label, value)| (normalize_label(label), *value))
            .collect();
        Self {
            name: name.to_string(),
            entries,
        }
    }

    pub fn distortion() -> Self {
        Self::builtin("distortion", &DISTORTION_LABELS)
    }

    pub fn emotion() -> Self {
        Self::builtin("emotion", &EMOTION_LABELS)
    }

    pub fn domain() -> Self {
        Self::builtin("domain", &DOMAIN_LABELS)
    }

    pub fn intervention_emotion() -> Self {
        Self::builtin("emotion", &INTERVENTION_EMOTION_LABELS)
    }

    pub fn intensity() -> Self {
        Self::builtin("intensity", &INTENSITY_LABELS)
    }

    pub fn context() -> Self {
        Self::builtin("context", &CONTEXT_LABELS)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup after normalization, `None` when unknown
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries.get(&normalize_label(label)).copied()
    }

    /// Encode a possibly missing label. Never fails.
    pub fn encode(&self, label: Option<&str>) -> f64 {
        match label {
            Some(raw) if !raw.trim().is_empty() => self.get(raw).unwrap_or(NEUTRAL_VALUE),
            _ => NEUTRAL_VALUE,
        }
    }

    /// Canonical labels, sorted by encoded value
    pub fn labels(&self) -> Vec<&str> {
        let mut pairs: Vec<(&str, f64)> = self
            .entries
            .iter()
            .map(|(label, value)| (label.as_str(), *value))
            .collect();
        pairs.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        pairs.into_iter().map(|(label, _)| label).collect()
    }
}

/// Free-function form of [`CategoryMap::encode`]
pub fn encode(category: Option<&str>, map: &CategoryMap) -> f64 {
    map.encode(category)
}
