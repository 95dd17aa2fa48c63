//! State Encoding
//!
//! Turns the raw categorical and numeric fields a caller supplies into a
//! fixed-order [`StateVector`] for the decision policy.
//!
//! Rules:
//! - categorical slots go through their [`CategoryMap`] (unknown -> 0.5)
//! - scalar slots are parsed as floats; if any scalar slot fails to parse,
//!   every scalar slot falls back to 0.5 so the joint state stays neutral
//! - every component is clamped to [0, 1]

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::category::CategoryMap;
use crate::error::AlgoError;
use crate::sanitize::{clamp_unit, sanitize_state};
use crate::types::NEUTRAL_VALUE;

pub const SLOT_DISTORTION: &str = "distortion";
pub const SLOT_EMOTION: &str = "emotion";
pub const SLOT_DOMAIN: &str = "domain";
pub const SLOT_INTENSITY: &str = "intensity";
pub const SLOT_CONTEXT: &str = "context";
pub const SLOT_ENGAGEMENT: &str = "engagement";
pub const SLOT_SUCCESS: &str = "success";

// ==================== Raw Inputs ====================

/// A numeric field as received from a caller: a number, a numeric string,
/// nothing at all, or something of the wrong JSON type.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawScalar {
    Number(f64),
    Text(String),
    #[default]
    Missing,
    /// Booleans, arrays, objects; never parses
    Invalid,
}

impl<'de> Deserialize<'de> for RawScalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Invalid),
            Value::String(s) => Self::Text(s),
            Value::Null => Self::Missing,
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => Self::Invalid,
        })
    }
}

/// Category labels arrive as free text; anything that is not a string is
/// treated as absent.
fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl RawScalar {
    /// Cast to a finite float
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Missing | Self::Invalid => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawScalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RawScalar {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for RawScalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawScalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<f64>> for RawScalar {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::Number).unwrap_or(Self::Missing)
    }
}

/// Named raw fields for one selection request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextFields {
    #[serde(default)]
    categories: HashMap<String, String>,
    #[serde(default)]
    scalars: HashMap<String, RawScalar>,
}

impl ContextFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, slot: &str, label: Option<impl Into<String>>) -> Self {
        if let Some(label) = label {
            self.categories.insert(slot.to_string(), label.into());
        }
        self
    }

    pub fn scalar(mut self, slot: &str, value: impl Into<RawScalar>) -> Self {
        self.scalars.insert(slot.to_string(), value.into());
        self
    }

    pub fn category_of(&self, slot: &str) -> Option<&str> {
        self.categories.get(slot).map(String::as_str)
    }

    pub fn scalar_of(&self, slot: &str) -> Option<&RawScalar> {
        self.scalars.get(slot)
    }
}

/// Fields of an exercise selection request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseContext {
    #[serde(deserialize_with = "lenient_label")]
    pub distortion: Option<String>,
    #[serde(deserialize_with = "lenient_label")]
    pub emotion: Option<String>,
    pub engagement: RawScalar,
    pub success: RawScalar,
    #[serde(deserialize_with = "lenient_label")]
    pub domain: Option<String>,
}

impl From<&ExerciseContext> for ContextFields {
    fn from(ctx: &ExerciseContext) -> Self {
        ContextFields::new()
            .category(SLOT_DISTORTION, ctx.distortion.clone())
            .category(SLOT_EMOTION, ctx.emotion.clone())
            .scalar(SLOT_ENGAGEMENT, ctx.engagement.clone())
            .scalar(SLOT_SUCCESS, ctx.success.clone())
            .category(SLOT_DOMAIN, ctx.domain.clone())
    }
}

/// Fields of an emotion intervention request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionContext {
    #[serde(deserialize_with = "lenient_label")]
    pub emotion: Option<String>,
    #[serde(deserialize_with = "lenient_label")]
    pub intensity: Option<String>,
    #[serde(deserialize_with = "lenient_label")]
    pub context: Option<String>,
    pub engagement: RawScalar,
    pub success: RawScalar,
}

impl From<&InterventionContext> for ContextFields {
    fn from(ctx: &InterventionContext) -> Self {
        ContextFields::new()
            .category(SLOT_EMOTION, ctx.emotion.clone())
            .category(SLOT_INTENSITY, ctx.intensity.clone())
            .category(SLOT_CONTEXT, ctx.context.clone())
            .scalar(SLOT_ENGAGEMENT, ctx.engagement.clone())
            .scalar(SLOT_SUCCESS, ctx.success.clone())
    }
}

// ==================== State Vector ====================

/// Fixed-length policy input with every component in [0, 1]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector(Vec<f64>);

impl StateVector {
    pub fn new(mut values: Vec<f64>) -> Self {
        sanitize_state(&mut values);
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }
}

// ==================== Profiles ====================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotKind {
    Categorical { map: CategoryMap },
    Scalar,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureSlot {
    pub name: String,
    pub kind: SlotKind,
}

impl FeatureSlot {
    pub fn categorical(name: &str, map: CategoryMap) -> Self {
        Self {
            name: name.to_string(),
            kind: SlotKind::Categorical { map },
        }
    }

    pub fn scalar(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SlotKind::Scalar,
        }
    }
}

/// Ordered feature slots of one deployment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateProfile {
    name: String,
    slots: Vec<FeatureSlot>,
}

impl StateProfile {
    pub fn new(name: impl Into<String>, slots: Vec<FeatureSlot>) -> Result<Self, AlgoError> {
        let mut seen = std::collections::HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.name.as_str()) {
                return Err(AlgoError::Duplicate {
                    kind: "slot",
                    label: slot.name.clone(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            slots,
        })
    }

    /// `[distortion, emotion, engagement, success, domain]`
    pub fn exercise() -> Self {
        Self {
            name: "exercise".to_string(),
            slots: vec![
                FeatureSlot::categorical(SLOT_DISTORTION, CategoryMap::distortion()),
                FeatureSlot::categorical(SLOT_EMOTION, CategoryMap::emotion()),
                FeatureSlot::scalar(SLOT_ENGAGEMENT),
                FeatureSlot::scalar(SLOT_SUCCESS),
                FeatureSlot::categorical(SLOT_DOMAIN, CategoryMap::domain()),
            ],
        }
    }

    /// `[emotion, intensity, context, engagement, success]`
    pub fn intervention() -> Self {
        Self {
            name: "intervention".to_string(),
            slots: vec![
                FeatureSlot::categorical(SLOT_EMOTION, CategoryMap::intervention_emotion()),
                FeatureSlot::categorical(SLOT_INTENSITY, CategoryMap::intensity()),
                FeatureSlot::categorical(SLOT_CONTEXT, CategoryMap::context()),
                FeatureSlot::scalar(SLOT_ENGAGEMENT),
                FeatureSlot::scalar(SLOT_SUCCESS),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn encode(&self, fields: &ContextFields) -> StateVector {
        let parsed: Vec<Option<f64>> = self
            .slots
            .iter()
            .filter(|slot| matches!(slot.kind, SlotKind::Scalar))
            .map(|slot| fields.scalar_of(&slot.name).and_then(RawScalar::parse))
            .collect();
        let scalars_ok = parsed.iter().all(Option::is_some);
        let mut scalar_values = parsed.into_iter();

        let values = self
            .slots
            .iter()
            .map(|slot| match &slot.kind {
                SlotKind::Categorical { map } => map.encode(fields.category_of(&slot.name)),
                SlotKind::Scalar => {
                    let value = scalar_values.next().flatten();
                    match value {
                        Some(v) if scalars_ok => clamp_unit(v),
                        _ => NEUTRAL_VALUE,
                    }
                }
            })
            .collect();

        StateVector::new(values)
    }
}
