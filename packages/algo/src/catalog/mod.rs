//! Action Catalogs
//!
//! The ordered set of exercises or interventions a policy can recommend.
//! A policy's output is an index into this list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AlgoError;

pub const EXERCISES: [&str; 10] = [
    "Thought Record",
    "Socratic Questioning",
    "Behavioral Activation Plan",
    "Positive Data Log",
    "ABC Diary",
    "Cognitive Restructuring",
    "Mindfulness Reflection",
    "Gratitude Journal",
    "Exposure Hierarchy",
    "Behavioral Experiment",
];

pub const INTERVENTIONS: [&str; 5] = [
    "Guided Breathing",
    "Grounding Technique",
    "Positive Affirmation",
    "Mindful Reflection",
    "Gratitude Prompt",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogRepr")]
pub struct ActionCatalog {
    actions: Vec<String>,
}

#[derive(Deserialize)]
struct CatalogRepr {
    actions: Vec<String>,
}

impl TryFrom<CatalogRepr> for ActionCatalog {
    type Error = AlgoError;

    fn try_from(repr: CatalogRepr) -> Result<Self, Self::Error> {
        Self::new(repr.actions)
    }
}

impl ActionCatalog {
    pub fn new<S: Into<String>>(actions: impl IntoIterator<Item = S>) -> Result<Self, AlgoError> {
        let actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        if actions.is_empty() {
            return Err(AlgoError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for action in &actions {
            if !seen.insert(action.as_str()) {
                return Err(AlgoError::Duplicate {
                    kind: "action",
                    label: action.clone(),
                });
            }
        }
        Ok(Self { actions })
    }

    pub fn exercises() -> Self {
        Self {
            actions: EXERCISES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn interventions() -> Self {
        Self {
            actions: INTERVENTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&str, AlgoError> {
        self.actions
            .get(index)
            .map(String::as_str)
            .ok_or(AlgoError::ActionOutOfRange {
                index,
                len: self.actions.len(),
            })
    }

    pub fn index_of(&self, action: &str) -> Option<usize> {
        self.actions.iter().position(|a| a == action)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.index_of(action).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogs_have_expected_sizes() {
        assert_eq!(ActionCatalog::exercises().len(), 10);
        assert_eq!(ActionCatalog::interventions().len(), 5);
    }

    #[test]
    fn get_returns_label_in_order() {
        let catalog = ActionCatalog::exercises();
        assert_eq!(catalog.get(0).unwrap(), "Thought Record");
        assert_eq!(catalog.get(9).unwrap(), "Behavioral Experiment");
    }

    #[test]
    fn get_out_of_range_is_error() {
        let catalog = ActionCatalog::interventions();
        let err = catalog.get(5).unwrap_err();
        assert!(matches!(err, AlgoError::ActionOutOfRange { index: 5, len: 5 }));
    }

    #[test]
    fn new_rejects_empty_and_duplicates() {
        assert!(matches!(
            ActionCatalog::new(Vec::<String>::new()),
            Err(AlgoError::EmptyCatalog)
        ));
        assert!(matches!(
            ActionCatalog::new(["A", "B", "A"]),
            Err(AlgoError::Duplicate { .. })
        ));
    }

    #[test]
    fn index_of_and_contains() {
        let catalog = ActionCatalog::new(["Walk", "Journal"]).unwrap();
        assert_eq!(catalog.index_of("Journal"), Some(1));
        assert!(catalog.contains("Walk"));
        assert!(!catalog.contains("Run"));
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["Walk", "Journal"]);
    }

    #[test]
    fn deserialize_validates_like_new() {
        let catalog: ActionCatalog =
            serde_json::from_str(r#"{"actions": ["Walk", "Journal"]}"#).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(serde_json::from_str::<ActionCatalog>(r#"{"actions": []}"#).is_err());
        assert!(serde_json::from_str::<ActionCatalog>(r#"{"actions": ["A", "A"]}"#).is_err());
    }
}
