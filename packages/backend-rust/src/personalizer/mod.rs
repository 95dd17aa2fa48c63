mod pending;

pub use pending::{PendingExperience, PendingStore};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use reframe_algo::{
    is_valid_reward, load_policy, propensity, resolve_action, ActionCatalog, ContextFields,
    DecisionPolicy, ExerciseContext, FallbackSampler, InterventionContext, SelectionMode,
    StateProfile, StateVector,
};

use crate::error::ServiceError;
use crate::experience::{Experience, ExperienceSink};

pub const EXERCISE_PERSONALIZER: &str = "exercise";
pub const INTERVENTION_PERSONALIZER: &str = "intervention";

#[derive(Debug, Clone)]
pub struct PersonalizerOptions {
    pub pending_ttl: Duration,
    pub max_pending: usize,
    pub fallback_seed: Option<u64>,
}

impl Default for PersonalizerOptions {
    fn default() -> Self {
        Self {
            pending_ttl: Duration::from_secs(30 * 60),
            max_pending: 10_000,
            fallback_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub session_id: String,
    pub personalizer: String,
    pub action: String,
    pub action_index: usize,
    pub mode: SelectionMode,
    pub state: StateVector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackOutcome {
    Recorded { experience: Experience },
    NoPending,
    Rejected { reason: String },
}

impl FeedbackOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// One personalizer: a state profile, an action catalog and an optional
/// pretrained policy, with per-session pending experiences.
pub struct Personalizer {
    name: String,
    profile: StateProfile,
    catalog: ActionCatalog,
    policy: Option<Arc<dyn DecisionPolicy>>,
    sampler: Mutex<FallbackSampler>,
    pending: PendingStore,
    sink: Arc<dyn ExperienceSink>,
}

impl Personalizer {
    pub fn new(
        name: impl Into<String>,
        profile: StateProfile,
        catalog: ActionCatalog,
        policy: Option<Arc<dyn DecisionPolicy>>,
        sink: Arc<dyn ExperienceSink>,
        options: PersonalizerOptions,
    ) -> Result<Self, ServiceError> {
        let name = name.into();
        if let Some(policy) = &policy {
            if policy.state_dim() != profile.len() {
                return Err(ServiceError::CatalogMismatch {
                    personalizer: name,
                    detail: format!(
                        "policy expects {} state features, profile {} encodes {}",
                        policy.state_dim(),
                        profile.name(),
                        profile.len()
                    ),
                });
            }
            if policy.action_count() != catalog.len() {
                return Err(ServiceError::CatalogMismatch {
                    personalizer: name,
                    detail: format!(
                        "policy scores {} actions, catalog has {}",
                        policy.action_count(),
                        catalog.len()
                    ),
                });
            }
        }

        Ok(Self {
            name,
            profile,
            catalog,
            policy,
            sampler: Mutex::new(FallbackSampler::new(options.fallback_seed)),
            pending: PendingStore::new(options.pending_ttl, options.max_pending),
            sink,
        })
    }

    /// Load the policy from `path`; a missing or unreadable file leaves the
    /// personalizer in fallback mode.
    pub fn load(
        name: impl Into<String>,
        profile: StateProfile,
        catalog: ActionCatalog,
        path: &Path,
        sink: Arc<dyn ExperienceSink>,
        options: PersonalizerOptions,
    ) -> Result<Self, ServiceError> {
        let name = name.into();
        let policy: Option<Arc<dyn DecisionPolicy>> = match load_policy(path) {
            Ok(policy) => {
                info!(
                    personalizer = %name,
                    path = %path.display(),
                    layers = policy.layer_count(),
                    "Policy loaded"
                );
                Some(Arc::new(policy))
            }
            Err(e) => {
                warn!(
                    personalizer = %name,
                    path = %path.display(),
                    error = %e,
                    "Policy unavailable, using random fallback"
                );
                None
            }
        };
        Self::new(name, profile, catalog, policy, sink, options)
    }

    pub fn exercise(
        path: &Path,
        sink: Arc<dyn ExperienceSink>,
        options: PersonalizerOptions,
    ) -> Result<Self, ServiceError> {
        Self::load(
            EXERCISE_PERSONALIZER,
            StateProfile::exercise(),
            ActionCatalog::exercises(),
            path,
            sink,
            options,
        )
    }

    pub fn intervention(
        path: &Path,
        sink: Arc<dyn ExperienceSink>,
        options: PersonalizerOptions,
    ) -> Result<Self, ServiceError> {
        Self::load(
            INTERVENTION_PERSONALIZER,
            StateProfile::intervention(),
            ActionCatalog::interventions(),
            path,
            sink,
            options,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn profile(&self) -> &StateProfile {
        &self.profile
    }

    pub fn is_degraded(&self) -> bool {
        self.policy.is_none()
    }

    pub async fn select(
        &self,
        session_id: &str,
        fields: &ContextFields,
    ) -> Result<Selection, ServiceError> {
        let state = self.profile.encode(fields);
        let resolved = {
            let mut sampler = self.sampler.lock();
            resolve_action(self.policy.as_deref(), &self.catalog, &state, &mut *sampler)?
        };
        let action = self.catalog.get(resolved.index)?.to_string();

        let replaced = self
            .pending
            .insert(
                session_id,
                PendingExperience {
                    state: state.clone(),
                    action_index: resolved.index,
                    mode: resolved.mode,
                    selected_at: Utc::now(),
                },
            )
            .await;
        if replaced.is_some() {
            debug!(
                personalizer = %self.name,
                session_id,
                "Replaced pending experience without feedback"
            );
        }

        debug!(
            personalizer = %self.name,
            session_id,
            action = %action,
            mode = resolved.mode.as_str(),
            "Action selected"
        );

        Ok(Selection {
            session_id: session_id.to_string(),
            personalizer: self.name.clone(),
            action,
            action_index: resolved.index,
            mode: resolved.mode,
            state,
        })
    }

    pub async fn select_exercise(
        &self,
        session_id: &str,
        context: &ExerciseContext,
    ) -> Result<Selection, ServiceError> {
        self.select(session_id, &ContextFields::from(context)).await
    }

    pub async fn select_intervention(
        &self,
        session_id: &str,
        context: &InterventionContext,
    ) -> Result<Selection, ServiceError> {
        self.select(session_id, &ContextFields::from(context)).await
    }

    /// Attach `reward` to the session's pending selection and hand the
    /// experience to the sink. The pending slot is consumed.
    pub async fn update_from_feedback(
        &self,
        session_id: &str,
        reward: f64,
    ) -> Result<FeedbackOutcome, ServiceError> {
        if !is_valid_reward(reward) {
            warn!(
                personalizer = %self.name,
                session_id,
                reward,
                "Rejected non-finite reward"
            );
            return Ok(FeedbackOutcome::Rejected {
                reason: format!("reward must be finite, got {reward}"),
            });
        }

        let now = Utc::now();
        let Some(pending) = self.pending.take(session_id, now).await else {
            debug!(
                personalizer = %self.name,
                session_id,
                "No pending experience for feedback"
            );
            return Ok(FeedbackOutcome::NoPending);
        };

        let experience = Experience {
            session_id: session_id.to_string(),
            personalizer: self.name.clone(),
            state: pending.state.clone(),
            action_index: pending.action_index,
            action: self.catalog.get(pending.action_index)?.to_string(),
            reward,
            mode: pending.mode,
            propensity: propensity(pending.mode, self.catalog.len()),
            selected_at: pending.selected_at,
            recorded_at: now,
        };

        if let Err(e) = self.sink.record(&experience).await {
            self.pending.restore(session_id, pending).await;
            return Err(e);
        }

        Ok(FeedbackOutcome::Recorded { experience })
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.len().await
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let purged = self.pending.purge_expired(now).await;
        if purged > 0 {
            debug!(personalizer = %self.name, purged, "Purged expired pending experiences");
        }
        purged
    }
}
