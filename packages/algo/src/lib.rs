//! # reframe-algo - exercise personalization core
//!
//! Pure Rust building blocks for choosing the next therapeutic exercise or
//! intervention for a user:
//!
//! - **Category encoding** - free-text labels to fixed scalars in [0, 1]
//! - **State profiles** - ordered feature slots producing a [`StateVector`]
//! - **Decision policy** - pretrained Q-network, greedy argmax
//! - **Fallback selection** - uniform choice when no policy is available
//! - **Reward composition** - task score and user rating into one scalar
//!
//! ## Module layout
//!
//! - [`category`] - label normalization and category maps
//! - [`state`] - raw inputs, profiles and state vectors
//! - [`catalog`] - exercise and intervention catalogs
//! - [`policy`] - [`DecisionPolicy`] trait and the Q-network export format
//! - [`selector`] - policy-or-fallback action resolution
//! - [`reward`] - reward composition
//! - [`history`] - engagement/success signals from past sessions
//! - [`sanitize`] - numeric hygiene
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use reframe_algo::{
//!     resolve_action, ActionCatalog, ContextFields, ExerciseContext, FallbackSampler,
//!     StateProfile,
//! };
//!
//! let profile = StateProfile::exercise();
//! let catalog = ActionCatalog::exercises();
//! let ctx = ExerciseContext {
//!     distortion: Some("Catastrophizing".into()),
//!     emotion: Some("Anxious".into()),
//!     engagement: 1.0.into(),
//!     success: 0.5.into(),
//!     domain: Some("Stress".into()),
//! };
//! let state = profile.encode(&ContextFields::from(&ctx));
//! let mut sampler = FallbackSampler::with_seed(1);
//! let resolved = resolve_action(None, &catalog, &state, &mut sampler).unwrap();
//! assert!(catalog.get(resolved.index).is_ok());
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod catalog;
pub mod category;
pub mod error;
pub mod history;
pub mod policy;
pub mod reward;
pub mod sanitize;
pub mod selector;
pub mod state;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

pub use types::*;

pub use catalog::{ActionCatalog, EXERCISES, INTERVENTIONS};
pub use category::{encode, normalize_label, CategoryMap};
pub use error::AlgoError;
pub use history::HistorySignals;
pub use policy::{argmax, load_policy, DecisionPolicy, DenseLayer, QNetworkPolicy};
pub use reward::{compose_reward, normalize_rating, RewardWeights};
pub use sanitize::{clamp_unit, is_valid_reward, sanitize_state};
pub use selector::{resolve_action, FallbackSampler};
pub use state::{
    ContextFields, ExerciseContext, FeatureSlot, InterventionContext, RawScalar, SlotKind,
    StateProfile, StateVector, SLOT_CONTEXT, SLOT_DISTORTION, SLOT_DOMAIN, SLOT_EMOTION,
    SLOT_ENGAGEMENT, SLOT_INTENSITY, SLOT_SUCCESS,
};
