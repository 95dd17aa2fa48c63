//! Newline-delimited JSON command loop.
//!
//! Each input line is one command object tagged by `command`; each command
//! produces exactly one response line. An optional `id` on the request is
//! echoed back. Bad lines get `{"ok": false, "error": ...}` and the loop
//! keeps going.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use reframe_algo::{compose_reward, ExerciseContext, InterventionContext};

use crate::personalizer::EXERCISE_PERSONALIZER;
use crate::state::AppState;

fn default_personalizer() -> String {
    EXERCISE_PERSONALIZER.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostRequest {
    SelectExercise {
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        context: ExerciseContext,
    },
    SelectIntervention {
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        context: InterventionContext,
    },
    Feedback {
        #[serde(default = "default_personalizer")]
        personalizer: String,
        session_id: String,
        #[serde(default)]
        reward: Option<f64>,
        #[serde(default)]
        score: Option<f64>,
        #[serde(default)]
        rating: Option<f64>,
    },
    ComposeReward {
        score: f64,
        #[serde(default)]
        rating: Option<f64>,
    },
    Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, error: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Execute one already-parsed request
pub async fn dispatch(state: &AppState, request: HostRequest) -> Result<Value, String> {
    match request {
        HostRequest::SelectExercise {
            session_id,
            context,
        } => {
            let session_id = session_id.unwrap_or_else(new_session_id);
            let selection = state
                .exercise()
                .select_exercise(&session_id, &context)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(selection).map_err(|e| e.to_string())
        }
        HostRequest::SelectIntervention {
            session_id,
            context,
        } => {
            let session_id = session_id.unwrap_or_else(new_session_id);
            let selection = state
                .intervention()
                .select_intervention(&session_id, &context)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(selection).map_err(|e| e.to_string())
        }
        HostRequest::Feedback {
            personalizer,
            session_id,
            reward,
            score,
            rating,
        } => {
            let target = state
                .personalizer(&personalizer)
                .ok_or_else(|| format!("unknown personalizer: {personalizer}"))?;
            let reward = match (reward, score) {
                (Some(reward), _) => reward,
                (None, Some(score)) => compose_reward(score, rating),
                (None, None) => return Err("feedback needs either reward or score".to_string()),
            };
            let outcome = target
                .update_from_feedback(&session_id, reward)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(outcome).map_err(|e| e.to_string())
        }
        HostRequest::ComposeReward { score, rating } => {
            Ok(serde_json::json!({ "reward": compose_reward(score, rating) }))
        }
        HostRequest::Status => {
            serde_json::to_value(state.status().await).map_err(|e| e.to_string())
        }
    }
}

/// Parse and execute one input line. Blank lines produce no response.
pub async fn handle_line(state: &AppState, line: &str) -> Option<HostResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Malformed command line");
            return Some(HostResponse::failure(None, format!("invalid json: {e}")));
        }
    };

    let id = value.as_object_mut().and_then(|obj| obj.remove("id"));
    let request: HostRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unrecognized command");
            return Some(HostResponse::failure(id, format!("invalid command: {e}")));
        }
    };

    debug!(?request, "Dispatching command");
    Some(match dispatch(state, request).await {
        Ok(result) => HostResponse::success(id, result),
        Err(e) => HostResponse::failure(id, e),
    })
}

/// Serve commands until EOF on `reader` or until `shutdown` resolves
pub async fn run<R, W, F>(
    state: &AppState,
    reader: R,
    mut writer: W,
    shutdown: F,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received, closing command loop");
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            info!("Input closed, closing command loop");
            break;
        };

        if let Some(response) = handle_line(state, &line).await {
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }

    Ok(())
}
