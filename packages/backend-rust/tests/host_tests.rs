//! Tests for the JSON-lines command loop.

mod common;

use serde_json::{json, Value};

use reframe_algo::{EXERCISES, INTERVENTIONS};
use reframe_backend::host::{self, HostResponse};

use common::memory_state;

async fn run_script(lines: &[Value]) -> Vec<HostResponse> {
    let (state, _sink) = memory_state();
    let input: String = lines.iter().map(|line| format!("{line}\n")).collect();
    run_raw(&state, &input).await
}

async fn run_raw(state: &reframe_backend::AppState, input: &str) -> Vec<HostResponse> {
    let reader = tokio::io::BufReader::new(input.as_bytes());
    let mut output = Vec::new();
    host::run(state, reader, &mut output, std::future::pending())
        .await
        .unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn select_then_feedback_round() {
    let responses = run_script(&[
        json!({
            "id": 1,
            "command": "select_exercise",
            "session_id": "abc",
            "context": {
                "distortion": "Catastrophizing",
                "emotion": "Anxious",
                "engagement": 1,
                "success": "0.5",
                "domain": "Stress"
            }
        }),
        json!({
            "id": 2,
            "command": "feedback",
            "personalizer": "exercise",
            "session_id": "abc",
            "score": 0.8
        }),
        json!({ "id": 3, "command": "feedback", "session_id": "abc", "reward": 0.5 }),
    ])
    .await;

    assert_eq!(responses.len(), 3);

    let selection = responses[0].result.as_ref().unwrap();
    assert!(responses[0].ok);
    assert_eq!(responses[0].id, Some(json!(1)));
    assert_eq!(selection["sessionId"], "abc");
    assert_eq!(selection["mode"], "fallback");
    assert_eq!(selection["state"], json!([0.1, 0.3, 1.0, 0.5, 0.5]));
    let action = selection["action"].as_str().unwrap();
    assert!(EXERCISES.contains(&action));

    let recorded = responses[1].result.as_ref().unwrap();
    assert_eq!(recorded["status"], "recorded");
    assert_eq!(recorded["experience"]["action"], action);
    let reward = recorded["experience"]["reward"].as_f64().unwrap();
    assert!((reward - 0.71).abs() < 1e-12);

    assert_eq!(responses[2].result.as_ref().unwrap()["status"], "no_pending");
}

#[tokio::test]
async fn intervention_selection_generates_session_id() {
    let responses = run_script(&[json!({
        "command": "select_intervention",
        "context": { "emotion": "anger", "intensity": "low" }
    })])
    .await;

    let selection = responses[0].result.as_ref().unwrap();
    assert!(INTERVENTIONS.contains(&selection["action"].as_str().unwrap()));
    assert!(!selection["sessionId"].as_str().unwrap().is_empty());
    assert_eq!(selection["personalizer"], "intervention");
}

#[tokio::test]
async fn wrong_typed_context_fields_still_select() {
    let responses = run_script(&[
        json!({
            "command": "select_exercise",
            "session_id": "typed",
            "context": { "emotion": 3, "engagement": true, "success": 0.5 }
        }),
        json!({
            "command": "select_intervention",
            "context": { "emotion": ["anger"], "intensity": "high", "success": {"v": 1} }
        }),
    ])
    .await;

    assert!(responses[0].ok, "{:?}", responses[0].error);
    let selection = responses[0].result.as_ref().unwrap();
    assert!(EXERCISES.contains(&selection["action"].as_str().unwrap()));
    assert_eq!(selection["state"], json!([0.5, 0.5, 0.5, 0.5, 0.5]));

    assert!(responses[1].ok, "{:?}", responses[1].error);
    let selection = responses[1].result.as_ref().unwrap();
    assert!(INTERVENTIONS.contains(&selection["action"].as_str().unwrap()));
    assert_eq!(selection["state"], json!([0.5, 0.9, 0.5, 0.5, 0.5]));
}

#[tokio::test]
async fn compose_reward_command() {
    let responses = run_script(&[
        json!({ "command": "compose_reward", "score": 1.0, "rating": 5 }),
        json!({ "command": "compose_reward", "score": 0.0, "rating": 1 }),
    ])
    .await;
    assert_eq!(responses[0].result.as_ref().unwrap()["reward"], json!(1.0));
    assert_eq!(responses[1].result.as_ref().unwrap()["reward"], json!(0.0));
}

#[tokio::test]
async fn status_reports_both_personalizers() {
    let responses = run_script(&[json!({ "command": "status" })]).await;
    let status = responses[0].result.as_ref().unwrap();
    assert_eq!(status["sink"], "memory");
    assert_eq!(status["personalizers"][0]["name"], "exercise");
    assert_eq!(status["personalizers"][0]["degraded"], true);
    assert_eq!(status["personalizers"][1]["catalogSize"], 5);
}

#[tokio::test]
async fn bad_lines_do_not_stop_the_loop() {
    let (state, _sink) = memory_state();
    let input = concat!(
        "this is not json\n",
        "\n",
        "{\"command\":\"launch_rockets\",\"id\":\"x\"}\n",
        "{\"command\":\"feedback\",\"session_id\":\"s\"}\n",
        "{\"command\":\"feedback\",\"personalizer\":\"other\",\"session_id\":\"s\",\"reward\":1}\n",
        "{\"command\":\"status\"}\n",
    );
    let responses = run_raw(&state, input).await;

    assert_eq!(responses.len(), 5);
    assert!(!responses[0].ok);
    assert!(!responses[1].ok);
    assert_eq!(responses[1].id, Some(json!("x")));
    assert!(responses[2].error.as_ref().unwrap().contains("reward or score"));
    assert!(responses[3].error.as_ref().unwrap().contains("unknown personalizer"));
    assert!(responses[4].ok);
}

#[tokio::test]
async fn shutdown_future_stops_the_loop() {
    let (state, _sink) = memory_state();
    let (_tx, rx) = tokio::io::duplex(64);
    let reader = tokio::io::BufReader::new(rx);
    let mut output = Vec::new();
    host::run(&state, reader, &mut output, async {})
        .await
        .unwrap();
    assert!(output.is_empty());
}
