use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

use super::TestResponse;

pub fn assert_status(response: &TestResponse, expected: StatusCode, context: &str) {
    assert_eq!(
        response.status, expected,
        "{context}: unexpected status, body = {}",
        response.body
    );
}

/// Asserts the uniform error envelope and returns its message.
pub fn assert_error(response: &TestResponse, expected: StatusCode) -> String {
    assert_status(response, expected, "error response");
    assert_eq!(response.body["success"], Value::Bool(false));
    response.body["error"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// `data` of a list envelope, after checking `count` agrees with it.
pub fn list_data(response: &TestResponse) -> anyhow::Result<&Vec<Value>> {
    assert_eq!(response.body["success"], Value::Bool(true));
    let data = response.body["data"]
        .as_array()
        .context("list envelope has a data array")?;
    assert_eq!(response.body["count"].as_u64(), Some(data.len() as u64));
    Ok(data)
}

pub fn total(response: &TestResponse) -> u64 {
    response.body["total"].as_u64().unwrap_or_default()
}

pub fn titles(response: &TestResponse) -> anyhow::Result<Vec<String>> {
    Ok(list_data(response)?
        .iter()
        .filter_map(|p| p["title"].as_str().map(str::to_string))
        .collect())
}
