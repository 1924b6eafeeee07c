/*!
Test harness around the stub backend.

- waits for a path to be hit N times
- asserts on the JSON body of the last request to a path
- verifies per-path hit expectations in one call
*/

use crate::stub_backend::{RecordedRequest, StubBackend};
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub struct TestHarness {
    pub backend: StubBackend,
    expectations: Vec<Expectation>,
}

#[derive(Debug)]
struct Expectation {
    path: String,
    expected_count: usize,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        env_logger::builder().is_test(true).try_init().ok();

        Ok(Self {
            backend: StubBackend::start().await?,
            expectations: Vec::new(),
        })
    }

    pub fn base_url(&self) -> String {
        self.backend.base_url()
    }

    /// Expect exactly `count` requests to `path` by the time of `verify_expectations`
    pub fn expect_hits(&mut self, path: &str, count: usize) -> &mut Self {
        self.expectations.push(Expectation {
            path: path.to_string(),
            expected_count: count,
        });
        self
    }

    /// Poll until `path` has seen at least `count` requests
    pub async fn wait_for_hits(&self, path: &str, count: usize, timeout: Duration) -> bool {
        let start = std::time::Instant::now();

        while start.elapsed() < timeout {
            if self.backend.hits(path) >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        log::warn!("Timeout waiting for {} hits on {}", count, path);
        false
    }

    pub fn verify_expectations(&self) -> Result<()> {
        for expectation in &self.expectations {
            let actual = self.backend.hits(&expectation.path);
            if actual != expectation.expected_count {
                anyhow::bail!(
                    "Expectation failed for '{}': expected {} requests, got {}",
                    expectation.path,
                    expectation.expected_count,
                    actual
                );
            }
        }
        Ok(())
    }

    pub fn assert_no_requests_to(&self, path: &str) -> Result<()> {
        match self.backend.hits(path) {
            0 => Ok(()),
            n => anyhow::bail!("Expected no requests to '{}', got {}", path, n),
        }
    }

    pub fn last_body(&self, path: &str) -> Result<Value> {
        let request = self.last_request(path)?;
        request
            .json()
            .ok_or_else(|| anyhow::anyhow!("Last request to '{}' has no JSON body", path))
    }

    pub fn last_request(&self, path: &str) -> Result<RecordedRequest> {
        self.backend
            .last_request_to(path)
            .ok_or_else(|| anyhow::anyhow!("No request reached '{}'", path))
    }

    /// Dotted lookup into the last JSON body sent to `path`
    pub fn assert_field_equals(&self, path: &str, field_path: &str, expected: &Value) -> Result<()> {
        let body = self.last_body(path)?;
        match nested_field(&body, field_path) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => anyhow::bail!(
                "Field '{}' mismatch: expected {:?}, got {:?}",
                field_path,
                expected,
                actual
            ),
            None => anyhow::bail!("Field '{}' not found in last body to {}", field_path, path),
        }
    }

    /// Keys of the last JSON body sent to `path`, sorted
    pub fn body_keys(&self, path: &str) -> Result<Vec<String>> {
        match self.last_body(path)? {
            Value::Object(map) => {
                let mut keys: Vec<String> = map.keys().cloned().collect();
                keys.sort();
                Ok(keys)
            }
            other => anyhow::bail!("Last body to '{}' is not an object: {}", path, other),
        }
    }

    pub fn hit_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for request in self.backend.requests() {
            *counts.entry(request.path).or_insert(0) += 1;
        }
        counts
    }
}

fn nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, part| match current {
        Value::Object(obj) => obj.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    #[test]
    fn nested_lookup_walks_objects_and_arrays() {
        let body = json!({"a": {"b": [1, {"c": "x"}]}});
        assert_eq!(nested_field(&body, "a.b.1.c"), Some(&json!("x")));
        assert_eq!(nested_field(&body, "a.z"), None);
    }

    #[tokio::test]
    async fn expectations_count_hits_per_path() {
        let mut harness = TestHarness::new().await.unwrap();
        harness
            .backend
            .respond_json(Method::POST, "update-plant/", json!({"status": "success"}));

        let client = reqwest::Client::new();
        client
            .post(format!("{}update-plant/", harness.base_url()))
            .json(&json!({"_id": "abc"}))
            .send()
            .await
            .unwrap();

        harness.expect_hits("update-plant/", 1).expect_hits("admins/", 0);
        harness.verify_expectations().unwrap();
        harness
            .assert_field_equals("update-plant/", "_id", &json!("abc"))
            .unwrap();
        assert_eq!(harness.body_keys("update-plant/").unwrap(), vec!["_id"]);
        assert_eq!(harness.hit_counts().get("update-plant/"), Some(&1));
    }
}
