//! In-process request metrics, surfaced on `GET /metrics`.

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
pub(crate) struct RequestMetrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub(crate) async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        latency_map
            .entry(route.to_string())
            .or_default()
            .push(latency.as_nanos() as u64);
    }

    pub(crate) async fn snapshot(&self) -> Value {
        let counts = self.counts.lock().await;
        let mut request_counts: Vec<Value> = counts
            .iter()
            .map(|((route, status), count)| {
                json!({"route": route, "status": status, "count": count})
            })
            .collect();
        drop(counts);
        request_counts.sort_by_key(|v| {
            (
                v["route"].as_str().unwrap_or_default().to_string(),
                v["status"].as_u64().unwrap_or_default(),
            )
        });

        let latency = self.latency_ns.lock().await;
        let mut latencies: Vec<Value> = latency
            .iter()
            .map(|(route, samples)| {
                let mut sorted = samples.clone();
                sorted.sort_unstable();
                let p50 = percentile_ns(&sorted, 0.50);
                let p95 = percentile_ns(&sorted, 0.95);
                json!({
                    "route": route,
                    "samples": sorted.len(),
                    "p50_ms": p50 as f64 / 1_000_000.0,
                    "p95_ms": p95 as f64 / 1_000_000.0
                })
            })
            .collect();
        latencies.sort_by_key(|v| v["route"].as_str().unwrap_or_default().to_string());

        json!({"requests": request_counts, "latency": latencies})
    }
}

fn percentile_ns(sorted: &[u64], q: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((sorted.len() as f64) * q).ceil() as usize;
    sorted[idx.saturating_sub(1).min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_reports_counts_and_percentiles() {
        let metrics = RequestMetrics::default();
        metrics
            .observe_request("/", StatusCode::OK, Duration::from_millis(2))
            .await;
        metrics
            .observe_request("/", StatusCode::OK, Duration::from_millis(4))
            .await;
        metrics
            .observe_request("/login", StatusCode::SEE_OTHER, Duration::from_millis(1))
            .await;

        let snap = metrics.snapshot().await;
        let requests = snap["requests"].as_array().expect("requests");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["route"], "/");
        assert_eq!(requests[0]["count"], 2);
        let latency = snap["latency"].as_array().expect("latency");
        assert_eq!(latency[0]["samples"], 2);
    }

    #[test]
    fn percentile_of_empty_is_zero() {
        assert_eq!(percentile_ns(&[], 0.95), 0);
        assert_eq!(percentile_ns(&[10, 20, 30], 0.5), 20);
    }
}
