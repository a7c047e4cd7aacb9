//! Prometheus-compatible metrics for the Demografi service.

use prometheus::{self, Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Global metrics instance.
static METRICS: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Get or initialize the global metrics instance.
pub fn get_metrics() -> Arc<Metrics> {
    METRICS.get_or_init(|| Arc::new(Metrics::new())).clone()
}

/// Latency buckets in seconds, 1ms to 30s.
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ]
}

fn register_counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("failed to create counter");
    registry
        .register(Box::new(counter.clone()))
        .expect("failed to register metric");
    counter
}

fn register_gauge(registry: &Registry, name: &str, help: &str) -> IntGauge {
    let gauge = IntGauge::new(name, help).expect("failed to create gauge");
    registry
        .register(Box::new(gauge.clone()))
        .expect("failed to register metric");
    gauge
}

fn register_histogram(registry: &Registry, name: &str, help: &str) -> Histogram {
    let histogram =
        Histogram::with_opts(HistogramOpts::new(name, help).buckets(default_latency_buckets()))
            .expect("failed to create histogram");
    registry
        .register(Box::new(histogram.clone()))
        .expect("failed to register metric");
    histogram
}

/// All metrics for the Demografi service.
pub struct Metrics {
    /// Prometheus registry for all metrics.
    pub registry: Registry,

    // =========================================================================
    // Counters
    // =========================================================================
    /// Questions received by `ask`.
    pub ask_requests_total: IntCounter,
    /// Questions that could not be answered.
    pub ask_errors_total: IntCounter,
    /// Plan generator failures.
    pub planner_errors_total: IntCounter,
    /// Fail-soft diagnostics produced while validating plans.
    pub plan_diagnostics_total: IntCounter,
    /// Plans evaluated against the dataset.
    pub evaluations_total: IntCounter,
    /// Retrieval requests.
    pub retrieval_requests_total: IntCounter,
    /// Failed retrieval requests.
    pub retrieval_errors_total: IntCounter,
    /// Plan cache hits.
    pub cache_hits_total: IntCounter,
    /// Plan cache misses.
    pub cache_misses_total: IntCounter,

    // =========================================================================
    // Gauges
    // =========================================================================
    /// Records in the loaded snapshot.
    pub records_loaded: IntGauge,
    /// Uptime in seconds.
    pub uptime_seconds: IntGauge,

    // =========================================================================
    // Histograms (durations in seconds)
    // =========================================================================
    /// Plan generation duration.
    pub planner_duration_seconds: Histogram,
    /// Plan evaluation duration.
    pub evaluation_duration_seconds: Histogram,
    /// Retrieval duration, including the query embedding.
    pub retrieval_duration_seconds: Histogram,

    /// Server start time.
    start_time: RwLock<Instant>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with all metrics registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        let ask_requests_total = register_counter(
            &registry,
            "demografi_ask_requests_total",
            "Total number of questions received",
        );
        let ask_errors_total = register_counter(
            &registry,
            "demografi_ask_errors_total",
            "Total number of questions that failed",
        );
        let planner_errors_total = register_counter(
            &registry,
            "demografi_planner_errors_total",
            "Total number of plan generator failures",
        );
        let plan_diagnostics_total = register_counter(
            &registry,
            "demografi_plan_diagnostics_total",
            "Total number of plan validation diagnostics",
        );
        let evaluations_total = register_counter(
            &registry,
            "demografi_evaluations_total",
            "Total number of plans evaluated",
        );
        let retrieval_requests_total = register_counter(
            &registry,
            "demografi_retrieval_requests_total",
            "Total number of retrieval requests",
        );
        let retrieval_errors_total = register_counter(
            &registry,
            "demografi_retrieval_errors_total",
            "Total number of failed retrieval requests",
        );
        let cache_hits_total = register_counter(
            &registry,
            "demografi_cache_hits_total",
            "Total number of plan cache hits",
        );
        let cache_misses_total = register_counter(
            &registry,
            "demografi_cache_misses_total",
            "Total number of plan cache misses",
        );

        let records_loaded = register_gauge(
            &registry,
            "demografi_records_loaded",
            "Number of records in the loaded dataset",
        );
        let uptime_seconds =
            register_gauge(&registry, "demografi_uptime_seconds", "Server uptime in seconds");

        let planner_duration_seconds = register_histogram(
            &registry,
            "demografi_planner_duration_seconds",
            "Plan generation duration in seconds",
        );
        let evaluation_duration_seconds = register_histogram(
            &registry,
            "demografi_evaluation_duration_seconds",
            "Plan evaluation duration in seconds",
        );
        let retrieval_duration_seconds = register_histogram(
            &registry,
            "demografi_retrieval_duration_seconds",
            "Retrieval duration in seconds",
        );

        Self {
            registry,
            ask_requests_total,
            ask_errors_total,
            planner_errors_total,
            plan_diagnostics_total,
            evaluations_total,
            retrieval_requests_total,
            retrieval_errors_total,
            cache_hits_total,
            cache_misses_total,
            records_loaded,
            uptime_seconds,
            planner_duration_seconds,
            evaluation_duration_seconds,
            retrieval_duration_seconds,
            start_time: RwLock::new(Instant::now()),
        }
    }

    /// Update the uptime gauge.
    pub fn update_uptime(&self) {
        let uptime = self.start_time.read().elapsed();
        self.uptime_seconds.set(uptime.as_secs() as i64);
    }

    /// Export metrics in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;
        self.update_uptime();

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Export metrics as JSON.
    pub fn export_json(&self) -> MetricsSnapshot {
        self.update_uptime();
        MetricsSnapshot {
            counters: MetricsCounters {
                ask_requests_total: self.ask_requests_total.get(),
                ask_errors_total: self.ask_errors_total.get(),
                planner_errors_total: self.planner_errors_total.get(),
                plan_diagnostics_total: self.plan_diagnostics_total.get(),
                evaluations_total: self.evaluations_total.get(),
                retrieval_requests_total: self.retrieval_requests_total.get(),
                retrieval_errors_total: self.retrieval_errors_total.get(),
                cache_hits_total: self.cache_hits_total.get(),
                cache_misses_total: self.cache_misses_total.get(),
            },
            gauges: MetricsGauges {
                records_loaded: self.records_loaded.get(),
                uptime_seconds: self.uptime_seconds.get(),
            },
            histograms: MetricsHistograms {
                planner_duration_seconds: HistogramSnapshot::from_prometheus(
                    &self.planner_duration_seconds,
                ),
                evaluation_duration_seconds: HistogramSnapshot::from_prometheus(
                    &self.evaluation_duration_seconds,
                ),
                retrieval_duration_seconds: HistogramSnapshot::from_prometheus(
                    &self.retrieval_duration_seconds,
                ),
            },
        }
    }

    /// Start a timer that records duration to a histogram when dropped.
    pub fn start_timer(histogram: &Histogram) -> HistogramTimer {
        HistogramTimer {
            histogram: histogram.clone(),
            start: Instant::now(),
        }
    }
}

/// Timer that records duration to a histogram when dropped.
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.histogram.observe(duration.as_secs_f64());
    }
}

impl HistogramTimer {
    /// Get the elapsed time without stopping the timer.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Snapshot of all metrics for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: MetricsCounters,
    pub gauges: MetricsGauges,
    pub histograms: MetricsHistograms,
}

/// Counter metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsCounters {
    pub ask_requests_total: u64,
    pub ask_errors_total: u64,
    pub planner_errors_total: u64,
    pub plan_diagnostics_total: u64,
    pub evaluations_total: u64,
    pub retrieval_requests_total: u64,
    pub retrieval_errors_total: u64,
    pub cache_hits_total: u64,
    pub cache_misses_total: u64,
}

/// Gauge metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsGauges {
    pub records_loaded: i64,
    pub uptime_seconds: i64,
}

/// Histogram metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsHistograms {
    pub planner_duration_seconds: HistogramSnapshot,
    pub evaluation_duration_seconds: HistogramSnapshot,
    pub retrieval_duration_seconds: HistogramSnapshot,
}

/// Snapshot of a histogram for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    pub mean: Option<f64>,
}

impl HistogramSnapshot {
    /// Create a snapshot from a prometheus histogram.
    pub fn from_prometheus(h: &Histogram) -> Self {
        let sample_count = h.get_sample_count();
        let sample_sum = h.get_sample_sum();
        let mean = if sample_count > 0 {
            Some(sample_sum / sample_count as f64)
        } else {
            None
        };
        Self {
            count: sample_count,
            sum: sample_sum,
            mean,
        }
    }
}
