//! Performance metrics, threshold alerts and simulated telemetry.
//!
//! Metric values change only through [`PerformanceStore::apply_samples`].
//! The simulation is a thin layer on top: it draws bounded random deltas
//! and feeds them through the same path, so a seeded RNG reproduces a run.

use crate::seed;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use syncscript_model::{CollectionSchema, Record, ValidationError, require_non_empty};
use syncscript_storage::PersistenceAdapter;
use syncscript_store::{Collection, StoreConfig, StoreContext, StoreFacade, StoreResult, Ticker};
use syncscript_types::{Namespace, RecordId, Timestamp};
use tracing::{debug, warn};

pub const NAMESPACE: &str = "performance";
pub const METRICS: &str = "metrics";
pub const ALERTS: &str = "alerts";

pub const ALERT_RETENTION: usize = 500;

/// Values kept per metric for sparklines.
pub const HISTORY_LEN: usize = 20;

/// Largest simulated step as a fraction of a metric's range.
const MAX_DRIFT: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Normal,
    Warning,
    Critical,
}

impl MetricStatus {
    /// Higher values are worse.
    pub fn classify(value: f64, warning: f64, critical: f64) -> Self {
        if value >= critical {
            Self::Critical
        } else if value >= warning {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: RecordId,
    /// Unique key such as `cpu_usage`.
    pub name: String,
    pub unit: String,
    pub value: f64,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    /// Bounds for simulated values.
    pub floor: f64,
    pub ceiling: f64,
    pub status: MetricStatus,
    pub history: Vec<f64>,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

impl Metric {
    /// Sets a new value and re-derives the status.
    pub fn record(&mut self, value: f64) {
        self.value = value;
        self.status = MetricStatus::classify(value, self.warning_threshold, self.critical_threshold);
        self.history.push(value);
        if self.history.len() > HISTORY_LEN {
            let excess = self.history.len() - HISTORY_LEN;
            self.history.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMetric {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub value: f64,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Record for Metric {
    type Draft = NewMetric;
    const KIND: &'static str = "metric";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["createdAt", "name", "status", "history"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewMetric) -> Self {
        let mut metric = Self {
            id,
            name: draft.name,
            unit: draft.unit,
            value: draft.value,
            warning_threshold: draft.warning_threshold,
            critical_threshold: draft.critical_threshold,
            floor: draft.floor,
            ceiling: draft.ceiling,
            status: MetricStatus::Normal,
            history: Vec::new(),
            created_at: now,
            last_modified: now,
        };
        metric.record(draft.value);
        metric
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn touch(&mut self, now: Timestamp) {
        self.last_modified = now;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        let finite = [
            ("value", self.value),
            ("warningThreshold", self.warning_threshold),
            ("criticalThreshold", self.critical_threshold),
            ("floor", self.floor),
            ("ceiling", self.ceiling),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::invalid(field, "must be a finite number"));
        }
        if self.warning_threshold > self.critical_threshold {
            return Err(ValidationError::invalid(
                "warningThreshold",
                "must not exceed criticalThreshold",
            ));
        }
        if self.floor >= self.ceiling {
            return Err(ValidationError::invalid("floor", "must be below ceiling"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: RecordId,
    pub metric: String,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub acknowledged: bool,
    pub acknowledged_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
}

impl Record for Alert {
    type Draft = NewAlert;
    const KIND: &'static str = "alert";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["createdAt", "metric", "value", "threshold"];

    fn from_draft(id: RecordId, now: Timestamp, draft: NewAlert) -> Self {
        Self {
            id,
            message: format!(
                "{} reached {:.2} (critical at {:.2})",
                draft.metric, draft.value, draft.threshold
            ),
            metric: draft.metric,
            value: draft.value,
            threshold: draft.threshold,
            acknowledged: false,
            acknowledged_at: None,
            created_at: now,
        }
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("metric", &self.metric)
    }
}

/// One observed value for the metric called `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
}

impl MetricSample {
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub metrics: usize,
    pub normal: usize,
    pub warning: usize,
    pub critical: usize,
    pub total_alerts: usize,
    pub unacknowledged_alerts: usize,
}

pub struct PerformanceStore {
    ctx: Arc<StoreContext>,
    metrics: Collection<Metric>,
    alerts: Collection<Alert>,
    ticker: Ticker,
}

impl PerformanceStore {
    pub fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        parent: &Namespace,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let ctx = StoreContext::new(adapter, parent.child(NAMESPACE)?, config);
        let metrics = Collection::new(ctx.clone(), CollectionSchema::append(METRICS))?.with_seed(seed_metrics);
        let alerts = Collection::new(
            ctx.clone(),
            CollectionSchema::prepend(ALERTS)
                .with_retention(ALERT_RETENTION)
                .append_only(),
        )?;
        Ok(Self {
            ctx,
            metrics,
            alerts,
            ticker: Ticker::new("performance-telemetry"),
        })
    }

    pub async fn register_metric(&self, draft: NewMetric) -> StoreResult<Metric> {
        let name = draft.name.clone();
        self.metrics
            .create_checked(draft, |existing| {
                if existing.iter().any(|m| m.name == name) {
                    return Err(ValidationError::invalid("name", format!("metric {name} already exists")).into());
                }
                Ok(())
            })
            .await
    }

    pub async fn list_metrics(&self) -> Vec<Metric> {
        self.metrics.list().await
    }

    pub async fn metric_by_name(&self, name: &str) -> Option<Metric> {
        self.metrics.find(|m| m.name == name).await.into_iter().next()
    }

    /// Applies observed values in one write. Samples for unknown metrics
    /// or with non-finite values are ignored; when a metric has several
    /// samples the last one wins.
    ///
    /// Returns the alerts raised for metrics that moved into critical.
    pub async fn apply_samples(&self, samples: &[MetricSample]) -> StoreResult<Vec<Alert>> {
        let mut crossings = Vec::new();
        let updated = self
            .metrics
            .update_each(|metric| {
                let Some(sample) = samples.iter().rev().find(|s| s.name == metric.name) else {
                    return false;
                };
                if !sample.value.is_finite() {
                    warn!(metric = %metric.name, "ignoring non-finite sample");
                    return false;
                }
                let before = metric.status;
                metric.record(sample.value);
                if before != MetricStatus::Critical && metric.status == MetricStatus::Critical {
                    crossings.push(NewAlert {
                        metric: metric.name.clone(),
                        value: metric.value,
                        threshold: metric.critical_threshold,
                    });
                }
                true
            })
            .await;
        debug!(samples = samples.len(), updated = updated.len(), "samples applied");

        let applied: HashSet<&str> = updated.iter().map(|m| m.name.as_str()).collect();
        let mut raised = Vec::new();
        for crossing in crossings {
            if !applied.contains(crossing.metric.as_str()) {
                continue;
            }
            let alert = self.alerts.create(crossing).await?;
            warn!(metric = %alert.metric, value = alert.value, "metric critical");
            raised.push(alert);
        }
        Ok(raised)
    }

    /// One simulated telemetry step driven by `rng`.
    pub async fn simulate_tick<R: Rng + Send>(&self, rng: &mut R) -> StoreResult<Vec<Alert>> {
        let metrics = self.metrics.list().await;
        let samples = drift_samples(&metrics, rng);
        self.apply_samples(&samples).await
    }

    /// Runs [`Self::simulate_tick`] every `period` until [`StoreFacade::destroy`]
    /// is called or the store is dropped.
    pub fn start_simulation(self: &Arc<Self>, period: Duration) -> StoreResult<()> {
        let store = Arc::downgrade(self);
        let rng = Arc::new(Mutex::new(StdRng::from_entropy()));
        self.ticker.start(period, move || {
            let store = store.clone();
            let rng = rng.clone();
            async move {
                let Some(store) = store.upgrade() else {
                    return ControlFlow::Break(());
                };
                let metrics = store.metrics.list().await;
                let samples = {
                    let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                    drift_samples(&metrics, &mut *rng)
                };
                if let Err(e) = store.apply_samples(&samples).await {
                    warn!(error = %e, "telemetry tick failed");
                }
                ControlFlow::Continue(())
            }
        })
    }

    pub fn is_simulating(&self) -> bool {
        self.ticker.is_running()
    }

    /// Newest first.
    pub async fn alerts(&self) -> Vec<Alert> {
        self.alerts.list().await
    }

    pub async fn acknowledge_alert(&self, id: &RecordId) -> StoreResult<Option<Alert>> {
        let now = Timestamp::now();
        self.alerts
            .update_with(id, |alert| {
                if !alert.acknowledged {
                    alert.acknowledged = true;
                    alert.acknowledged_at = Some(now);
                }
            })
            .await
    }

    pub async fn summary(&self) -> PerformanceSummary {
        let mut summary = PerformanceSummary::default();
        for metric in self.metrics.list().await {
            summary.metrics += 1;
            match metric.status {
                MetricStatus::Normal => summary.normal += 1,
                MetricStatus::Warning => summary.warning += 1,
                MetricStatus::Critical => summary.critical += 1,
            }
        }
        let alerts = self.alerts.list().await;
        summary.total_alerts = alerts.len();
        summary.unacknowledged_alerts = alerts.iter().filter(|a| !a.acknowledged).count();
        summary
    }
}

impl StoreFacade for PerformanceStore {
    fn context(&self) -> &Arc<StoreContext> {
        &self.ctx
    }

    async fn init(&self) {
        self.metrics.init().await;
        self.alerts.init().await;
    }

    async fn flush(&self) -> bool {
        let metrics = self.metrics.flush().await;
        let alerts = self.alerts.flush().await;
        self.ctx.finish_flush(metrics && alerts)
    }

    fn destroy(&self) {
        self.ticker.stop();
    }
}

/// Bounded random step for every metric, clamped to its floor and ceiling.
fn drift_samples<R: Rng + ?Sized>(metrics: &[Metric], rng: &mut R) -> Vec<MetricSample> {
    metrics
        .iter()
        .map(|m| {
            // Halved first so the widest finite ranges do not overflow.
            let span = (m.ceiling / 2.0 - m.floor / 2.0) * 2.0 * MAX_DRIFT;
            if !span.is_finite() || span <= 0.0 {
                return MetricSample::new(&m.name, m.value);
            }
            let delta = rng.gen_range(-span..=span);
            MetricSample::new(&m.name, (m.value + delta).clamp(m.floor, m.ceiling))
        })
        .collect()
}

fn seed_metric(
    id: &'static str,
    name: &str,
    unit: &str,
    value: f64,
    thresholds: (f64, f64),
    range: (f64, f64),
) -> Metric {
    let mut metric = Metric {
        id: RecordId::fixed(id),
        name: name.to_string(),
        unit: unit.to_string(),
        value,
        warning_threshold: thresholds.0,
        critical_threshold: thresholds.1,
        floor: range.0,
        ceiling: range.1,
        status: MetricStatus::Normal,
        history: Vec::new(),
        created_at: seed::at(0),
        last_modified: seed::at(0),
    };
    metric.record(value);
    metric
}

fn seed_metrics() -> Vec<Metric> {
    vec![
        seed_metric("metric-cpu", "cpu_usage", "%", 42.0, (70.0, 90.0), (0.0, 100.0)),
        seed_metric("metric-memory", "memory_usage", "%", 58.0, (75.0, 90.0), (0.0, 100.0)),
        seed_metric("metric-latency", "api_latency", "ms", 120.0, (300.0, 800.0), (20.0, 2_000.0)),
        seed_metric("metric-errors", "error_rate", "%", 0.4, (2.0, 5.0), (0.0, 100.0)),
    ]
}
