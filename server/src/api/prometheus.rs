use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;
use shared::Period;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum PassOutcome {
    Applied,
    Failed,
    Stale,
}

impl PassOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PassOutcome::Applied => "applied",
            PassOutcome::Failed => "failed",
            PassOutcome::Stale => "stale",
        }
    }
}

impl EncodeLabelValue for PassOutcome {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        EncodeLabelValue::encode(&self.as_str(), encoder)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct PeriodLabel(Period);

impl From<Period> for PeriodLabel {
    fn from(period: Period) -> Self {
        PeriodLabel(period)
    }
}

impl EncodeLabelValue for PeriodLabel {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        EncodeLabelValue::encode(&self.0.to_string().as_str(), encoder)
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PassRecord {
    pub outcome: PassOutcome,
    pub period: PeriodLabel,
}

pub struct PrometheusClient {
    registry: Registry,
    pass: Family<PassRecord, Counter>,
    pass_duration: Family<PassRecord, Histogram>,
    // Size of the view currently on display
    entries: Gauge,
}

impl Default for PrometheusClient {
    fn default() -> Self {
        let mut registry = Registry::default();
        let pass = Family::default();
        let entries = Gauge::default();
        let pass_duration: Family<PassRecord, Histogram> = Family::new_with_constructor(|| {
            Histogram::new([0.1, 0.25, 0.5, 1., 2.5, 5., 10., 30., f64::INFINITY].into_iter())
        });

        registry.register(
            "leaderboard_pass",
            "Fetch and aggregate passes by outcome",
            pass.clone(),
        );
        registry.register(
            "leaderboard_pass_duration_seconds",
            "Time from pass start until its result was applied or discarded",
            pass_duration.clone(),
        );
        registry.register(
            "leaderboard_entries",
            "Contributors in the leaderboard on display",
            entries.clone(),
        );

        Self {
            registry,
            pass,
            pass_duration,
            entries,
        }
    }
}

impl PrometheusClient {
    pub fn record_pass(
        &self,
        outcome: PassOutcome,
        period: Period,
        started: chrono::DateTime<chrono::Utc>,
    ) {
        let record = PassRecord {
            outcome,
            period: period.into(),
        };
        self.pass.get_or_create(&record).inc();

        let elapsed = chrono::Utc::now() - started;
        self.pass_duration
            .get_or_create(&record)
            .observe(elapsed.num_milliseconds() as f64 / 1000.0);
    }

    pub fn set_entries(&self, value: usize) {
        self.entries.set(value as i64);
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}
