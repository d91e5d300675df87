//! Metrics declarations for cellnet planning.
//!
//! Every metric the planners emit is declared once here as a [`Metric`]
//! constant, so names and label keys cannot drift between call sites. The
//! `metrics` crate is re-exported; with no recorder installed every emission
//! is a no-op.
//!
//! # Example
//!
//! ```rust
//! use cellnet_metrics::{metric_defs, PlanLabels};
//!
//! let labels = PlanLabels::new("acme").with_domain("2g_channel");
//! cellnet_metrics::metrics::counter!(metric_defs::RADIO_ASSIGNED.name, &labels.to_labels())
//!     .increment(3);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use cellnet_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const LINKS: Metric = Metric::counter("cellnet.links.created")
///     .with_description("Links created")
///     .with_unit(Unit::Count)
///     .with_labels(&["owner", "link_type"]);
///
/// assert_eq!(LINKS.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "cellnet.links.created").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// The unit of measurement, if any.
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    /// Sets the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Topology
    // ========================================================================

    /// Links created by topology synthesis.
    ///
    /// Labels: owner, link_type
    pub const LINKS_CREATED: Metric = Metric::counter("cellnet.links.created")
        .with_description("Links created by topology synthesis")
        .with_unit(Unit::Count)
        .with_labels(&["owner", "link_type"]);

    /// Private links removed before re-planning a selection.
    ///
    /// Labels: owner
    pub const LINKS_DELETED: Metric = Metric::counter("cellnet.links.deleted")
        .with_description("Private links removed before re-planning")
        .with_unit(Unit::Count)
        .with_labels(&["owner"]);

    // ========================================================================
    // Clearance
    // ========================================================================

    /// Height steps taken per link until clearance held.
    ///
    /// Labels: owner, link_type
    pub const CLEARANCE_ITERATIONS: Metric = Metric::histogram("cellnet.clearance.iterations")
        .with_description("Height adjustment steps per link")
        .with_unit(Unit::Count)
        .with_labels(&["owner", "link_type"]);

    /// Sites whose mast height was raised to fit a link device.
    ///
    /// Labels: owner, link_type
    pub const CLEARANCE_SITES_RAISED: Metric = Metric::counter("cellnet.clearance.sites_raised")
        .with_description("Site height raises caused by clearance adjustment")
        .with_unit(Unit::Count)
        .with_labels(&["owner", "link_type"]);

    /// Links that hit the device height ceiling while still obstructed.
    ///
    /// Labels: owner
    pub const CLEARANCE_UNCONVERGED: Metric = Metric::counter("cellnet.clearance.unconverged")
        .with_description("Links still obstructed at the height ceiling")
        .with_unit(Unit::Count)
        .with_labels(&["owner"]);

    // ========================================================================
    // Radio plan
    // ========================================================================

    /// Values committed to sites.
    ///
    /// Labels: owner, domain
    pub const RADIO_ASSIGNED: Metric = Metric::counter("cellnet.radio.assigned")
        .with_description("Radio values committed to sites")
        .with_unit(Unit::Count)
        .with_labels(&["owner", "domain"]);

    /// Total cost of every scored sequence.
    ///
    /// Labels: owner, domain
    pub const RADIO_SEQUENCE_COST: Metric = Metric::histogram("cellnet.radio.sequence_cost")
        .with_description("Total cost per scored sequence")
        .with_labels(&["owner", "domain"]);

    /// First-order neighbor pairs sharing a value in the committed sequence.
    ///
    /// Labels: owner, domain
    pub const RADIO_CONFLICTS: Metric = Metric::gauge("cellnet.radio.conflicts")
        .with_description("Neighbor pairs sharing a value after assignment")
        .with_unit(Unit::Count)
        .with_labels(&["owner", "domain"]);

    // ========================================================================
    // Runs
    // ========================================================================

    /// Wall-clock duration of a planning pipeline.
    ///
    /// Labels: owner, pipeline
    pub const RUN_DURATION: Metric = Metric::histogram("cellnet.run.duration_ms")
        .with_description("Planning pipeline duration")
        .with_unit(Unit::Milliseconds)
        .with_labels(&["owner", "pipeline"]);

    /// Every metric declared above.
    pub const ALL: &[&Metric] = &[
        &LINKS_CREATED,
        &LINKS_DELETED,
        &CLEARANCE_ITERATIONS,
        &CLEARANCE_SITES_RAISED,
        &CLEARANCE_UNCONVERGED,
        &RADIO_ASSIGNED,
        &RADIO_SEQUENCE_COST,
        &RADIO_CONFLICTS,
        &RUN_DURATION,
    ];
}

/// Labels attached to every planning metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLabels {
    /// Owner being planned.
    pub owner: String,
    /// Extra labels such as `link_type` or `domain`.
    pub extra: Vec<(&'static str, String)>,
}

impl PlanLabels {
    /// Labels for one owner.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            extra: Vec::new(),
        }
    }

    /// Add the `link_type` label.
    pub fn with_link_type(self, link_type: impl Into<String>) -> Self {
        self.with_label("link_type", link_type)
    }

    /// Add the `domain` label.
    pub fn with_domain(self, domain: impl Into<String>) -> Self {
        self.with_label("domain", domain)
    }

    /// Add the `pipeline` label.
    pub fn with_pipeline(self, pipeline: impl Into<String>) -> Self {
        self.with_label("pipeline", pipeline)
    }

    fn with_label(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.extra.push((key, value.into()));
        self
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        let mut labels = Vec::with_capacity(1 + self.extra.len());
        labels.push(("owner", self.owner.clone()));
        labels.extend(self.extra.iter().cloned());
        labels
    }
}

/// Register descriptions of every metric with the installed recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
