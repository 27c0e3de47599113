//! Prometheus-backed metric registry.
//!
//! [`MetricsRegistry`] owns a Prometheus registry with one [`GaugeVec`] per
//! [`Gauge`]. Its mutation surface is deliberately small: [`set`],
//! [`clear`] and [`snapshot`]. Callers are responsible for serializing
//! clear/set/snapshot sequences; the refresh orchestrator does this with a
//! mutex around each scrape.
//!
//! [`set`]: MetricsRegistry::set
//! [`clear`]: MetricsRegistry::clear
//! [`snapshot`]: MetricsRegistry::snapshot

use std::collections::HashMap;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use super::gauges::Gauge;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Prometheus(#[from] prometheus::Error),

    #[error("refusing to publish non-finite value {value} for {gauge}")]
    NonFinite { gauge: &'static str, value: f64 },

    #[error("exposition output is not valid UTF-8")]
    Encoding,
}

/// One value to publish.
#[derive(Clone, Debug, PartialEq)]
pub struct GaugeSample {
    pub gauge: Gauge,
    /// Values for the gauge's variable labels, in descriptor order.
    pub labels: Vec<String>,
    pub value: f64,
}

impl GaugeSample {
    pub fn new<I, L>(gauge: Gauge, labels: I, value: f64) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            gauge,
            labels: labels.into_iter().map(Into::into).collect(),
            value,
        }
    }

    /// A sample for a gauge without variable labels.
    pub fn unlabeled(gauge: Gauge, value: f64) -> Self {
        Self {
            gauge,
            labels: Vec::new(),
            value,
        }
    }
}

/// Wrapper around a Prometheus registry and the exporter's gauges.
pub struct MetricsRegistry {
    registry: Registry,
    gauges: HashMap<Gauge, GaugeVec>,
}

impl MetricsRegistry {
    /// Creates a registry whose output carries `default_labels` on every
    /// sample, and registers every [`Gauge`] plus, on Linux, the standard
    /// `process_*` metrics of this process.
    pub fn new(default_labels: HashMap<String, String>) -> Result<Self, prometheus::Error> {
        let labels = (!default_labels.is_empty()).then_some(default_labels);
        let registry = Registry::new_custom(None, labels)?;

        let mut gauges = HashMap::with_capacity(Gauge::ALL.len());
        for gauge in Gauge::ALL {
            let d = gauge.descriptor();
            let vec = GaugeVec::new(Opts::new(d.name, d.help), d.labels)?;
            registry.register(Box::new(vec.clone()))?;
            gauges.insert(gauge, vec);
        }

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self { registry, gauges })
    }

    /// Writes one sample, replacing any previous value for the same labels.
    pub fn set(&self, sample: &GaugeSample) -> Result<(), RegistryError> {
        let name = sample.gauge.descriptor().name;
        if !sample.value.is_finite() {
            return Err(RegistryError::NonFinite {
                gauge: name,
                value: sample.value,
            });
        }

        let vec = self
            .gauges
            .get(&sample.gauge)
            .ok_or_else(|| prometheus::Error::Msg(format!("gauge {name} is not registered")))?;
        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
        vec.get_metric_with_label_values(&labels)?.set(sample.value);
        Ok(())
    }

    /// Removes every sample from every gauge.
    pub fn clear(&self) {
        for vec in self.gauges.values() {
            vec.reset();
        }
    }

    /// Encodes the current samples in the Prometheus text format.
    pub fn snapshot(&self) -> Result<String, RegistryError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|_| RegistryError::Encoding)
    }

    /// `Content-Type` of [`MetricsRegistry::snapshot`] output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}
