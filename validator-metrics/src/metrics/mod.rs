//! Metric registry for the exporter.
//!
//! This module declares the fixed set of gauges the exporter publishes and
//! wraps a Prometheus registry that renders them in the text exposition
//! format.
//!
//! Typical usage:
//!
//! ```ignore
//! use validator_metrics::metrics::{Gauge, GaugeSample, MetricsRegistry};
//!
//! let registry = MetricsRegistry::new(settings.default_labels())?;
//! registry.clear();
//! registry.set(&GaugeSample::unlabeled(Gauge::MaxValidators, 180.0))?;
//! let body = registry.snapshot()?;
//! ```

pub mod gauges;
pub mod registry;

pub use gauges::{Gauge, GaugeDescriptor};
pub use registry::{GaugeSample, MetricsRegistry, RegistryError};
