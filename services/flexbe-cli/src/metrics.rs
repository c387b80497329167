//! Prometheus exposition for one CLI run
//!
//! With `--metrics` the recorder is installed before the client is built and
//! the rendered text is printed to stderr once the command finishes.

use anyhow::{Context, Result};
use flexbe_client::metrics::REQUEST_DURATION;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

fn builder() -> Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)
        .context("configuring request duration buckets")
}

pub fn install_recorder() -> Result<PrometheusHandle> {
    builder()?
        .install_recorder()
        .context("installing Prometheus recorder")
}
