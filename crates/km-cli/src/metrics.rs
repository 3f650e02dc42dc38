use crate::{CliError, CliResult};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the process-wide Prometheus recorder behind the `km_*` counters.
///
/// No HTTP listener is started; `--metrics` renders the text after the command.
pub fn install() -> CliResult<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| CliError::metrics(e.to_string()))
}
