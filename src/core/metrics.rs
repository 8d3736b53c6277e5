use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;
use crate::services::identity::{IdentifierError, IdentifierKind};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_identifier_rejection(kind: IdentifierKind, error: &IdentifierError) {
    metrics::counter!(
        "identifier_rejections_total",
        "kind" => kind.label(),
        "reason" => error.reason()
    )
    .increment(1);
}

pub(crate) fn record_page_served(collection: &'static str, items: usize) {
    metrics::histogram!("page_items", "collection" => collection).record(items as f64);
}
