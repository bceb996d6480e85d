use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once in a
/// process (integration tests boot several applications); only the first
/// call installs.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            METRICS_HANDLE.set(handle).ok();
        }
        Err(e) => {
            tracing::debug!("Prometheus recorder already installed: {}", e);
        }
    }
}

/// Render the Prometheus exposition text.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record an issued ticket and its fee.
pub fn record_ticket_issued(zone: &str, fee: i64) {
    let labels = [("zone", zone.to_string())];
    counter!("parking_tickets_issued_total", &labels).increment(1);
    counter!("parking_fees_charged_rupees_total", &labels).increment(fee.max(0) as u64);
}

/// Record a collected ticket or fine payment.
pub fn record_payment(kind: &str, amount: i64) {
    let labels = [("kind", kind.to_string())];
    counter!("parking_payments_total", &labels).increment(1);
    counter!("parking_payments_rupees_total", &labels).increment(amount.max(0) as u64);
}
