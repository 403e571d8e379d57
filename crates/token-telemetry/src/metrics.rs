//! Prometheus metrics for the fee token.
//!
//! All metrics follow the naming convention: `ft_<concern>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Committed transfers by fee treatment
    pub static ref TRANSFERS_EXECUTED: CounterVec = CounterVec::new(
        Opts::new("ft_transfers_executed_total", "Committed partitioned transfers"),
        &["kind"]  // kind: fee/exempt
    ).expect("metric creation failed");

    /// Committed issuances
    pub static ref ISSUANCES_EXECUTED: Counter = Counter::new(
        "ft_issuances_executed_total",
        "Committed partitioned issuances"
    ).expect("metric creation failed");

    /// Fee amounts paid to recipients, in base units
    pub static ref FEES_ROUTED: CounterVec = CounterVec::new(
        Opts::new("ft_fees_routed_base_units_total", "Fee amounts routed to recipients"),
        &["source"]  // source: transfer/issuance
    ).expect("metric creation failed");

    /// Failed or rejected operations by status code
    pub static ref OPERATIONS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("ft_operations_rejected_total", "Operations that did not commit"),
        &["code"]
    ).expect("metric creation failed");
}

/// Keeps the registry alive for exporters.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// # Errors
///
/// Fails if the metrics were already registered.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TRANSFERS_EXECUTED.clone()),
        Box::new(ISSUANCES_EXECUTED.clone()),
        Box::new(FEES_ROUTED.clone()),
        Box::new(OPERATIONS_REJECTED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Records a committed transfer and the fees it routed.
pub fn record_transfer(exempt: bool, fees_routed: f64) {
    let kind = if exempt { "exempt" } else { "fee" };
    TRANSFERS_EXECUTED.with_label_values(&[kind]).inc();
    if fees_routed > 0.0 {
        FEES_ROUTED.with_label_values(&["transfer"]).inc_by(fees_routed);
    }
}

/// Records a committed issuance and its fee.
pub fn record_issuance(issue_fee: f64) {
    ISSUANCES_EXECUTED.inc();
    if issue_fee > 0.0 {
        FEES_ROUTED.with_label_values(&["issuance"]).inc_by(issue_fee);
    }
}

/// Encode all metrics as Prometheus text format.
///
/// # Errors
///
/// Fails if encoding produces invalid UTF-8.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_twice_fails() {
        // Another test may have registered first.
        let _ = register_metrics();
        assert!(matches!(
            register_metrics(),
            Err(TelemetryError::MetricsInit(_))
        ));
    }

    #[test]
    fn test_record_transfer() {
        let before = TRANSFERS_EXECUTED.with_label_values(&["fee"]).get();
        record_transfer(false, 3_750.0);
        assert!(TRANSFERS_EXECUTED.with_label_values(&["fee"]).get() >= before + 1.0);
        assert!(FEES_ROUTED.with_label_values(&["transfer"]).get() >= 3_750.0);
    }

    #[test]
    fn test_record_issuance_without_fee() {
        let before = FEES_ROUTED.with_label_values(&["issuance"]).get();
        record_issuance(0.0);
        assert!(ISSUANCES_EXECUTED.get() >= 1.0);
        assert!((FEES_ROUTED.with_label_values(&["issuance"]).get() - before).abs() < f64::EPSILON);
    }

    #[test]
    fn test_encode_metrics() {
        let _ = register_metrics();
        OPERATIONS_REJECTED.with_label_values(&["52"]).inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("ft_operations_rejected_total"));
    }
}
