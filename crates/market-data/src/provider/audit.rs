//! Audit trail of outbound vendor requests.
//!
//! Every network call an adapter issues yields one [`RequestAudit`]. Records
//! are handed to an [`AuditSink`]; recording never influences the fetch result.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Url;
use serde::Serialize;

/// Error text recorded for a request dropped before it completed.
pub const CANCELLED: &str = "cancelled";

/// Placeholder written in place of a credential.
const MASK: &str = "***";

/// One outbound request to a vendor.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAudit {
    /// Registry name of the provider
    pub provider: String,
    /// Request URL with the credential masked
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Response status, if a response arrived
    pub status: Option<u16>,
    /// Wall time spent on the call
    pub elapsed_ms: u64,
    /// When the call finished
    pub timestamp: DateTime<Utc>,
    /// Failure description, if the call failed
    pub error: Option<String>,
}

/// Destination for request audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, audit: RequestAudit);
}

/// Writes audit records to the log at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, audit: RequestAudit) {
        match &audit.error {
            Some(error) => debug!(
                "{} {} {} -> {:?} in {}ms: {}",
                audit.provider, audit.method, audit.url, audit.status, audit.elapsed_ms, error
            ),
            None => debug!(
                "{} {} {} -> {:?} in {}ms",
                audit.provider, audit.method, audit.url, audit.status, audit.elapsed_ms
            ),
        }
    }
}

/// Keeps audit records in memory for later inspection or persistence.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<RequestAudit>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_records(&self) -> MutexGuard<'_, Vec<RequestAudit>> {
        self.records.lock().unwrap_or_else(|poisoned| {
            warn!("Audit sink mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Snapshot of the records collected so far.
    pub fn records(&self) -> Vec<RequestAudit> {
        self.lock_records().clone()
    }

    /// Remove and return all collected records.
    pub fn drain(&self) -> Vec<RequestAudit> {
        std::mem::take(&mut *self.lock_records())
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, audit: RequestAudit) {
        self.lock_records().push(audit);
    }
}

/// A request that has been sent but not yet audited.
///
/// Dropping it before [`complete`](Self::complete) records the request as
/// cancelled, so a call abandoned by a deadline still leaves a trace.
pub(crate) struct InFlightAudit {
    sink: Arc<dyn AuditSink>,
    record: Option<RequestAudit>,
    started: Instant,
}

impl InFlightAudit {
    pub(crate) fn start(
        sink: Arc<dyn AuditSink>,
        provider: &str,
        method: &str,
        url: String,
    ) -> Self {
        Self {
            sink,
            record: Some(RequestAudit {
                provider: provider.to_string(),
                url,
                method: method.to_string(),
                status: None,
                elapsed_ms: 0,
                timestamp: Utc::now(),
                error: None,
            }),
            started: Instant::now(),
        }
    }

    pub(crate) fn complete(mut self, status: Option<u16>, error: Option<String>) {
        self.emit(status, error);
    }

    fn emit(&mut self, status: Option<u16>, error: Option<String>) {
        if let Some(mut record) = self.record.take() {
            record.status = status;
            record.error = error;
            record.elapsed_ms = self.started.elapsed().as_millis() as u64;
            record.timestamp = Utc::now();
            self.sink.record(record);
        }
    }
}

impl Drop for InFlightAudit {
    fn drop(&mut self) {
        self.emit(None, Some(CANCELLED.to_string()));
    }
}

/// Replace every occurrence of a credential in a string.
pub fn mask_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, MASK)
}

/// Render a URL with the credential masked.
///
/// Query values are compared after decoding, so keys that need
/// percent-encoding are masked as well.
pub fn redact_url(url: &Url, secret: &str) -> String {
    if secret.is_empty() || url.query().is_none() {
        return mask_secret(url.as_str(), secret);
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.replace(secret, MASK)))
        .collect();

    let mut redacted = url.clone();
    {
        let mut query = redacted.query_pairs_mut();
        query.clear();
        for (name, value) in &pairs {
            query.append_pair(name, value);
        }
    }
    mask_secret(redacted.as_str(), secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit(provider: &str) -> RequestAudit {
        RequestAudit {
            provider: provider.to_string(),
            url: "https://example.test/query".to_string(),
            method: "GET".to_string(),
            status: Some(200),
            elapsed_ms: 12,
            timestamp: Utc::now(),
            error: None,
        }
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(
            mask_secret("https://x.test/q?symbol=TCS&apikey=SECRET", "SECRET"),
            "https://x.test/q?symbol=TCS&apikey=***"
        );
        assert_eq!(mask_secret("https://x.test/q", ""), "https://x.test/q");
    }

    #[test]
    fn test_redact_url_masks_encoded_key() {
        let url = Url::parse_with_params(
            "https://x.test/query",
            &[("symbol", "TCS"), ("apikey", "ab+cd/ef==")],
        )
        .unwrap();
        assert!(url.as_str().contains("ab%2Bcd%2Fef%3D%3D"));

        let redacted = redact_url(&url, "ab+cd/ef==");
        assert_eq!(redacted, "https://x.test/query?symbol=TCS&apikey=***");
    }

    #[test]
    fn test_redact_url_without_query() {
        let url = Url::parse("https://x.test/stock").unwrap();
        assert_eq!(redact_url(&url, "SECRET"), "https://x.test/stock");
        assert_eq!(redact_url(&url, ""), "https://x.test/stock");
    }

    #[test]
    fn test_in_flight_audit_completes_once() {
        let sink = Arc::new(MemoryAuditSink::new());
        let pending = InFlightAudit::start(sink.clone(), "indian_api", "GET", "u".to_string());
        pending.complete(Some(200), None);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Some(200));
        assert!(records[0].error.is_none());
    }

    #[test]
    fn test_dropped_in_flight_audit_is_cancelled() {
        let sink = Arc::new(MemoryAuditSink::new());
        drop(InFlightAudit::start(sink.clone(), "indian_api", "GET", "u".to_string()));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, None);
        assert_eq!(records[0].error.as_deref(), Some(CANCELLED));
    }

    #[test]
    fn test_memory_sink_collects_and_drains() {
        let sink = MemoryAuditSink::new();
        sink.record(audit("alpha_vantage"));
        sink.record(audit("indian_api"));

        assert_eq!(sink.records().len(), 2);
        let drained = sink.drain();
        assert_eq!(drained[0].provider, "alpha_vantage");
        assert_eq!(drained[1].provider, "indian_api");
        assert!(sink.records().is_empty());
    }
}
