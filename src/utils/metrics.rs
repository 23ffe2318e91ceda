//! Observability and Metrics
//!
//! Frame-level counters for the codec. Uses atomic counters for thread-safe
//! metrics collection; nothing in the codec reads them back.

use crate::error::ProtocolError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Total messages written
    pub messages_sent: AtomicU64,
    /// Total messages read and verified
    pub messages_received: AtomicU64,
    /// Total bytes written (header + payload)
    pub bytes_sent: AtomicU64,
    /// Total bytes read in verified messages
    pub bytes_received: AtomicU64,
    /// Frames dropped for a payload checksum mismatch
    pub checksum_failures: AtomicU64,
    /// Frames dropped at header validation (command, network, length)
    pub header_rejections: AtomicU64,
    /// Underlying stream failures on either path
    pub io_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            messages_sent: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            checksum_failures: AtomicU64::new(0),
            header_rejections: AtomicU64::new(0),
            io_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a message sent
    pub fn message_sent(&self, byte_count: u64) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a message received
    pub fn message_received(&self, byte_count: u64) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a stream failure
    pub fn io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Classify and record a failed read
    pub fn read_failed(&self, error: &ProtocolError) {
        let counter = match error {
            ProtocolError::InvalidChecksum { .. } => &self.checksum_failures,
            e if e.is_io() => &self.io_errors,
            _ => &self.header_rejections,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            header_rejections: self.header_rejections.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            messages_sent = snapshot.messages_sent,
            messages_received = snapshot.messages_received,
            bytes_sent = snapshot.bytes_sent,
            bytes_received = snapshot.bytes_received,
            checksum_failures = snapshot.checksum_failures,
            header_rejections = snapshot.header_rejections,
            io_errors = snapshot.io_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub checksum_failures: u64,
    pub header_rejections: u64,
    pub io_errors: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}
