//! 追踪、请求 ID 生成与进程级计数指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub notifications_received: u64,
    pub records_known: u64,
    pub records_unknown: u64,
    pub records_invalid: u64,
    pub records_skipped: u64,
    pub batches_rejected: u64,
    pub ingest_success: u64,
    pub ingest_failure: u64,
    pub ingest_latency_ms_total: u64,
    pub ingest_latency_ms_count: u64,
    pub publish_success: u64,
    pub publish_failure: u64,
}

/// 进程级计数指标。
pub struct TelemetryMetrics {
    notifications_received: AtomicU64,
    records_known: AtomicU64,
    records_unknown: AtomicU64,
    records_invalid: AtomicU64,
    records_skipped: AtomicU64,
    batches_rejected: AtomicU64,
    ingest_success: AtomicU64,
    ingest_failure: AtomicU64,
    ingest_latency_ms_total: AtomicU64,
    ingest_latency_ms_count: AtomicU64,
    publish_success: AtomicU64,
    publish_failure: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            notifications_received: AtomicU64::new(0),
            records_known: AtomicU64::new(0),
            records_unknown: AtomicU64::new(0),
            records_invalid: AtomicU64::new(0),
            records_skipped: AtomicU64::new(0),
            batches_rejected: AtomicU64::new(0),
            ingest_success: AtomicU64::new(0),
            ingest_failure: AtomicU64::new(0),
            ingest_latency_ms_total: AtomicU64::new(0),
            ingest_latency_ms_count: AtomicU64::new(0),
            publish_success: AtomicU64::new(0),
            publish_failure: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            notifications_received: self.notifications_received.load(Ordering::Relaxed),
            records_known: self.records_known.load(Ordering::Relaxed),
            records_unknown: self.records_unknown.load(Ordering::Relaxed),
            records_invalid: self.records_invalid.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            ingest_success: self.ingest_success.load(Ordering::Relaxed),
            ingest_failure: self.ingest_failure.load(Ordering::Relaxed),
            ingest_latency_ms_total: self.ingest_latency_ms_total.load(Ordering::Relaxed),
            ingest_latency_ms_count: self.ingest_latency_ms_count.load(Ordering::Relaxed),
            publish_success: self.publish_success.load(Ordering::Relaxed),
            publish_failure: self.publish_failure.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录收到的通知条数。
pub fn record_notifications_received(count: u64) {
    metrics()
        .notifications_received
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录命中编码表的记录数。
pub fn record_known_record() {
    metrics().records_known.fetch_add(1, Ordering::Relaxed);
}

/// 记录未命中编码表的记录数。
pub fn record_unknown_record() {
    metrics().records_unknown.fetch_add(1, Ordering::Relaxed);
}

/// 记录含无法解析编码/数值的通知数。
pub fn record_invalid_record() {
    metrics().records_invalid.fetch_add(1, Ordering::Relaxed);
}

/// 记录被 skip 策略丢弃的记录数。
pub fn record_skipped_record() {
    metrics().records_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录被 reject 策略拒绝的批次数。
pub fn record_batch_rejected() {
    metrics().batches_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录接入成功次数。
pub fn record_ingest_success() {
    metrics().ingest_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录接入失败次数。
pub fn record_ingest_failure() {
    metrics().ingest_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录接入调用延迟（毫秒）。
pub fn record_ingest_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .ingest_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .ingest_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录 Broker 发布成功次数。
pub fn record_publish_success() {
    metrics().publish_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录 Broker 发布失败次数。
pub fn record_publish_failure() {
    metrics().publish_failure.fetch_add(1, Ordering::Relaxed);
}
