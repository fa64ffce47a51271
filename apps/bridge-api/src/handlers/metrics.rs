//! Telemetry 指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bridge_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            notifications_received: snapshot.notifications_received,
            records_known: snapshot.records_known,
            records_unknown: snapshot.records_unknown,
            records_invalid: snapshot.records_invalid,
            records_skipped: snapshot.records_skipped,
            batches_rejected: snapshot.batches_rejected,
            ingest_success: snapshot.ingest_success,
            ingest_failure: snapshot.ingest_failure,
            ingest_latency_ms_total: snapshot.ingest_latency_ms_total,
            ingest_latency_ms_count: snapshot.ingest_latency_ms_count,
            publish_success: snapshot.publish_success,
            publish_failure: snapshot.publish_failure,
        })),
    )
        .into_response()
}
