use bridge_telemetry::{
    metrics, record_ingest_latency_ms, record_known_record, record_notifications_received,
};

#[test]
fn counters_accumulate() {
    let before = metrics().snapshot();
    record_notifications_received(3);
    record_known_record();
    record_ingest_latency_ms(15);
    let after = metrics().snapshot();
    assert_eq!(after.notifications_received - before.notifications_received, 3);
    assert_eq!(after.records_known - before.records_known, 1);
    assert_eq!(after.ingest_latency_ms_total - before.ingest_latency_ms_total, 15);
    assert_eq!(after.ingest_latency_ms_count - before.ingest_latency_ms_count, 1);
}
