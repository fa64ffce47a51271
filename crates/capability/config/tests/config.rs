use bridge_config::BridgeConfig;
use domain::InvalidValuePolicy;

#[test]
fn load_bridge_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("BRIDGE_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("BRIDGE_INGEST_URL", "http://127.0.0.1:9000/messages");
        std::env::set_var("BRIDGE_CODE_TABLE", "5600=temperature,1=custom");
        std::env::set_var("BRIDGE_INVALID_VALUE_POLICY", "skip");
        std::env::set_var("BRIDGE_INGEST_TIMEOUT_SECONDS", "");
    }

    let config = BridgeConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(
        config.ingest_url.as_deref(),
        Some("http://127.0.0.1:9000/messages")
    );
    assert_eq!(config.ingest_timeout_seconds, 30);
    assert_eq!(config.code_table.len(), 2);
    assert_eq!(
        config.code_table.lookup(1).map(|e| e.name.as_str()),
        Some("custom")
    );
    assert_eq!(config.invalid_value_policy, InvalidValuePolicy::Skip);

    unsafe {
        std::env::set_var("BRIDGE_INGEST_TIMEOUT_SECONDS", " 5 ");
    }
    assert_eq!(
        BridgeConfig::from_env().expect("config").ingest_timeout_seconds,
        5
    );

    unsafe {
        std::env::set_var("BRIDGE_INVALID_VALUE_POLICY", "explode");
    }
    assert!(BridgeConfig::from_env().is_err());
}
