use domain::Observation;

#[test]
fn known_observation_flattens_to_metric_name() {
    let observation = Observation::Known {
        resource: "sensor1".to_string(),
        code: 5600,
        metric_name: "temperature".to_string(),
        value: 23.5,
    };
    let json = serde_json::to_value(&observation).expect("json");
    assert_eq!(json, serde_json::json!({ "resource": "sensor1", "temperature": 23.5 }));
}

#[test]
fn unknown_observation_uses_raw_code_key() {
    let observation = Observation::Unknown {
        resource: "sensor2".to_string(),
        raw_code: Some(9999),
        value: 1.0,
    };
    assert_eq!(observation.metric_key(), "9999");
    let json = serde_json::to_value(&observation).expect("json");
    assert_eq!(json, serde_json::json!({ "resource": "sensor2", "9999": 1.0 }));
}

#[test]
fn unparsable_code_and_value_serialize_like_sentinels() {
    let observation = Observation::Unknown {
        resource: "sensor3".to_string(),
        raw_code: None,
        value: f64::NAN,
    };
    let json = serde_json::to_string(&observation).expect("json");
    assert_eq!(json, r#"{"resource":"sensor3","NaN":null}"#);
}
