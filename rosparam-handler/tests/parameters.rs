use std::collections::BTreeMap;

use rosparam_handler::{
    DefaultWriteBack, Error, LoadIssue, MemoryRegistry, NodeIdentity, ParameterType,
    ParameterValue, Parameters, Registry,
};

rosparam_handler::parameters! {
    /// Parameters of an obstacle detector.
    pub struct DetectorParameters {
        /// Detection threshold
        #[param(min = 0, max = 10, configurable)]
        threshold: f64 = 5.0,
        /// Operating mode
        mode: String,
        /// Per-axis gains
        #[param(min = 0.0, max = 1.0)]
        gains: Vec<f64> = vec![0.5, 0.5],
        #[param(max = 100)]
        limits: BTreeMap<String, i32> = BTreeMap::from([("speed".to_string(), 10)]),
        #[param(constant)]
        version: String = "v1",
        #[param(global)]
        use_sim_time: bool = false,
    }
}

fn node() -> NodeIdentity {
    NodeIdentity::new("detector", "/robot").unwrap()
}

#[test]
fn test_missing_mandatory_fails_after_clamping() {
    let registry = MemoryRegistry::with_entries([("/robot/detector/threshold", 15.0)]);
    let mut params = DetectorParameters::new(&node());

    let err = params.from_param_server(&registry).unwrap_err();
    let Error::LoadFailed(report) = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(report.missing_keys(), vec!["/robot/detector/mode"]);
    assert_eq!(report.failures().count(), 1);

    // Slots other than the failing one were still loaded
    assert_eq!(params.threshold, 10.0);
    assert_eq!(params.gains, vec![0.5, 0.5]);
}

#[test]
fn test_full_load() {
    let registry = MemoryRegistry::with_entries([
        ("/robot/detector/mode", ParameterValue::from("fast")),
        ("/robot/detector/threshold", ParameterValue::Integer(-3)),
        ("/robot/detector/gains", ParameterValue::from(vec![2.0, 0.25])),
        ("/robot/detector/limits/speed", ParameterValue::Integer(250)),
        ("/robot/detector/limits/turn", ParameterValue::Integer(30)),
        ("/use_sim_time", ParameterValue::Bool(true)),
    ]);
    let mut params = DetectorParameters::new(&node());
    params.from_param_server(&registry).unwrap();

    assert_eq!(params.mode, "fast");
    assert_eq!(params.threshold, 0.0);
    assert_eq!(params.gains, vec![1.0, 0.25]);
    assert_eq!(params.limits["speed"], 100);
    assert_eq!(params.limits["turn"], 30);
    assert_eq!(params.version, "v1");
    assert!(params.use_sim_time);
}

#[test]
fn test_type_mismatch_on_mandatory_slot() {
    let registry = MemoryRegistry::with_entries([("/robot/detector/mode", 3)]);
    let mut params = DetectorParameters::new(&node());

    let Err(Error::LoadFailed(report)) = params.from_param_server(&registry) else {
        panic!("load should fail");
    };
    assert_eq!(
        report.issues,
        vec![LoadIssue::TypeMismatch {
            key: "/robot/detector/mode".to_string(),
            expected: ParameterType::String,
            found: ParameterType::Integer,
        }]
    );
}

#[test]
fn test_defaults_written_back() {
    let registry = MemoryRegistry::with_entries([("/robot/detector/mode", "fast")]);
    let mut params = DetectorParameters::new(&node());
    params.from_param_server(&registry).unwrap();

    assert_eq!(
        registry.get("/robot/detector/threshold").unwrap(),
        Some(ParameterValue::Double(5.0))
    );
    assert_eq!(
        registry.get("/robot/detector/limits").unwrap(),
        Some(ParameterValue::from(BTreeMap::from([("speed".to_string(), 10)])))
    );
    assert_eq!(
        registry.get("/use_sim_time").unwrap(),
        Some(ParameterValue::Bool(false))
    );
    assert!(!registry.has("/robot/detector/version").unwrap());
}

#[test]
fn test_defaults_not_written_back() {
    let registry = MemoryRegistry::with_entries([("/robot/detector/mode", "fast")]);
    let mut params = DetectorParameters::new(&node());
    params
        .from_param_server_with(&registry, DefaultWriteBack::Disabled)
        .unwrap();

    assert_eq!(params.threshold, 5.0);
    assert_eq!(registry.keys("/").unwrap(), vec!["/robot/detector/mode"]);
}

#[test]
fn test_constant_override_is_advisory() {
    let registry = MemoryRegistry::with_entries([
        ("/robot/detector/mode", "fast"),
        ("/robot/detector/version", "v2"),
    ]);
    let mut params = DetectorParameters::new(&node());
    params.from_param_server(&registry).unwrap();
    assert_eq!(params.version, "v1");
}

#[test]
fn test_to_param_server_round_trip() {
    let registry = MemoryRegistry::new();
    let mut params = DetectorParameters::new(&node());
    params.mode = "slow".to_string();
    params.threshold = 7.5;
    params.to_param_server(&registry);

    assert!(!registry.has("/robot/detector/version").unwrap());

    let mut reloaded = DetectorParameters::new(&node());
    reloaded.from_param_server(&registry).unwrap();
    assert_eq!(reloaded.mode, "slow");
    assert_eq!(reloaded.threshold, 7.5);
}

#[test]
fn test_print() {
    let registry = MemoryRegistry::with_entries([("/robot/detector/mode", "fast")]);
    let mut params = DetectorParameters::new(&node());
    params.from_param_server(&registry).unwrap();

    let printed = params.to_string();
    let mut lines = printed.lines();
    assert_eq!(lines.next(), Some("[detector]"));
    assert_eq!(
        lines.next(),
        Some("Node detector has the following parameters:")
    );
    assert_eq!(lines.next(), Some("\t/robot/detector/threshold: 5"));
    assert_eq!(lines.next(), Some("\t/robot/detector/mode: fast"));
    assert!(printed.contains("\t/robot/detector/limits: {speed --> 10}"));
    assert!(printed.contains("\t/use_sim_time: false"));
}

#[test]
fn test_missing_params_message() {
    let params = DetectorParameters::new(&node());
    let msg = rosparam_handler::parameters::missing_params_message(params.base(), &params.slots());
    assert!(msg.contains("/robot/detector/mode (string): Operating mode"));
    assert!(!msg.contains("threshold"));
    assert!(!msg.contains("version"));
}

#[cfg(feature = "dynamic-reconfigure")]
#[test]
fn test_from_config() {
    let mut params = DetectorParameters::new(&node());
    let mut config = BTreeMap::new();
    config.insert("threshold".to_string(), ParameterValue::Double(2.5));
    config.insert("mode".to_string(), ParameterValue::from("slow"));

    params.from_config(&config, 0).unwrap();
    assert_eq!(params.threshold, 2.5);
    assert_eq!(params.mode, "");
}

#[cfg(feature = "dynamic-reconfigure")]
#[test]
fn test_from_config_respects_bounds() {
    let mut params = DetectorParameters::new(&node());
    let mut config = BTreeMap::new();
    config.insert("threshold".to_string(), ParameterValue::Double(1000.0));
    params.from_config(&config, 0).unwrap();
    assert_eq!(params.threshold, 10.0);

    config.insert("threshold".to_string(), ParameterValue::Integer(-1));
    params.from_config(&config, 0).unwrap();
    assert_eq!(params.threshold, 0.0);
}

#[cfg(not(feature = "dynamic-reconfigure"))]
#[test]
fn test_from_config_unsupported() {
    let mut params = DetectorParameters::new(&node());
    let config: BTreeMap<String, ParameterValue> = BTreeMap::new();
    assert!(matches!(
        params.from_config(&config, 0),
        Err(Error::ReconfigurationUnsupported)
    ));
}
