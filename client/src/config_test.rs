use super::*;

/// # Safety
/// Tests touching the environment must run with `--test-threads=1` to avoid races.
unsafe fn clear_specto_env() {
    unsafe {
        std::env::remove_var("SPECTO_API_BASE_URL");
        std::env::remove_var("SPECTO_WS_BASE_URL");
        std::env::remove_var("SPECTO_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("SPECTO_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn new_derives_ws_base_from_http() {
    let cfg = ClientConfig::new("http://localhost:8000/").expect("config");
    assert_eq!(cfg.api_base_url, "http://localhost:8000");
    assert_eq!(cfg.ws_base_url, "ws://localhost:8000");
}

#[test]
fn new_derives_wss_from_https() {
    let cfg = ClientConfig::new("https://api.specto.example").expect("config");
    assert_eq!(cfg.ws_base_url, "wss://api.specto.example");
}

#[test]
fn new_rejects_unknown_scheme() {
    let err = ClientConfig::new("ftp://nope").expect_err("should fail");
    assert!(matches!(err, ConfigError::InvalidBaseUrl(url) if url == "ftp://nope"));
}

#[test]
fn with_ws_base_url_accepts_ws_and_http_forms() {
    let cfg = ClientConfig::new("http://a:1")
        .expect("config")
        .with_ws_base_url("wss://chat.example/")
        .expect("ws override");
    assert_eq!(cfg.ws_base_url, "wss://chat.example");

    let cfg = cfg.with_ws_base_url("http://b:2").expect("http override");
    assert_eq!(cfg.ws_base_url, "ws://b:2");
}

#[test]
fn api_url_joins_with_or_without_leading_slash() {
    let cfg = ClientConfig::new("http://a:1").expect("config");
    assert_eq!(cfg.api_url("/forum/topics"), "http://a:1/forum/topics");
    assert_eq!(cfg.api_url("me"), "http://a:1/me");
}

#[test]
fn tuning_defaults_match_chat_constants() {
    let tuning = ChatTuning::default();
    assert_eq!(tuning.typing_ttl, Duration::from_secs(3));
    assert_eq!(tuning.typing_throttle, Duration::from_secs(2));
    assert!((tuning.scroll_threshold_px - 100.0).abs() < f64::EPSILON);
    assert_eq!(tuning.input_max_chars, 500);
}

#[test]
fn from_env_defaults_and_overrides() {
    unsafe { clear_specto_env() };
    let cfg = ClientConfig::from_env().expect("defaults");
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.ws_base_url, "ws://127.0.0.1:8000");
    assert_eq!(cfg.timeouts, HttpTimeouts::default());

    unsafe {
        std::env::set_var("SPECTO_API_BASE_URL", "https://api.example/");
        std::env::set_var("SPECTO_WS_BASE_URL", "wss://rt.example");
        std::env::set_var("SPECTO_REQUEST_TIMEOUT_SECS", "30");
        std::env::set_var("SPECTO_CONNECT_TIMEOUT_SECS", "garbage");
    }
    let cfg = ClientConfig::from_env().expect("overrides");
    assert_eq!(cfg.api_base_url, "https://api.example");
    assert_eq!(cfg.ws_base_url, "wss://rt.example");
    assert_eq!(cfg.timeouts.request_secs, 30);
    assert_eq!(cfg.timeouts.connect_secs, DEFAULT_CONNECT_TIMEOUT_SECS);

    unsafe { clear_specto_env() };
}

#[test]
fn with_api_base_url_rederives_ws_base() {
    let cfg = ClientConfig::new("http://a:1")
        .expect("config")
        .with_ws_base_url("wss://rt.example")
        .expect("ws override")
        .with_api_base_url("https://api.example/")
        .expect("api override");
    assert_eq!(cfg.api_base_url, "https://api.example");
    assert_eq!(cfg.ws_base_url, "wss://api.example");
    assert!(matches!(
        cfg.with_api_base_url("ws://nope"),
        Err(ConfigError::InvalidBaseUrl(_))
    ));
}
