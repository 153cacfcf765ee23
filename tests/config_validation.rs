// tests/config_validation.rs

use std::error::Error;
use std::io::Write;
use std::time::Duration;

use reswatch::config::{load_and_validate, parse_duration};
use reswatch::errors::ReswatchError;
use reswatch::types::{PollFailureMode, ResourceKind};
use reswatch::watch::{PollFailurePolicy, DEFAULT_POLL_INTERVAL};
use reswatch_test_utils::builders::{ConfigFileBuilder, ResourceConfigBuilder};
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn full_config_loads_with_overrides_and_inferred_kinds() -> TestResult {
    let file = write_config(
        r#"
[config]
poll_interval = "30s"
retry_attempts = 2
poll_failure = "backoff"
max_backoff = "5m"

[http]
connect_timeout = "2s"
read_timeout = "10s"
max_idle_connections = 4
proxy_host = "proxy.internal"
proxy_port = 3128

[resource.metadata]
location = "https://idp.example.org/metadata.xml"
retry_attempts = 5

[resource.metadata.replace]
ENTITY_ID = "https://sp.example.org"

[resource.local]
location = " /etc/app/local.xml "
poll_interval = "250ms"
"#,
    );

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.http.connect_timeout, Duration::from_secs(2));
    assert_eq!(cfg.http.read_timeout, Duration::from_secs(10));
    assert_eq!(cfg.http.max_idle_connections, 4);
    let proxy = cfg.http.proxy.as_ref().expect("proxy configured");
    assert_eq!(proxy.to_string(), "proxy.internal:3128");

    // Resources come out in name order.
    let names: Vec<_> = cfg.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["local", "metadata"]);

    let local = &cfg.resources[0];
    assert_eq!(local.location, "/etc/app/local.xml");
    assert_eq!(local.kind, ResourceKind::File);
    assert_eq!(local.options.poll_interval, Duration::from_millis(250));
    assert_eq!(local.options.retry_attempts, 2);
    assert!(local.filter_chain().is_empty());

    let metadata = &cfg.resources[1];
    assert_eq!(metadata.kind, ResourceKind::Http);
    assert_eq!(metadata.options.poll_interval, Duration::from_secs(30));
    assert_eq!(metadata.options.retry_attempts, 5);
    assert_eq!(
        metadata.options.failure_policy,
        PollFailurePolicy::Backoff {
            max_interval: Duration::from_secs(300)
        }
    );
    assert_eq!(metadata.filter_chain().len(), 1);
    Ok(())
}

#[test]
fn minimal_config_uses_defaults() -> TestResult {
    let file = write_config(
        r#"
[resource.only]
location = "/tmp/only.xml"
"#,
    );

    let cfg = load_and_validate(file.path())?;
    let only = &cfg.resources[0];

    assert_eq!(only.options.poll_interval, DEFAULT_POLL_INTERVAL);
    assert_eq!(only.options.retry_attempts, 0);
    assert_eq!(only.options.failure_policy, PollFailurePolicy::Tolerate);
    assert!(cfg.http.proxy.is_none());
    Ok(())
}

#[test]
fn config_without_resources_is_rejected() {
    let file = write_config(
        r#"
[config]
poll_interval = "1m"
"#,
    );

    match load_and_validate(file.path()) {
        Err(ReswatchError::ConfigError(msg)) => {
            assert!(msg.contains("at least one"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_location_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_resource("blank", ResourceConfigBuilder::new("   ").build())
        .try_build();

    match result {
        Err(ReswatchError::ConfigError(msg)) => {
            assert!(msg.contains("blank"));
            assert!(msg.contains("empty `location`"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn zero_and_malformed_durations_are_rejected() {
    let zero = ConfigFileBuilder::new()
        .with_poll_interval("0s")
        .with_resource("a", ResourceConfigBuilder::new("/tmp/a").build())
        .try_build();
    assert!(matches!(zero, Err(ReswatchError::ConfigError(msg)) if msg.contains("greater than zero")));

    let malformed = ConfigFileBuilder::new()
        .with_resource(
            "a",
            ResourceConfigBuilder::new("/tmp/a")
                .poll_interval("soon")
                .build(),
        )
        .try_build();
    assert!(
        matches!(malformed, Err(ReswatchError::ConfigError(msg)) if msg.contains("[resource.a].poll_interval"))
    );

    let bad_backoff = ConfigFileBuilder::new()
        .with_backoff("forever")
        .with_resource("a", ResourceConfigBuilder::new("/tmp/a").build())
        .try_build();
    assert!(matches!(bad_backoff, Err(ReswatchError::ConfigError(_))));
}

#[test]
fn zero_idle_connections_is_rejected() {
    let file = write_config(
        r#"
[http]
max_idle_connections = 0

[resource.a]
location = "http://example.test/a"
"#,
    );

    match load_and_validate(file.path()) {
        Err(ReswatchError::ConfigError(msg)) => {
            assert!(msg.contains("max_idle_connections"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn proxy_port_without_host_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_http(reswatch::config::HttpSection {
            proxy_port: Some(8080),
            ..Default::default()
        })
        .with_resource("a", ResourceConfigBuilder::new("/tmp/a").build())
        .try_build();

    assert!(matches!(result, Err(ReswatchError::ConfigError(msg)) if msg.contains("proxy_host")));
}

#[test]
fn explicit_kind_overrides_inference() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_retry_attempts(3)
        .with_resource(
            "odd",
            ResourceConfigBuilder::new("http-cache/data.xml")
                .kind(ResourceKind::File)
                .replace("A", "B")
                .build(),
        )
        .try_build()?;

    let odd = &cfg.resources[0];
    assert_eq!(odd.kind, ResourceKind::File);
    assert_eq!(odd.options.retry_attempts, 3);
    assert_eq!(odd.replace.get("A").map(String::as_str), Some("B"));
    Ok(())
}

#[test]
fn unknown_poll_failure_mode_is_a_toml_error() {
    let file = write_config(
        r#"
[config]
poll_failure = "explode"

[resource.a]
location = "/tmp/a"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(ReswatchError::TomlError(_))
    ));
    assert!("explode".parse::<PollFailureMode>().is_err());
    assert_eq!("Backoff".parse::<PollFailureMode>(), Ok(PollFailureMode::Backoff));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/Reswatch.toml"),
        Err(ReswatchError::IoError(_))
    ));
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration(" 30s "), Ok(Duration::from_secs(30)));
    assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
    assert_eq!(parse_duration("12h"), Ok(Duration::from_secs(43_200)));

    assert!(parse_duration("").is_err());
    assert!(parse_duration("30").is_err());
    assert!(parse_duration("3d").is_err());
    assert!(parse_duration("s").is_err());
}

#[test]
fn kind_is_inferred_from_scheme() {
    assert_eq!(ResourceKind::infer("https://example.org/x"), ResourceKind::Http);
    assert_eq!(ResourceKind::infer("HTTP://example.org/x"), ResourceKind::Http);
    assert_eq!(ResourceKind::infer("/etc/x.xml"), ResourceKind::File);
    assert_eq!(ResourceKind::infer("ftp://example.org/x"), ResourceKind::File);
}

#[test]
fn backoff_cap_shorter_than_interval_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_poll_interval("1m")
        .with_backoff("5m")
        .with_resource("fast", ResourceConfigBuilder::new("/tmp/fast").build())
        .with_resource(
            "slow",
            ResourceConfigBuilder::new("/tmp/slow")
                .poll_interval("10m")
                .build(),
        )
        .try_build();

    match result {
        Err(ReswatchError::ConfigError(msg)) => {
            assert!(msg.contains("slow"));
            assert!(msg.contains("max_backoff"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn proxy_username_with_colon_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_http(reswatch::config::HttpSection {
            proxy_host: Some("proxy.internal".to_string()),
            proxy_username: Some("domain:user".to_string()),
            proxy_password: Some("pw".to_string()),
            ..Default::default()
        })
        .with_resource("a", ResourceConfigBuilder::new("/tmp/a").build())
        .try_build();

    match result {
        Err(ReswatchError::ConfigError(msg)) => {
            assert!(msg.contains("proxy"));
            assert!(msg.contains("':'"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}
