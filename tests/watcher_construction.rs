// tests/watcher_construction.rs

mod common;
use crate::common::{at, init_tracing, shared};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use reswatch::errors::ReswatchError;
use reswatch::watch::{ResourceState, ResourceWatcher};
use reswatch_test_utils::{Existence, ScriptedResource};

type TestResult = Result<(), Box<dyn Error>>;

const INTERVAL: Duration = Duration::from_secs(60);

#[test]
fn absent_resource_arms_with_single_check() -> TestResult {
    init_tracing();

    let resource = Arc::new(ScriptedResource::absent("fake://absent"));
    let watcher = ResourceWatcher::new(shared(&resource), INTERVAL, 0)?;

    assert_eq!(watcher.state(), ResourceState::absent());
    assert_eq!(resource.exists_calls(), 1);
    assert_eq!(resource.last_modified_calls(), 0);
    Ok(())
}

#[test]
fn present_resource_records_modification_time() -> TestResult {
    init_tracing();

    let resource = Arc::new(ScriptedResource::present("fake://present", at(10)));
    let watcher = ResourceWatcher::new(shared(&resource), INTERVAL, 0)?;

    assert_eq!(watcher.state(), ResourceState::present(at(10)));
    assert_eq!(watcher.options().poll_interval, INTERVAL);
    assert_eq!(watcher.resource().location(), "fake://present");
    assert_eq!(resource.exists_calls(), 1);
    Ok(())
}

#[test]
fn failing_resource_without_budget_fails_after_one_check() {
    init_tracing();

    let resource = Arc::new(ScriptedResource::failing("fake://down"));
    let result = ResourceWatcher::new(shared(&resource), INTERVAL, 0);

    match result {
        Err(ReswatchError::ResourceAccess { location, .. }) => {
            assert_eq!(location, "fake://down");
        }
        Err(e) => panic!("Expected ResourceAccess error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    assert_eq!(resource.exists_calls(), 1);
}

#[test]
fn transient_failures_within_budget_are_retried() -> TestResult {
    init_tracing();

    let resource = Arc::new(ScriptedResource::failing_first(
        "fake://flaky",
        2,
        Existence::Present,
    ));
    resource.set_last_modified(at(42));

    let watcher = ResourceWatcher::new(shared(&resource), INTERVAL, 2)?;

    assert_eq!(watcher.state(), ResourceState::present(at(42)));
    assert_eq!(resource.exists_calls(), 3);
    Ok(())
}

#[test]
fn failures_beyond_budget_fail_construction() {
    init_tracing();

    let resource = Arc::new(ScriptedResource::failing_first(
        "fake://flaky",
        3,
        Existence::Present,
    ));

    let result = ResourceWatcher::new(shared(&resource), INTERVAL, 2);

    assert!(matches!(result, Err(ReswatchError::ResourceAccess { .. })));
    assert_eq!(resource.exists_calls(), 3);
}

#[test]
fn zero_interval_is_rejected_before_any_check() {
    init_tracing();

    let resource = Arc::new(ScriptedResource::present("fake://present", at(0)));
    let result = ResourceWatcher::new(shared(&resource), Duration::ZERO, 3);

    match result {
        Err(ReswatchError::InvalidArgument(msg)) => {
            assert!(msg.contains("poll interval"));
        }
        Err(e) => panic!("Expected InvalidArgument error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    assert_eq!(resource.exists_calls(), 0);
}

#[test]
fn unreadable_modification_time_arms_with_unknown_age() -> TestResult {
    init_tracing();

    let resource = Arc::new(ScriptedResource::present("fake://ageless", at(5)));
    resource.set_last_modified_fails(true);

    let watcher = ResourceWatcher::new(shared(&resource), INTERVAL, 0)?;

    assert_eq!(watcher.state(), ResourceState::present_unknown_age());
    assert_eq!(resource.last_modified_calls(), 1);
    Ok(())
}

#[test]
fn construction_does_not_need_a_runtime_but_start_does() -> TestResult {
    init_tracing();

    let resource = Arc::new(ScriptedResource::absent("fake://absent"));
    let watcher = ResourceWatcher::new(shared(&resource), INTERVAL, 0)?;

    match watcher.start() {
        Err(ReswatchError::Other(e)) => {
            assert!(e.to_string().contains("Tokio runtime"));
        }
        Err(e) => panic!("Expected Other error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn recovery_within_budget_uses_exactly_k_plus_one_checks(
        (budget, failures) in (0u32..16).prop_flat_map(|n| (Just(n), 0..=n))
    ) {
        let resource = Arc::new(ScriptedResource::failing_first(
            "fake://flaky",
            failures as usize,
            Existence::Absent,
        ));

        let watcher = ResourceWatcher::new(shared(&resource), INTERVAL, budget);

        prop_assert!(watcher.is_ok());
        prop_assert_eq!(resource.exists_calls(), failures as usize + 1);
    }

    #[test]
    fn permanent_failure_uses_exactly_budget_plus_one_checks(budget in 0u32..16) {
        let resource = Arc::new(ScriptedResource::failing("fake://down"));

        let watcher = ResourceWatcher::new(shared(&resource), INTERVAL, budget);

        prop_assert!(
            matches!(watcher, Err(ReswatchError::ResourceAccess { .. })),
            "expected ResourceAccess error"
        );
        prop_assert_eq!(resource.exists_calls(), budget as usize + 1);
    }
}
