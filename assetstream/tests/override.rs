mod common;

use std::sync::Arc;

use assetstream::error::ErrorKind;
use assetstream::resource::{LoadPolicy, Progress, ResourceGroup, ResourceState};
use common::{mock_registry, new_log, take_calls, CallLog, MockResource, Step};

fn group(log: &CallLog, name: &str, path: &str, resources: &[(&str, &str)]) -> ResourceGroup {
    let registry = Arc::new(mock_registry(LoadPolicy::All, log));
    let mut group = ResourceGroup::named(registry, name, path);
    for (type_name, resource_name) in resources {
        group.add_resource(MockResource::named(type_name, resource_name, log).handle());
    }
    group
}

fn slots(group: &ResourceGroup) -> Vec<(String, String)> {
    group
        .resources("")
        .iter()
        .map(|handle| {
            let resource = handle.lock();
            (resource.type_name().to_string(), resource.name().to_string())
        })
        .collect()
}

#[test]
fn override_replaces_matching_and_appends_new() {
    let log = new_log();
    let mut base = group(&log, "a", "a.json", &[("mock", "x"), ("other", "y")]);
    base.set_overridable(true);
    let patch = group(&log, "b", "b.json", &[("mock", "x"), ("third", "z")]);

    let original_y = base.resource("other", "y").unwrap();
    base.override_by(&patch).unwrap();

    assert_eq!(
        slots(&base),
        vec![
            ("mock".to_string(), "x".to_string()),
            ("other".to_string(), "y".to_string()),
            ("third".to_string(), "z".to_string()),
        ]
    );
    let x = base.resource("mock", "x").unwrap();
    assert!(Arc::ptr_eq(&x, &patch.resource("mock", "x").unwrap()));
    assert!(Arc::ptr_eq(
        &base.resource("other", "y").unwrap(),
        &original_y
    ));
    assert!(Arc::ptr_eq(
        &base.resource("third", "z").unwrap(),
        &patch.resource("third", "z").unwrap()
    ));
    assert_eq!(patch.len(), 2);
}

#[test]
fn overridden_resource_is_shared() {
    let log = new_log();
    let mut base = group(&log, "a", "a.json", &[("mock", "x")]);
    base.set_overridable(true);
    let mut patch = group(&log, "b", "b.json", &[("mock", "x")]);
    base.override_by(&patch).unwrap();

    assert_eq!(base.load().unwrap(), Progress::Complete);
    assert_eq!(take_calls(&log), vec!["load:x"]);

    // the object loaded through `base` is the one `patch` holds
    let shared = patch.resource("mock", "x").unwrap();
    assert_eq!(shared.lock().state(), ResourceState::Loaded);

    // `patch` skips it because it is already loaded
    assert_eq!(patch.load().unwrap(), Progress::Complete);
    assert!(take_calls(&log).is_empty());

    base.unload().unwrap();
    assert_eq!(shared.lock().state(), ResourceState::Unloaded);
    patch.unload().unwrap();
    assert_eq!(take_calls(&log), vec!["unload:x"]);
}

#[test]
fn override_requires_overridable_target() {
    let log = new_log();
    let mut base = group(&log, "a", "a.json", &[("mock", "x")]);
    let patch = group(&log, "b", "b.json", &[("mock", "y")]);

    let err = base.override_by(&patch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert_eq!(base.len(), 1);
}

#[test]
fn override_from_same_path_is_a_conflict() {
    let log = new_log();
    let mut base = group(&log, "a", "shared.json", &[("mock", "x")]);
    base.set_overridable(true);
    let patch = group(&log, "b", "shared.json", &[("mock", "y")]);

    let err = base.override_by(&patch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(slots(&base), vec![("mock".to_string(), "x".to_string())]);
}

#[test]
fn override_with_empty_group_changes_nothing() {
    let log = new_log();
    let mut base = group(&log, "a", "a.json", &[("mock", "x")]);
    base.set_overridable(true);
    let patch = group(&log, "b", "b.json", &[]);

    base.override_by(&patch).unwrap();
    assert_eq!(base.len(), 1);
}

#[test]
fn failed_load_keeps_resources_loaded_by_other_group() {
    let log = new_log();
    let mut owner = group(&log, "b", "b.json", &[("mock", "shared")]);
    assert_eq!(owner.load().unwrap(), Progress::Complete);
    take_calls(&log);

    let mut base = group(&log, "a", "a.json", &[]);
    base.set_overridable(true);
    base.override_by(&owner).unwrap();
    base.add_resource(
        MockResource::named("mock", "bad", &log)
            .with_script(&[Step::Fail])
            .handle(),
    );

    assert!(base.load().is_err());
    assert_eq!(take_calls(&log), vec!["load:bad"]);

    let shared = owner.resource("mock", "shared").unwrap();
    assert_eq!(shared.lock().state(), ResourceState::Loaded);
    assert!(owner.is_loaded());
    owner.unload().unwrap();
}

#[test]
fn cancel_load_keeps_resources_loaded_by_other_group() {
    let log = new_log();
    let mut owner = group(&log, "b", "b.json", &[("mock", "shared")]);
    assert_eq!(owner.load().unwrap(), Progress::Complete);

    let mut base = group(&log, "a", "a.json", &[]);
    base.set_overridable(true);
    base.add_resource(
        MockResource::named("mock", "slow", &log)
            .with_script(&[Step::Pending])
            .handle(),
    );
    base.override_by(&owner).unwrap();
    take_calls(&log);

    assert_eq!(base.load().unwrap(), Progress::Pending);
    base.cancel_load().unwrap();
    assert_eq!(take_calls(&log), vec!["load:slow", "unload:slow"]);
    assert_eq!(
        owner.resource("mock", "shared").unwrap().lock().state(),
        ResourceState::Loaded
    );
    owner.unload().unwrap();
}
