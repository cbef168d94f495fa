// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matching and queue consumption through the global dispatcher.

use crate::prelude::*;

/// Two registrations of one command are served in order, then it is unregistered.
#[test]
#[serial]
fn command_served_first_second_then_fails() {
    let registry = Registry::new();
    registry.register("test", Definition::new().stdout("first").returncode(0)).unwrap();
    registry.register("test", Definition::new().stdout("second").returncode(1)).unwrap();
    let _scope = registry.enter();

    let mut first = run(&["test"]).unwrap();
    assert_eq!(stdout(first.as_ref()), "first");
    assert_eq!(first.wait(None).unwrap(), 0);

    let mut second = run(&["test"]).unwrap();
    assert_eq!(stdout(second.as_ref()), "second");
    assert_eq!(second.wait(None).unwrap(), 1);

    match run(&["test"]) {
        Err(DispatchError::NotRegistered { command }) => {
            assert_eq!(command, Invocation::from(["test"]))
        }
        other => panic!("expected NotRegistered, got {other:?}"),
    }
}

#[test]
#[serial]
fn occurrences_then_retain_last() {
    let registry = Registry::new();
    registry.retain_last(true);
    let recorder = registry.register("poll", Definition::new().stdout("tick").occurrences(2)).unwrap();
    let _scope = registry.enter();

    for _ in 0..5 {
        assert_eq!(stdout(run(&["poll"]).unwrap().as_ref()), "tick");
    }
    assert_eq!(recorder.call_count(), 5);
    assert_eq!(registry.remaining("poll"), 1);
}

#[test]
#[serial]
fn any_minimum_and_maximum() {
    let scope = Dispatcher::global().context();
    scope.retain_last(true);
    scope.register(pattern!["cp", Any::new().min(2)], Definition::new()).unwrap();
    scope.register(pattern!["cd", Any::new().max(1)], Definition::new()).unwrap();

    assert!(run(&["cp", "/a", "/b"]).is_ok());
    assert!(run(&["cp", "/a"]).is_err());
    assert!(run(&["cd", "~"]).is_ok());
    assert!(run(&["cd", "~", "/tmp"]).is_err());
}

#[test]
#[serial]
fn program_name_ignores_directory() {
    let scope = Dispatcher::global().context();
    let recorder = scope
        .register(pattern![Matcher::program("ls"), Any::new()], Definition::new().occurrences(2))
        .unwrap();

    run(&["ls", "-l"]).unwrap();
    run(&["/bin/ls", "-l"]).unwrap();

    let args: Vec<Invocation> = recorder.calls().iter().map(|c| c.args().clone()).collect();
    similar_asserts::assert_eq!(
        args,
        vec![Invocation::from(["ls", "-l"]), Invocation::from(["/bin/ls", "-l"])]
    );
}

#[test]
#[serial]
fn unregistered_message_names_literal_invocation() {
    let _scope = Dispatcher::global().context();
    let err = run(&["docker", "compose", "up"]).unwrap_err();
    assert_eq!(err.to_string(), "The process 'docker compose up' was not registered.");
}

#[test]
#[serial]
fn call_log_records_every_dispatch() {
    let scope = Dispatcher::global().context();
    scope.register("ok", Definition::new()).unwrap();
    run(&["ok"]).unwrap();
    let _ = run(&["missing"]);

    assert_eq!(scope.calls(), vec![Invocation::from(["ok"]), Invocation::from(["missing"])]);
    assert_eq!(Dispatcher::global().call_count(pattern![Any::new()]), 2);
}
