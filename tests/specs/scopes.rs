// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nested registry scopes on the global dispatcher.

use crate::prelude::*;

#[test]
#[serial]
fn exited_scope_never_resolves() {
    let _outer = Dispatcher::global().context();
    {
        let inner = Dispatcher::global().context();
        inner.register("build", Definition::new().occurrences(3)).unwrap();
        assert!(run(&["build"]).is_ok());
    }
    assert!(matches!(run(&["build"]), Err(DispatchError::NotRegistered { .. })));
}

#[test]
#[serial]
fn exited_scope_falls_through_to_outer() {
    let outer = Dispatcher::global().context();
    outer.register("build", Definition::new().stdout("outer")).unwrap();
    {
        let inner = outer.context();
        inner.register("build", Definition::new().stdout("inner")).unwrap();
        assert_eq!(stdout(run(&["build"]).unwrap().as_ref()), "inner");
    }
    assert_eq!(stdout(run(&["build"]).unwrap().as_ref()), "outer");
}

#[test]
#[serial]
fn nested_scope_borrows_outer_definitions() {
    let outer = Dispatcher::global().context();
    outer.register("deploy", Definition::new()).unwrap();
    {
        let _inner = outer.context();
        run(&["deploy"]).unwrap();
        assert!(run(&["deploy"]).is_err());
    }
    assert!(run(&["deploy"]).is_ok());
    assert_eq!(outer.call_count("deploy"), 3);
}

#[test]
#[serial]
fn scope_is_popped_when_test_code_panics() {
    let result = std::panic::catch_unwind(|| {
        let _scope = Dispatcher::global().context();
        panic!("test body failed");
    });
    assert!(result.is_err());
    assert_eq!(Dispatcher::global().depth(), 0);
}

#[test]
#[serial]
fn policy_does_not_leak_between_scopes() {
    {
        let first = Dispatcher::global().context();
        first.allow_unregistered(true);
    }
    let _second = Dispatcher::global().context();
    assert!(run(&["definitely-not-registered"]).is_err());
}

#[test]
#[serial]
fn registry_is_empty_after_exit() {
    let registry = Registry::new();
    registry.register("x", Definition::new()).unwrap();
    {
        let _scope = registry.enter();
        run(&["x"]).unwrap();
    }
    assert!(registry.calls().is_empty());
    assert_eq!(registry.remaining("x"), 0);
}
