// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Exec` launch API over fake and real processes.

use crate::prelude::*;

#[test]
#[serial]
fn exec_is_faked_inside_scope() {
    init_tracing();
    let scope = Dispatcher::global().context();
    scope.register("git rev-parse HEAD", Definition::new().stdout(["abc123"])).unwrap();

    let output = Exec::new("git").args(["rev-parse", "HEAD"]).text(true).check_output().unwrap();
    assert_eq!(output.stdout.unwrap().lines(), vec!["abc123".to_string()]);
}

#[test]
#[serial]
fn check_status_reports_nonzero_exit() {
    let scope = Dispatcher::global().context();
    scope.register("make test", Definition::new().returncode(2)).unwrap();

    let err = Exec::shell("make test").check_status().unwrap_err();
    assert!(matches!(err, ExecError::NonZeroExit { code: 2, .. }));
}

#[test]
#[serial]
fn exec_runs_for_real_without_scope() {
    init_tracing();
    assert_eq!(Dispatcher::global().depth(), 0);
    let output = Exec::new("echo").arg("real").text(true).output().unwrap();
    assert_eq!(output.stdout.unwrap(), "real\n");
}

#[test]
#[serial]
fn pass_through_runs_real_process() {
    let scope = Dispatcher::global().context();
    scope.pass_through(pattern![Matcher::program("echo"), Any::new()], 1).unwrap();
    scope.register("echo hi", Definition::new().stdout("fake hi")).unwrap();

    let real = Exec::new("echo").arg("hi").text(true).output().unwrap();
    assert_eq!(real.stdout.unwrap(), "hi\n");

    let fake = Exec::new("echo").arg("hi").text(true).output().unwrap();
    assert_eq!(fake.stdout.unwrap(), "fake hi");
    assert_eq!(scope.call_count("echo hi"), 2);
}

#[test]
#[serial]
fn allow_unregistered_runs_shell_for_real() {
    let scope = Dispatcher::global().context();
    scope.allow_unregistered(true);
    let code = Exec::shell("exit 5").status().unwrap();
    assert_eq!(code, 5);
}
