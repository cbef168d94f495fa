// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process handle lifecycle as seen by calling code.

use crate::prelude::*;

fn register_one(definition: Definition) -> (fakeproc::Scope, fakeproc::Recorder) {
    let scope = Dispatcher::global().context();
    let recorder = scope.register("proc", definition).unwrap();
    (scope, recorder)
}

/// Line lists gain separators, raw strings do not.
#[test]
#[serial]
fn stream_round_trip() {
    let scope = Dispatcher::global().context();
    scope.register("lines", Definition::new().stdout(["line1", "line2"])).unwrap();
    scope.register("raw", Definition::new().stdout("raw")).unwrap();

    let mut lines = run(&["lines"]).unwrap();
    let out = lines.communicate(None, None).unwrap();
    assert_eq!(
        out.stdout.unwrap(),
        format!("line1{sep}line2{sep}", sep = fakeproc_core::LINE_SEPARATOR).as_str()
    );

    let mut raw = run(&["raw"]).unwrap();
    assert_eq!(raw.communicate(None, None).unwrap().stdout.unwrap(), "raw");
}

#[test]
#[serial]
fn signals_keep_order_and_callback_sets_code() {
    let (_scope, recorder) = register_one(Definition::new().signal_callback(|control, sig| {
        if sig == Signal::SIGTERM {
            control.set_returncode(143);
        }
        Ok(())
    }));

    let mut process = run(&["proc"]).unwrap();
    process.send_signal(Signal::SIGTERM).unwrap();
    process.send_signal(Signal::SIGINT).unwrap();

    assert_eq!(process.received_signals(), vec![Signal::SIGTERM, Signal::SIGINT]);
    assert_eq!(process.wait(None).unwrap(), 143);

    let child: FakeChild = recorder.last_call().unwrap();
    assert_eq!(child.received_signals(), vec![Signal::SIGTERM, Signal::SIGINT]);
}

#[test]
#[serial]
fn delayed_process_times_out_and_recovers() {
    let (_scope, _) = register_one(Definition::new().delay(Duration::from_millis(150)).returncode(7));

    let mut process = run(&["proc"]).unwrap();
    assert_eq!(process.poll(), None);
    assert!(matches!(
        process.wait(Some(Duration::from_millis(5))),
        Err(ProcessError::Timeout { .. })
    ));
    assert_eq!(process.wait(Some(Duration::from_secs(5))).unwrap(), 7);
    assert_eq!(process.poll(), Some(7));
}

#[test]
#[serial]
fn callback_error_observed_once() {
    let (_scope, _) = register_one(Definition::new().callback(|control, _| {
        control.set_returncode(3);
        Err("callback exploded".into())
    }));

    let mut process = run(&["proc"]).unwrap();
    let err = process.communicate(None, Some(Duration::from_secs(5))).unwrap_err();
    assert_eq!(err.to_string(), "process callback failed: callback exploded");
    assert_eq!(process.wait(None).unwrap(), 3);
}

#[test]
#[serial]
fn stdin_callback_answers_input() {
    let (_scope, _) = register_one(Definition::new().stdin_callback(|input| {
        let reply = format!("got {}", String::from_utf8_lossy(input));
        Ok(StdinResponse::new().stdout(reply))
    }));

    let mut process = run(&["proc"]).unwrap();
    let out = process.communicate(Some(b"data"), None).unwrap();
    assert_eq!(out.stdout.unwrap(), "got data");
}

#[test]
#[serial]
fn callback_kwargs_reach_callback() {
    let (_scope, _) = register_one(
        Definition::new().callback_arg("code", 12).callback(|control, args| {
            let code = args.get("code").and_then(|v| v.as_i64()).unwrap_or_default();
            control.set_returncode(code as i32);
            Ok(())
        }),
    );
    let mut process = run(&["proc"]).unwrap();
    assert_eq!(process.wait(Some(Duration::from_secs(5))).unwrap(), 12);
}

#[tokio::test]
#[serial]
async fn async_wait_on_recorded_handle() {
    let (_scope, recorder) =
        register_one(Definition::new().delay(Duration::from_millis(20)).returncode(4));
    run(&["proc"]).unwrap();

    let child = recorder.first_call().unwrap();
    assert_eq!(child.wait_async(Some(Duration::from_secs(5))).await.unwrap(), 4);
}
