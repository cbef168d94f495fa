// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use fakeproc_core::LINE_SEPARATOR;

use crate::StdinResponse;

fn start(definition: Definition) -> FakeChild {
    start_with(definition, &SpawnOptions::default())
}

fn start_with(definition: Definition, options: &SpawnOptions) -> FakeChild {
    FakeChild::start(Invocation::from(["cmd", "arg"]), 7, definition, options)
}

#[test]
fn finishes_synchronously_without_delay_or_callback() {
    let child = start(Definition::new().returncode(3));
    assert_eq!(child.poll(), Some(3));
    assert_eq!(child.returncode(), Some(3));
    assert_eq!(child.wait(None).unwrap(), 3);
}

#[test]
fn args_and_pid_are_the_invoked_ones() {
    let child = start(Definition::new());
    assert_eq!(child.args(), &["cmd", "arg"]);
    assert_eq!(child.pid(), 7);
}

#[test]
fn line_list_round_trips_through_communicate() {
    let child = start(Definition::new().stdout(["line1", "line2"]));
    let out = child.communicate(None, None).unwrap();
    let expected = format!("line1{LINE_SEPARATOR}line2{LINE_SEPARATOR}");
    assert_eq!(out.stdout.unwrap(), expected.as_str());
    assert_eq!(out.stderr.unwrap(), "");
}

#[test]
fn raw_text_gets_no_separator() {
    let child = start(Definition::new().stdout("raw"));
    assert_eq!(child.communicate(None, None).unwrap().stdout.unwrap(), "raw");
}

#[test]
fn text_mode_reports_text() {
    let child = start_with(Definition::new().stdout("hi"), &SpawnOptions::new().text(true));
    assert!(child.is_text());
    assert_eq!(child.stdout(), Some(StreamData::Text("hi".into())));
}

#[test]
fn binary_mode_reports_bytes() {
    let child = start(Definition::new().stdout("hi"));
    assert_eq!(child.stdout(), Some(StreamData::Bytes(b"hi".to_vec())));
}

#[test]
fn universal_newlines_normalizes_crlf() {
    let opts = SpawnOptions::new().universal_newlines(true);
    let child = start_with(Definition::new().stdout("a\r\nb\r\n"), &opts);
    assert_eq!(child.stdout().unwrap(), "a\nb\n");
}

#[yare::parameterized(
    null    = { Redirect::Null },
    inherit = { Redirect::Inherit },
)]
fn unpiped_stdout_is_absent(redirect: Redirect) {
    let opts = SpawnOptions::new().stdout(redirect);
    let child = start_with(Definition::new().stdout("x"), &opts);
    assert_eq!(child.stdout(), None);
    assert_eq!(child.communicate(None, None).unwrap().stdout, None);
}

#[test]
fn stderr_merges_after_stdout() {
    let opts = SpawnOptions::new().stderr(StderrRedirect::Stdout);
    let child = start_with(Definition::new().stdout("out").stderr("err"), &opts);
    assert_eq!(child.stdout().unwrap(), "outerr");
    assert_eq!(child.stderr(), None);
}

#[test]
fn delayed_handle_times_out_then_completes() {
    let child = start(Definition::new().returncode(2).delay(Duration::from_millis(200)));
    assert_eq!(child.poll(), None);

    let err = child.wait(Some(Duration::from_millis(10))).unwrap_err();
    assert!(matches!(err, ProcessError::Timeout { .. }));
    assert_eq!(err.to_string(), "Command 'cmd arg' timed out after 0.01 seconds");
    assert_eq!(child.poll(), None);

    assert_eq!(child.wait(None).unwrap(), 2);
    assert_eq!(child.poll(), Some(2));
}

#[test]
fn callback_return_code_wins() {
    let child = start(Definition::new().returncode(0).callback(|control, _| {
        control.set_returncode(5);
        Ok(())
    }));
    assert_eq!(child.wait(Some(Duration::from_secs(5))).unwrap(), 5);
}

#[test]
fn callback_receives_kwargs_and_can_write_output() {
    let child = start(
        Definition::new()
            .stdout("start ")
            .callback_arg("word", "appended")
            .callback(|control, args| {
                let word = args.get("word").and_then(|v| v.as_str()).unwrap_or_default();
                control.write_stdout(word.to_string());
                Ok(())
            }),
    );
    let out = child.communicate(None, Some(Duration::from_secs(5))).unwrap();
    assert_eq!(out.stdout.unwrap(), "start appended");
}

#[test]
fn callback_error_is_raised_exactly_once() {
    let child = start(Definition::new().callback(|control, _| {
        control.set_returncode(9);
        Err("boom".into())
    }));

    let err = child.wait(Some(Duration::from_secs(5))).unwrap_err();
    assert!(matches!(err, ProcessError::Callback(_)));
    assert_eq!(err.to_string(), "process callback failed: boom");

    assert_eq!(child.wait(None).unwrap(), 9);
}

#[test]
fn callback_error_surfaces_from_communicate() {
    let child = start(Definition::new().callback(|_, _| Err("bad".into())));
    let err = child.communicate(None, Some(Duration::from_secs(5))).unwrap_err();
    assert!(matches!(err, ProcessError::Callback(_)));
    assert!(child.communicate(None, None).is_ok());
}

#[test]
fn callback_panic_is_deferred() {
    let child = start(Definition::new().callback(|_, _| panic!("exploded")));
    let err = child.wait(Some(Duration::from_secs(5))).unwrap_err();
    assert!(err.to_string().contains("exploded"));
}

#[test]
fn signal_callback_panic_is_deferred() {
    let child = start(Definition::new().signal_callback(|_, _| panic!("signal boom")));
    child.terminate().unwrap();
    assert_eq!(child.received_signals(), vec![Signal::SIGTERM]);
    let err = child.wait(None).unwrap_err();
    assert!(matches!(err, ProcessError::Callback(_)));
    assert!(err.to_string().contains("signal boom"));
    assert_eq!(child.wait(None).unwrap(), 0);
}

#[test]
fn stdin_callback_panic_is_deferred() {
    let child = start(Definition::new().stdout("kept").stdin_callback(|_| panic!("stdin boom")));
    let err = child.communicate(Some(b"x"), None).unwrap_err();
    assert!(err.to_string().contains("stdin boom"));
    assert_eq!(child.communicate(None, None).unwrap().stdout.unwrap(), "kept");
}

#[test]
fn unbounded_timeout_waits_for_completion() {
    let child = start(Definition::new().returncode(4).delay(Duration::from_millis(50)));
    assert_eq!(child.wait(Some(Duration::MAX)).unwrap(), 4);
}

#[test]
fn delay_then_callback() {
    let ran = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&ran);
    let child = start(Definition::new().delay(Duration::from_millis(30)).callback(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    child.wait(None).unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn stdin_callback_appends_to_buffers() {
    let child = start(Definition::new().stdout("a").stdin_callback(|input| {
        let echoed = String::from_utf8_lossy(input).to_uppercase();
        Ok(StdinResponse::new().stdout(echoed).stderr("note"))
    }));
    let out = child.communicate(Some(b"ping"), None).unwrap();
    assert_eq!(out.stdout.unwrap(), "aPING");
    assert_eq!(out.stderr.unwrap(), "note");
}

#[test]
fn stdin_callback_skipped_without_input() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let child = start(Definition::new().stdin_callback(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(StdinResponse::new())
    }));
    child.communicate(None, None).unwrap();
    child.communicate(Some(b""), None).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn stdin_callback_error_is_deferred_to_communicate() {
    let child = start(Definition::new().stdin_callback(|_| Err("no stdin".into())));
    let err = child.communicate(Some(b"x"), None).unwrap_err();
    assert_eq!(err.to_string(), "process callback failed: no stdin");
}

#[test]
fn signals_are_logged_in_order_with_duplicates() {
    let child = start(Definition::new());
    child.send_signal(Signal::SIGTERM).unwrap();
    child.send_signal(Signal::SIGINT).unwrap();
    child.terminate().unwrap();
    child.kill().unwrap();
    assert_eq!(
        child.received_signals(),
        vec![Signal::SIGTERM, Signal::SIGINT, Signal::SIGTERM, Signal::SIGKILL]
    );
}

#[test]
fn signal_callback_sets_return_code_after_completion() {
    let child = start(Definition::new().signal_callback(|control, sig| {
        if sig == Signal::SIGTERM {
            control.set_returncode(-15);
        }
        Ok(())
    }));
    assert_eq!(child.wait(None).unwrap(), 0);
    child.terminate().unwrap();
    child.send_signal(Signal::SIGINT).unwrap();
    assert_eq!(child.wait(None).unwrap(), -15);
}

#[test]
fn later_signal_callback_overwrites_code() {
    let child = start(Definition::new().signal_callback(|control, sig| {
        control.set_returncode(-(sig as i32));
        Ok(())
    }));
    child.terminate().unwrap();
    child.kill().unwrap();
    assert_eq!(child.wait(None).unwrap(), -9);
}

#[test]
fn signal_does_not_complete_pending_handle() {
    let child = start(Definition::new().delay(Duration::from_millis(200)));
    child.kill().unwrap();
    assert_eq!(child.poll(), None);
    assert_eq!(child.received_signals(), vec![Signal::SIGKILL]);
}

#[test]
fn signal_callback_error_is_deferred() {
    let child = start(Definition::new().signal_callback(|_, _| Err("sig".into())));
    child.terminate().unwrap();
    assert!(matches!(child.wait(None), Err(ProcessError::Callback(_))));
    assert_eq!(child.wait(None).unwrap(), 0);
}

#[test]
fn first_deferred_error_wins() {
    let child = start(Definition::new().signal_callback(|_, sig| Err(format!("{sig}").into())));
    child.terminate().unwrap();
    child.kill().unwrap();
    let err = child.wait(None).unwrap_err();
    assert_eq!(err.to_string(), "process callback failed: SIGTERM");
    assert!(child.wait(None).is_ok());
}

#[test]
fn clones_share_state() {
    let child = start(Definition::new());
    let other = child.clone();
    other.terminate().unwrap();
    assert_eq!(child.received_signals(), vec![Signal::SIGTERM]);
}

#[test]
fn process_trait_delegates() {
    let mut boxed: Box<dyn Process> = Box::new(start(Definition::new().returncode(4).stdout("o")));
    assert_eq!(boxed.poll(), Some(4));
    assert_eq!(boxed.wait(None).unwrap(), 4);
    boxed.terminate().unwrap();
    assert_eq!(boxed.received_signals(), vec![Signal::SIGTERM]);
    assert_eq!(boxed.communicate(None, None).unwrap().stdout.unwrap(), "o");
}

#[test]
fn concurrent_waiters_all_observe_completion() {
    let child = start(Definition::new().returncode(1).delay(Duration::from_millis(50)));
    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let c = child.clone();
            std::thread::spawn(move || c.wait(Some(Duration::from_secs(5))))
        })
        .collect();
    for waiter in waiters {
        assert_eq!(waiter.join().unwrap().unwrap(), 1);
    }
}

#[tokio::test]
async fn wait_async_resolves() {
    let child = start(Definition::new().returncode(6).delay(Duration::from_millis(20)));
    assert_eq!(child.wait_async(Some(Duration::from_secs(5))).await.unwrap(), 6);
}

#[tokio::test]
async fn communicate_async_feeds_stdin() {
    let child = start(
        Definition::new().stdin_callback(|input| Ok(StdinResponse::new().stdout(input.to_vec()))),
    );
    let out = child.communicate_async(Some(b"echo".to_vec()), None).await.unwrap();
    assert_eq!(out.stdout.unwrap(), "echo");
}
