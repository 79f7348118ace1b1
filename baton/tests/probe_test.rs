// Synchronous probes: completion strictly after the probed operation and
// everything appended before it

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use baton::{ActorExt, ProbeError};

use test_helpers::{Recorder, WAIT};

#[test]
fn test_probe_signals_after_earlier_operations() -> Result<()> {
    let recorder = Recorder::new("probed");
    let (started_tx, started_rx) = flume::bounded::<()>(0);
    let (release_tx, release_rx) = flume::bounded::<()>(0);
    let finished = Arc::new(AtomicUsize::new(0));

    let drainer = {
        let (recorder, finished) = (recorder.clone(), finished.clone());
        thread::spawn(move || {
            recorder.inbox.enqueue_external(move || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                finished.fetch_add(1, Ordering::SeqCst);
            });
        })
    };
    started_rx.recv_timeout(WAIT)?;

    for tag in 0..5 {
        recorder.push(None, tag);
    }
    let (r, f) = (recorder.clone(), finished.clone());
    let probe = recorder.sync_exec(move || (f.load(Ordering::SeqCst), r.log.with(|log| log.len())));
    assert!(!probe.is_complete());

    release_tx.send(())?;
    let (done_before, logged_before) = probe.wait_timeout(WAIT)?;
    assert_eq!(done_before, 1);
    assert_eq!(logged_before, 5);

    drainer.join().unwrap();
    Ok(())
}

#[test]
fn test_timeout_leaves_operation_queued() -> Result<()> {
    let recorder = Recorder::new("slow");
    let (started_tx, started_rx) = flume::bounded::<()>(0);
    let (release_tx, release_rx) = flume::bounded::<()>(0);

    let drainer = {
        let recorder = recorder.clone();
        thread::spawn(move || {
            recorder.inbox.enqueue_external(move || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            });
        })
    };
    started_rx.recv_timeout(WAIT)?;

    let r = recorder.clone();
    let probe = recorder.sync_exec(move || r.log.with(|log| log.push(1)));
    let short = Duration::from_millis(10);
    assert_eq!(probe.wait_timeout(short), Err(ProbeError::Timeout(short)));
    assert_eq!(recorder.inbox.len(), 1);

    release_tx.send(())?;
    probe.wait_timeout(WAIT)?;
    drainer.join().unwrap();
    assert_eq!(recorder.snapshot(), vec![1]);
    Ok(())
}

#[test]
fn test_probes_queued_on_dropped_inbox_are_abandoned() {
    let doomed = Arc::new(baton::Inbox::new());
    let (hold_tx, hold_rx) = flume::bounded::<()>(0);
    let (go_tx, go_rx) = flume::bounded::<()>(0);

    let holder = {
        let doomed = doomed.clone();
        thread::spawn(move || {
            doomed.enqueue_external(move || {
                hold_tx.send(()).unwrap();
                go_rx.recv().unwrap();
                panic!("drain abandoned on purpose");
            });
        })
    };
    hold_rx.recv_timeout(WAIT).unwrap();
    let first = doomed.sync_exec(|| ());
    let second = doomed.sync_exec(|| ());

    go_tx.send(()).unwrap();
    assert!(holder.join().is_err());
    // The panicking drain released the inbox with both probes still queued.
    assert!(!doomed.is_running());
    assert_eq!(doomed.len(), 2);

    drop(doomed);
    assert_eq!(first.wait(), Err(ProbeError::Abandoned));
    assert_eq!(second.wait(), Err(ProbeError::Abandoned));
}

#[test]
fn test_operations_left_by_panicked_drain_wait_for_next_send() -> Result<()> {
    let inbox = Arc::new(baton::Inbox::new());
    let (hold_tx, hold_rx) = flume::bounded::<()>(0);
    let (go_tx, go_rx) = flume::bounded::<()>(0);

    let holder = {
        let inbox = inbox.clone();
        thread::spawn(move || {
            inbox.enqueue_external(move || {
                hold_tx.send(()).unwrap();
                go_rx.recv().unwrap();
                panic!("drain abandoned on purpose");
            });
        })
    };
    hold_rx.recv_timeout(WAIT)?;
    let left = inbox.sync_exec(|| 7);

    go_tx.send(())?;
    assert!(holder.join().is_err());

    // Nothing drains the inbox until someone sends to it again.
    assert!(!left.is_complete());
    assert!(!left.is_abandoned());
    assert_eq!(
        left.wait_timeout(Duration::from_millis(50)),
        Err(ProbeError::Timeout(Duration::from_millis(50)))
    );

    inbox.enqueue_external(|| {});
    assert!(left.is_complete());
    assert_eq!(left.wait_timeout(WAIT), Ok(7));
    assert!(inbox.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_async_caller_awaits_probe() -> Result<()> {
    let recorder = Recorder::new("async");
    for tag in 0..3 {
        recorder.push(None, tag);
    }
    let r = recorder.clone();
    let log = recorder.sync_exec(move || r.log.with(|log| log.clone())).await?;
    assert_eq!(log, vec![0, 1, 2]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_await_while_another_thread_drains() -> Result<()> {
    let recorder = Recorder::new("async-busy");
    let (started_tx, started_rx) = flume::bounded::<()>(0);
    let (release_tx, release_rx) = flume::bounded::<()>(0);

    let drainer = {
        let recorder = recorder.clone();
        thread::spawn(move || {
            let me = recorder.clone();
            recorder.inbox.enqueue_external(move || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                me.log.with(|log| log.push(1));
            });
        })
    };
    started_rx.recv_async().await?;

    let r = recorder.clone();
    let probe = recorder.sync_exec(move || r.log.with(|log| log.clone()));
    release_tx.send_async(()).await?;
    assert_eq!(probe.await?, vec![1]);

    drainer.join().unwrap();
    Ok(())
}
