use super::helpers::{delay, EventLog};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use synchd::{ScopeKey, Synchd};

fn enqueue(synchd: Synchd<ScopeKey>, key: ScopeKey, log: EventLog, runs: Arc<AtomicUsize>) {
    let inner = synchd.clone();
    let inner_key = key.clone();
    let _detached = synchd.submit(key, move || {
        let run = runs.fetch_add(1, Ordering::SeqCst);
        log.record(format!("start {}", run));

        if run == 0 {
            enqueue(inner, inner_key, log.clone(), runs.clone());
        }

        async move {
            delay(50).await;
            log.record(format!("end {}", run));
        }
    });
}

#[tokio::test(start_paused = true)]
async fn test_reentrant_submission_waits_for_current_task() {
    let synchd = Synchd::new();
    let key = ScopeKey::new("reentrant");
    let log = EventLog::default();

    enqueue(
        synchd.clone(),
        key.clone(),
        log.clone(),
        Arc::new(AtomicUsize::new(0)),
    );
    delay(150).await;

    assert_eq!(log.events(), vec!["start 0", "end 0", "start 1", "end 1"]);
    assert!(synchd.is_idle(&key));
}

#[tokio::test(start_paused = true)]
async fn test_reentrant_submission_from_async_body() {
    let synchd = Synchd::new();
    let key = ScopeKey::new("nested");
    let log = EventLog::default();

    let inner = synchd.clone();
    let inner_key = key.clone();
    let l = log.clone();
    let outer = synchd.submit(key.clone(), move || async move {
        l.record("outer start");
        delay(10).await;

        let nested_log = l.clone();
        let nested = inner.submit(inner_key, move || async move {
            nested_log.record("nested");
        });
        assert_eq!(inner.pending(&key), 2);

        delay(10).await;
        l.record("outer end");
        nested
    });

    // Awaiting the nested handle inside the outer task would deadlock the key,
    // so it is handed back and awaited here.
    let nested = outer.await;
    nested.await;
    assert_eq!(log.events(), vec!["outer start", "outer end", "nested"]);
}
