use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use synchd::{Synchd, SynchdSettings};

const KEYS: usize = 8;
const TASKS_PER_KEY: usize = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_key_order_holds_on_worker_threads() {
    let synchd = Synchd::new().with_settings(SynchdSettings {
        backlog_warn_threshold: 16,
        metrics_enabled: true,
    });
    let seen: Arc<Mutex<HashMap<usize, Vec<usize>>>> = Arc::default();
    let busy: Arc<Vec<AtomicBool>> =
        Arc::new((0..KEYS).map(|_| AtomicBool::new(false)).collect());
    let overlaps = Arc::new(AtomicUsize::new(0));

    let mut outcomes = Vec::new();
    for i in 0..TASKS_PER_KEY {
        for key in 0..KEYS {
            let seen = seen.clone();
            let busy = busy.clone();
            let overlaps = overlaps.clone();
            outcomes.push(synchd.submit(key, move || async move {
                if busy[key].swap(true, Ordering::SeqCst) {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                tokio::task::yield_now().await;
                seen.lock().entry(key).or_default().push(i);
                busy[key].store(false, Ordering::SeqCst);
            }));
        }
    }

    futures::future::join_all(outcomes).await;

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    let seen = seen.lock();
    for key in 0..KEYS {
        let expected: Vec<usize> = (0..TASKS_PER_KEY).collect();
        assert_eq!(seen[&key], expected, "key {} ran out of order", key);
    }
    assert_eq!(synchd.active_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_never_overlap_on_a_key() {
    let synchd = Synchd::new();
    let inside = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..4)
        .map(|_| {
            let synchd = synchd.clone();
            let inside = inside.clone();
            let overlaps = overlaps.clone();
            let completed = completed.clone();
            tokio::spawn(async move {
                let mut outcomes = Vec::new();
                for _ in 0..25 {
                    let inside = inside.clone();
                    let overlaps = overlaps.clone();
                    let completed = completed.clone();
                    outcomes.push(synchd.submit("shared", move || async move {
                        if inside.swap(true, Ordering::SeqCst) {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        tokio::task::yield_now().await;
                        inside.store(false, Ordering::SeqCst);
                        completed.fetch_add(1, Ordering::SeqCst);
                    }));
                    tokio::task::yield_now().await;
                }
                futures::future::join_all(outcomes).await;
            })
        })
        .collect();

    for submitter in submitters {
        submitter.await.unwrap();
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(completed.load(Ordering::SeqCst), 100);
    assert!(synchd.is_idle(&"shared"));
}
