use super::helpers::{delay, expected, EventLog};
use synchd::{ScopeKey, Synchd};

#[tokio::test(start_paused = true)]
async fn test_bound_calls_are_serialized_with_their_own_arguments() {
    let synchd = Synchd::new();
    let log = EventLog::default();

    let l = log.clone();
    let foobar = synchd.bind(ScopeKey::new("bound"), move |(x, y): (u32, &'static str)| {
        let l = l.clone();
        async move {
            l.record(format!("start {} {}", x, y));
            delay(30).await;
            l.record(format!("end {} {}", x, y));
            x * 10
        }
    });

    let first = foobar.call((1, "one"));
    let second = foobar.call((2, "two"));
    delay(120).await;

    assert_eq!(
        log.events(),
        expected(&["start 1 one", "end 1 one", "start 2 two", "end 2 two"])
    );
    assert_eq!(first.await, 10);
    assert_eq!(second.await, 20);
}

#[tokio::test(start_paused = true)]
async fn test_bound_calls_share_the_key_with_direct_submissions() {
    let synchd = Synchd::new();
    let key = ScopeKey::new("mixed");
    let log = EventLog::default();

    let l = log.clone();
    let record = synchd.bind(key.clone(), move |name: String| {
        let l = l.clone();
        async move {
            delay(10).await;
            l.record(name);
        }
    });
    let cloned = record.clone();
    assert_eq!(cloned.key(), &key);

    let _a = record.call("bound a".to_string());
    let l = log.clone();
    let _b = synchd.submit(key.clone(), move || async move {
        l.record("direct b");
    });
    let c = cloned.call("clone c".to_string());

    assert_eq!(synchd.pending(&key), 3);
    c.await;
    assert_eq!(
        log.events(),
        expected(&["bound a", "direct b", "clone c"])
    );
}

#[tokio::test(start_paused = true)]
async fn test_bound_task_as_plain_closure() {
    let synchd = Synchd::new();
    let double = synchd
        .bind(ScopeKey::new("closure"), |n: i64| async move {
            delay(5).await;
            Ok::<_, String>(n * 2)
        })
        .into_fn();

    let outcomes: Vec<_> = (1..=3).map(&double).collect();
    let results = futures::future::join_all(outcomes).await;
    assert_eq!(results, vec![Ok(2), Ok(4), Ok(6)]);
}
