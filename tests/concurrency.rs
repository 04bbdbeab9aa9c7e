//! Subscriber churn racing in-flight dispatches.

use std::sync::Once;
use std::time::Duration;

use futures::future::join_all;
use sluice::{hard, recv, soft, sure, Context, Signal, Slot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "sluice=info".into()),
            ))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// Subscribes `subscribers` times from separate tasks while `producers`
/// tasks keep dispatching, closing every third subscription.
async fn churn<S: Slot<u64>>(signal: Signal<u64, S>, subscribers: usize, producers: usize) {
    init_tracing();
    let ctx = Context::new();

    let producer_tasks: Vec<_> = (0..producers)
        .map(|p| {
            let signal = signal.clone();
            let ctx = ctx.child();
            tokio::spawn(async move {
                for i in 0..200u64 {
                    let ctx = ctx.child().with_timeout(Duration::from_millis(5));
                    // Sure dispatches may time out on idle subscribers; that is fine here.
                    let _ = signal.dispatch(&ctx, p as u64 * 1_000 + i).await;
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    let subscriber_tasks: Vec<_> = (0..subscribers)
        .map(|n| {
            let signal = signal.clone();
            tokio::spawn(async move {
                let (rx, closer) = signal.subscribe(n % 3);
                if n % 3 == 0 {
                    closer.close().unwrap();
                }
                (rx, closer)
            })
        })
        .collect();

    let subs: Vec<_> = join_all(subscriber_tasks)
        .await
        .into_iter()
        .map(|r| r.expect("subscriber task should not panic"))
        .collect();

    for res in join_all(producer_tasks).await {
        res.expect("producer task should not panic");
    }

    let closed_by_hand = (0..subscribers).filter(|n| n % 3 == 0).count();
    let open: Vec<_> = subs.iter().filter(|(_, c)| !c.is_closed()).collect();
    // Hard slots may also have closed themselves on overflow.
    assert!(open.len() <= subscribers - closed_by_hand);
    assert_eq!(signal.subscriber_count(), open.len());

    // One more subscribe prunes every closed slot and loses none of the live ones.
    let (_rx, _last) = signal.subscribe(1);
    assert_eq!(signal.slot_count(), open.len() + 1);
    assert_eq!(signal.subscriber_count(), open.len() + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn soft_concurrent_subscribe_keeps_every_slot() {
    let signal = soft::<u64>();
    churn(signal.clone(), 64, 4).await;

    // Soft slots never close themselves.
    assert_eq!(signal.subscriber_count(), 64 - 22 + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hard_concurrent_subscribe_keeps_every_slot() {
    churn(hard::<u64>(), 64, 4).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sure_concurrent_subscribe_keeps_every_slot() {
    let signal = sure::<u64>();
    churn(signal.clone(), 64, 4).await;

    // Sure slots never close themselves.
    assert_eq!(signal.subscriber_count(), 64 - 22 + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribe_without_dispatch_is_exact() {
    init_tracing();
    let signal = soft::<u32>();

    let tasks: Vec<_> = (0..128)
        .map(|_| {
            let signal = signal.clone();
            tokio::spawn(async move { signal.subscribe(1) })
        })
        .collect();
    let subs: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(signal.slot_count(), 128);
    assert_eq!(signal.dispatch(&Context::new(), 1).await, Ok(128));
    for (rx, _) in &subs {
        assert_eq!(rx.try_recv().unwrap(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn close_during_dispatch_never_hangs() {
    init_tracing();

    async fn run<S: Slot<u32>>(signal: Signal<u32, S>) {
        let subs: Vec<_> = (0..16).map(|n| signal.subscribe(n % 2)).collect();

        let producer = {
            let signal = signal.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    let ctx = Context::new().with_timeout(Duration::from_millis(20));
                    let _ = signal.dispatch(&ctx, i).await;
                }
            })
        };

        for (_, closer) in &subs {
            tokio::time::sleep(Duration::from_millis(1)).await;
            closer.close().unwrap();
        }

        tokio::time::timeout(Duration::from_secs(10), producer)
            .await
            .expect("dispatch loop should finish")
            .expect("dispatch loop should not panic");
        assert_eq!(signal.subscriber_count(), 0);
        assert_eq!(signal.dispatch(&Context::new(), 0).await, Ok(0));
    }

    run(soft::<u32>()).await;
    run(hard::<u32>()).await;
    run(sure::<u32>()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_subscriber_order_is_fifo() {
    init_tracing();
    let signal = sure::<u32>();
    let (rx, closer) = signal.subscribe(8);

    let consumer = tokio::spawn(async move {
        let ctx = Context::new().with_timeout(Duration::from_secs(5));
        let mut seen = Vec::new();
        while seen.len() < 1_000 {
            match recv(&ctx, &rx).await {
                Some(v) => seen.push(v),
                None => break,
            }
        }
        seen
    });

    for i in 0..1_000 {
        assert_eq!(signal.dispatch(&Context::new(), i).await, Ok(1));
    }

    let seen = consumer.await.unwrap();
    assert_eq!(seen, (0..1_000).collect::<Vec<_>>());
    closer.close().unwrap();
}
