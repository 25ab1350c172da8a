use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use syncscript_store::{StoreError, Ticker};

fn counting(counter: &Arc<AtomicU32>) -> impl FnMut() -> std::future::Ready<ControlFlow<()>> + Send + 'static {
    let counter = counter.clone();
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(ControlFlow::Continue(()))
    }
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_period() {
    let ticker = Ticker::new("test");
    let count = Arc::new(AtomicU32::new(0));
    ticker.start(Duration::from_secs(5), counting(&count)).unwrap();

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(10_200)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert!(ticker.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_ticks() {
    let ticker = Ticker::new("test");
    let count = Arc::new(AtomicU32::new(0));
    ticker.start(Duration::from_secs(1), counting(&count)).unwrap();

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert!(ticker.stop());
    assert!(!ticker.stop());
    let after_stop = count.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), after_stop);
    assert!(!ticker.is_running());
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_running_task() {
    let ticker = Ticker::new("test");
    let count = Arc::new(AtomicU32::new(0));
    ticker.start(Duration::from_secs(1), counting(&count)).unwrap();
    ticker.start(Duration::from_secs(1), counting(&count)).unwrap();

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn drop_aborts_task() {
    let count = Arc::new(AtomicU32::new(0));
    {
        let ticker = Ticker::new("test");
        ticker.start(Duration::from_secs(1), counting(&count)).unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
    }
    let before = count.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(count.load(Ordering::SeqCst), before);
}

#[tokio::test(start_paused = true)]
async fn stops_when_owner_is_gone() {
    struct Owner {
        ticks: AtomicU32,
    }

    let owner = Arc::new(Owner {
        ticks: AtomicU32::new(0),
    });
    let weak: Weak<Owner> = Arc::downgrade(&owner);
    let ticker = Ticker::new("owned");
    ticker
        .start(Duration::from_secs(1), move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(owner) => {
                        owner.ticks.fetch_add(1, Ordering::SeqCst);
                        ControlFlow::Continue(())
                    }
                    None => ControlFlow::Break(()),
                }
            }
        })
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(owner.ticks.load(Ordering::SeqCst), 2);
    drop(owner);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!ticker.is_running());
}

#[tokio::test]
async fn zero_period_rejected() {
    let ticker = Ticker::new("test");
    let err = ticker
        .start(Duration::ZERO, || std::future::ready(ControlFlow::Continue(())))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig(_)));
}

#[test]
fn start_without_runtime_fails() {
    let ticker = Ticker::new("test");
    let err = ticker
        .start(Duration::from_secs(1), || std::future::ready(ControlFlow::Continue(())))
        .unwrap_err();
    assert!(matches!(err, StoreError::NoRuntime));
}
