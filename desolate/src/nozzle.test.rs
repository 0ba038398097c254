use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use tokio::sync::Notify;

use super::*;

struct Observed {
    items: Arc<Mutex<Vec<i32>>>,
    closes: Arc<AtomicUsize>,
    closed: Arc<Notify>,
}

/// Attach a recording consumer to the nozzle.
fn observe(nozzle: &Nozzle<i32>) -> Observed {
    let items = Arc::new(Mutex::new(Vec::new()));
    let closes = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(Notify::new());
    let sink = items.clone();
    let close_count = closes.clone();
    let close_signal = closed.clone();
    nozzle.attach(
        move |element| sink.lock().unwrap().push(element),
        move || {
            close_count.fetch_add(1, Ordering::SeqCst);
            close_signal.notify_one();
        },
    );
    Observed {
        items,
        closes,
        closed,
    }
}

#[test_log::test(tokio::test)]
async fn test_of_delivers_in_order_then_closes_once() {
    let nozzle = Nozzle::of([1, 2, 3]);
    let observed = observe(&nozzle);

    observed.closed.notified().await;
    assert_eq!(*observed.items.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(observed.closes.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn test_empty_closes_with_no_elements() {
    let nozzle = Nozzle::empty();
    let observed = observe(&nozzle);

    observed.closed.notified().await;
    assert!(observed.items.lock().unwrap().is_empty());
    assert_eq!(observed.closes.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn test_single_delivers_one_element() {
    let nozzle = Nozzle::single(7);
    let observed = observe(&nozzle);

    observed.closed.notified().await;
    assert_eq!(*observed.items.lock().unwrap(), vec![7]);
    assert_eq!(observed.closes.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn test_into_stream_yields_sequence_then_terminates() {
    let collected: Vec<i32> = Nozzle::of(1..=5).into_stream().collect().await;
    assert_eq!(collected, vec![1, 2, 3, 4, 5]);
}

#[test_log::test(tokio::test)]
async fn test_desolate_allows_manual_driving() {
    let (nozzle, current) = Nozzle::<i32>::desolate();
    let observed = observe(&nozzle);

    current.task(Flow::Element(7)).await.unwrap();
    current.task(Flow::Element(8)).await.unwrap();
    current.task(Flow::Sentinel).await.unwrap();
    observed.closed.notified().await;

    // The backing actor has stopped; further sends are no-ops.
    current.tell(Flow::Element(9));
    assert_eq!(*observed.items.lock().unwrap(), vec![7, 8]);
    assert_eq!(observed.closes.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn test_late_consumer_observes_backlog_and_close() {
    let (nozzle, current) = Nozzle::<i32>::desolate();

    // Produce before anyone is listening, including a redundant sentinel.
    current.task(Flow::Element(1)).await.unwrap();
    current.task(Flow::Element(2)).await.unwrap();
    current.task(Flow::Sentinel).await.unwrap();
    current.task(Flow::Sentinel).await.unwrap();

    let observed = observe(&nozzle);
    observed.closed.notified().await;
    assert_eq!(*observed.items.lock().unwrap(), vec![1, 2]);
    assert_eq!(observed.closes.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn test_second_consumer_is_dropped() {
    let (nozzle, current) = Nozzle::<i32>::desolate();
    let first = observe(&nozzle);
    let second = observe(&nozzle);

    current.task(Flow::Element(5)).await.unwrap();
    current.task(Flow::Sentinel).await.unwrap();
    first.closed.notified().await;

    assert_eq!(*first.items.lock().unwrap(), vec![5]);
    assert_eq!(first.closes.load(Ordering::SeqCst), 1);
    assert!(second.items.lock().unwrap().is_empty());
    assert_eq!(second.closes.load(Ordering::SeqCst), 0);
}

#[test_log::test(tokio::test)]
async fn test_builder_emits_and_closes() {
    let nozzle = Nozzle::new(|emitter: Emitter<i32>| async move {
        for i in 0..3 {
            emitter.emit(i).await;
        }
        emitter.close().await;
        Ok::<(), String>(())
    });
    let observed = observe(&nozzle);

    observed.closed.notified().await;
    assert_eq!(*observed.items.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(observed.closes.load(Ordering::SeqCst), 1);
}

#[test_log::test(tokio::test)]
async fn test_builder_failure_auto_closes() {
    let nozzle = Nozzle::new(|emitter: Emitter<i32>| async move {
        emitter.emit(1).await;
        Err::<(), _>("producer gave up")
    });
    let observed = observe(&nozzle);

    observed.closed.notified().await;
    assert_eq!(*observed.items.lock().unwrap(), vec![1]);
    assert_eq!(observed.closes.load(Ordering::SeqCst), 1);
}
