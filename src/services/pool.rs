// src/services/pool.rs

//! Bounded, order-preserving worker pool.

use std::future::Future;
use std::sync::Mutex;

use futures::future::join_all;
use tokio::sync::{Mutex as AsyncMutex, mpsc};

/// Map `items` through `f` with at most `workers` calls in flight.
///
/// Jobs are queued with their input index; a fixed set of workers drains
/// the queue and writes each result into the pre-sized slot for that index,
/// so the output order equals the input order regardless of completion
/// order.
pub async fn map_ordered<T, R, F, Fut>(items: Vec<T>, workers: usize, f: F) -> Vec<R>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = R>,
{
    let len = items.len();
    if len == 0 {
        return Vec::new();
    }

    let (tx, rx) = mpsc::channel(len);
    for job in items.into_iter().enumerate() {
        // Capacity equals the job count, so this never hits a full queue.
        let _ = tx.try_send(job);
    }
    drop(tx);

    let queue = AsyncMutex::new(rx);
    let slots: Mutex<Vec<Option<R>>> = Mutex::new((0..len).map(|_| None).collect());

    let queue = &queue;
    let slots = &slots;
    let f = &f;
    let worker_count = workers.clamp(1, len);

    join_all((0..worker_count).map(|_| async move {
        loop {
            let next = queue.lock().await.recv().await;
            let Some((index, item)) = next else {
                break;
            };
            let result = f(index, item).await;
            if let Ok(mut slots) = slots.lock() {
                slots[index] = Some(result);
            }
        }
    }))
    .await;

    let slots = match slots.lock() {
        Ok(mut guard) => std::mem::take(&mut *guard),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    };
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use rand::Rng;

    #[tokio::test]
    async fn test_output_order_matches_input_under_random_latency() {
        let items: Vec<String> = (0..50).map(|i| format!("row-{i}")).collect();

        let results = map_ordered(items.clone(), 5, |index, item| async move {
            let delay = rand::thread_rng().gen_range(0..15);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            (index, item)
        })
        .await;

        assert_eq!(results.len(), 50);
        for (position, (index, item)) in results.iter().enumerate() {
            assert_eq!(*index, position);
            assert_eq!(item, &items[position]);
        }
    }

    #[tokio::test]
    async fn test_never_exceeds_worker_count() {
        let in_flight = &AtomicUsize::new(0);
        let peak = &AtomicUsize::new(0);

        let results = map_ordered((0..40).collect::<Vec<u32>>(), 5, move |_, n| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            n * 2
        })
        .await;

        assert_eq!(results, (0..40).map(|n| n * 2).collect::<Vec<u32>>());
        assert!(peak.load(Ordering::SeqCst) <= 5);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u8> = map_ordered(Vec::<u8>::new(), 5, |_, n| async move { n }).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_fewer_items_than_workers() {
        let results = map_ordered(vec!["a", "b"], 5, |i, s| async move { format!("{i}{s}") }).await;
        assert_eq!(results, vec!["0a".to_string(), "1b".to_string()]);
    }
}
