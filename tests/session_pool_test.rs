//! Session pool bounds, release on every exit path, and shutdown

mod common;

use common::{FakeSite, fake_pool};
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn checkouts_never_exceed_pool_size() {
    let (pool, stats) = fake_pool(3, FakeSite::new(), Duration::from_millis(15));

    let mut handles = Vec::new();
    for i in 0..20 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let session = pool.acquire().await.unwrap();
            session
                .navigate(&format!("https://shop.test/{i}"), Duration::from_secs(1))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(pool.peak_in_use() <= 3, "peak was {}", pool.peak_in_use());
    assert!(pool.peak_in_use() >= 2, "work never overlapped");
    assert_eq!(pool.in_use(), 0);
    assert_eq!(stats.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(stats.navigations.load(Ordering::SeqCst), 20);
}

#[tokio::test]
async fn session_returns_when_holder_panics() {
    let (pool, _stats) = fake_pool(1, FakeSite::new(), Duration::ZERO);

    let holder = pool.clone();
    let result = tokio::spawn(async move {
        let _session = holder.acquire().await.unwrap();
        panic!("resolution blew up");
    })
    .await;
    assert!(result.unwrap_err().is_panic());

    assert_eq!(pool.in_use(), 0);
    let again = tokio::time::timeout(Duration::from_secs(1), pool.acquire()).await;
    assert!(again.expect("session was leaked").is_ok());
}

#[tokio::test]
async fn session_returns_when_holder_times_out() {
    let (pool, _stats) = fake_pool(1, FakeSite::new(), Duration::from_secs(10));

    {
        let session = pool.acquire().await.unwrap();
        let slow = session.navigate("https://shop.test/slow", Duration::from_secs(10));
        assert!(tokio::time::timeout(Duration::from_millis(20), slow).await.is_err());
    }

    assert_eq!(pool.in_use(), 0);
    assert!(pool.acquire().await.is_ok());
}

#[tokio::test]
async fn shutdown_closes_each_session_once() {
    let (pool, stats) = fake_pool(3, FakeSite::new(), Duration::ZERO);

    {
        let _a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
    }

    pool.shutdown().await.unwrap();
    pool.shutdown().await.unwrap();

    assert_eq!(stats.close_counts(), vec![1, 1, 1]);
    assert!(pool.acquire().await.is_err());
}

#[tokio::test]
async fn shutdown_waits_for_outstanding_sessions() {
    let (pool, stats) = fake_pool(2, FakeSite::new(), Duration::ZERO);
    let held = pool.acquire().await.unwrap();

    let closing = pool.clone();
    let shutdown = tokio::spawn(async move { closing.shutdown().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shutdown.is_finished());
    assert_eq!(stats.close_counts(), vec![0, 0]);

    drop(held);
    shutdown.await.unwrap().unwrap();
    assert_eq!(stats.close_counts(), vec![1, 1]);
}
