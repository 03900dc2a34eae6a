//! Tests for Queue Module

use super::*;
use std::collections::HashSet;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;

#[test]
fn test_zero_capacity_rejected() {
    assert!(matches!(
        ingest_queue(0),
        Err(QueueError::InvalidCapacity { capacity: 0 })
    ));
}

#[tokio::test]
async fn test_push_pop_in_order() {
    let (publisher, consumer) = ingest_queue(4).unwrap();
    assert_eq!(publisher.capacity(), 4);
    assert!(consumer.is_empty());

    publisher.push(b"a".to_vec()).await.unwrap();
    publisher.push(b"b".to_vec()).await.unwrap();
    assert_eq!(consumer.len(), 2);

    assert_eq!(consumer.pop().await.as_deref(), Some(&b"a"[..]));
    assert_eq!(consumer.pop().await.as_deref(), Some(&b"b"[..]));
    assert_eq!(publisher.len(), 0);
}

#[tokio::test]
async fn test_close_drains_before_none() {
    let (publisher, consumer) = ingest_queue(4).unwrap();
    publisher.push(b"left-over".to_vec()).await.unwrap();
    publisher.close();

    assert_eq!(consumer.pop().await.as_deref(), Some(&b"left-over"[..]));
    assert_eq!(consumer.pop().await, None);
    // stays closed
    assert_eq!(consumer.pop().await, None);
}

#[tokio::test]
async fn test_push_fails_when_consumers_gone() {
    let (publisher, consumer) = ingest_queue(2).unwrap();
    drop(consumer);
    assert!(publisher.is_closed());
    assert_eq!(publisher.push(b"x".to_vec()).await, Err(QueueError::Closed));
}

#[tokio::test]
async fn test_backpressure_suspends_producer() {
    let (publisher, consumer) = ingest_queue(2).unwrap();
    publisher.push(b"1".to_vec()).await.unwrap();
    publisher.push(b"2".to_vec()).await.unwrap();

    // Full queue with a stalled consumer: the third push must not complete
    let blocked = timeout(Duration::from_millis(50), publisher.push(b"3".to_vec())).await;
    assert!(blocked.is_err(), "push should suspend while the queue is full");
    assert_eq!(publisher.len(), 2, "nothing buffered beyond capacity");

    // Freeing one slot lets the producer continue
    assert_eq!(consumer.pop().await.as_deref(), Some(&b"1"[..]));
    timeout(Duration::from_millis(500), publisher.push(b"3".to_vec()))
        .await
        .expect("push should resume once space frees up")
        .unwrap();

    publisher.close();
    let mut rest = Vec::new();
    while let Some(line) = consumer.pop().await {
        rest.push(line);
    }
    assert_eq!(rest, vec![b"2".to_vec(), b"3".to_vec()]);
}

#[tokio::test]
async fn test_competing_consumers_receive_each_line_once() {
    let (publisher, consumer) = ingest_queue(8).unwrap();
    let mut tasks = JoinSet::new();

    for _ in 0..4 {
        let consumer = consumer.clone();
        tasks.spawn(async move {
            let mut seen = Vec::new();
            while let Some(line) = consumer.pop().await {
                seen.push(line);
            }
            seen
        });
    }
    drop(consumer);

    for i in 0..200 {
        publisher.push(format!("line-{}", i).into_bytes()).await.unwrap();
    }
    publisher.close();

    let mut all = Vec::new();
    while let Some(result) = tasks.join_next().await {
        all.extend(result.unwrap());
    }

    assert_eq!(all.len(), 200);
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), 200, "no line delivered twice");
}
