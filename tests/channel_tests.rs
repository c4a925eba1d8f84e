use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use striter::{CancelSource, ChannelStream, Error, Meta, Stream, StreamWriter, collect};

#[test]
fn round_trip_preserves_order() {
    let stream = Arc::new(ChannelStream::new(4));

    let producer = Arc::clone(&stream);
    let writer = thread::spawn(move || {
        for i in 0..100 {
            producer.write(i).unwrap();
        }
        producer.close();
    });

    let items = collect(stream.as_ref()).unwrap();
    writer.join().unwrap();

    assert_eq!(items, (0..100).collect::<Vec<_>>());
}

#[test]
fn rendezvous_round_trip_preserves_order() {
    // Capacity zero means every write hands off directly to a waiting next.
    let stream = Arc::new(ChannelStream::new(0));

    let producer = Arc::clone(&stream);
    let writer = thread::spawn(move || {
        for i in 0..50 {
            producer.write(i).unwrap();
        }
        producer.close();
    });

    let items = collect(stream.as_ref()).unwrap();
    writer.join().unwrap();

    assert_eq!(items, (0..50).collect::<Vec<_>>());
}

#[test]
fn write_blocks_until_consumer_accepts() {
    let stream = Arc::new(ChannelStream::new(0));

    let producer = Arc::clone(&stream);
    let writer = thread::spawn(move || producer.write(7));

    // Give the producer time to block on the handoff.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(stream.next().unwrap(), 7);
    writer.join().unwrap().unwrap();
}

#[test]
fn next_and_write_after_close_return_closed() {
    let stream = ChannelStream::new(1);
    stream.close();

    assert!(matches!(stream.next(), Err(Error::Closed)));
    assert!(matches!(stream.write(1), Err(Error::Closed)));
}

#[test]
fn close_is_idempotent() {
    let stream = ChannelStream::<i32>::new(1);
    stream.close();
    stream.close();
    stream.close();

    assert!(matches!(stream.next(), Err(Error::Closed)));
}

#[test]
fn concurrent_close_is_safe() {
    let stream = Arc::new(ChannelStream::<i32>::new(1));

    let mut handles = vec![];
    for _ in 0..10 {
        let stream = Arc::clone(&stream);
        handles.push(thread::spawn(move || stream.close()));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(matches!(stream.next(), Err(Error::Closed)));
}

#[test]
fn buffered_elements_drain_after_close() {
    let stream = ChannelStream::new(2);
    stream.write(1).unwrap();
    stream.write(2).unwrap();
    stream.close();

    assert_eq!(stream.next().unwrap(), 1);
    assert_eq!(stream.next().unwrap(), 2);
    assert!(matches!(stream.next(), Err(Error::Closed)));
}

#[test]
fn cancel_delivers_error_exactly_once() {
    let stream = ChannelStream::<i32>::new(1);
    stream.cancel(Some(anyhow!("boom"))).unwrap();

    match stream.next() {
        Err(Error::Other(err)) => assert_eq!(err.to_string(), "boom"),
        other => panic!("expected producer error, got {other:?}"),
    }
    assert!(matches!(stream.next(), Err(Error::Closed)));
    assert!(matches!(stream.write(1), Err(Error::Closed)));
}

#[test]
fn cancel_delivers_error_through_rendezvous() {
    let stream = Arc::new(ChannelStream::<i32>::new(0));

    let producer = Arc::clone(&stream);
    let writer = thread::spawn(move || producer.cancel(Some(anyhow!("worker failed"))));

    match stream.next() {
        Err(Error::Other(err)) => assert_eq!(err.to_string(), "worker failed"),
        other => panic!("expected producer error, got {other:?}"),
    }
    writer.join().unwrap().unwrap();
    assert!(matches!(stream.next(), Err(Error::Closed)));
}

#[test]
fn cancel_without_error_behaves_like_close() {
    let stream = ChannelStream::<i32>::new(1);
    stream.cancel(None).unwrap();

    assert!(matches!(stream.next(), Err(Error::Closed)));
    assert!(matches!(stream.write(1), Err(Error::Closed)));
}

#[test]
fn cancel_after_close_drops_error() {
    let stream = ChannelStream::<i32>::new(1);
    stream.close();

    assert!(matches!(
        stream.cancel(Some(anyhow!("too late"))),
        Err(Error::Closed)
    ));
    assert!(matches!(stream.next(), Err(Error::Closed)));
}

#[test]
fn token_unblocks_blocked_next() {
    let source = CancelSource::new();
    let stream = Arc::new(ChannelStream::<i32>::with_token(0, source.token()));

    let consumer = Arc::clone(&stream);
    let reader = thread::spawn(move || consumer.next());

    thread::sleep(Duration::from_millis(50));
    source.cancel();

    assert!(matches!(reader.join().unwrap(), Err(Error::Canceled)));
}

#[test]
fn token_unblocks_blocked_write() {
    let source = CancelSource::new();
    let stream = Arc::new(ChannelStream::with_token(0, source.token()));

    let producer = Arc::clone(&stream);
    let writer = thread::spawn(move || producer.write(1));

    thread::sleep(Duration::from_millis(50));
    source.cancel();

    assert!(matches!(writer.join().unwrap(), Err(Error::Canceled)));
}

#[test]
fn closed_wins_over_fired_token() {
    let source = CancelSource::new();
    let stream = ChannelStream::<i32>::with_token(1, source.token());

    source.cancel();
    stream.close();

    // Both conditions hold, but an operation invoked after the stream is
    // fully closed must report Closed.
    assert!(matches!(stream.next(), Err(Error::Closed)));
    assert!(matches!(stream.write(1), Err(Error::Closed)));
}

#[test]
fn meta_defaults_to_unknown_total() {
    let stream = ChannelStream::<i32>::new(1);
    assert_eq!(stream.meta(), Meta { total: None });
}

#[test]
fn meta_reports_configured_total() {
    let stream = ChannelStream::<i32>::with_meta(
        1,
        striter::CancelToken::never(),
        Meta { total: Some(42) },
    );
    assert_eq!(stream.meta().total, Some(42));
}
