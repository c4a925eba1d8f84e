use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::Error;
use crate::stream::{Meta, Stream};

/// A static stream over a sequence that's already fully in memory.
///
/// There is no producer and nothing ever blocks: [Stream::next] hands out the
/// elements in order and reports [Error::Closed] once they run out. Concurrent
/// `next` callers are safe and lock-free; each reserved position is yielded to
/// exactly one caller.
pub struct SliceStream<T> {
    meta: Meta,
    items: Vec<T>,
    cursor: AtomicUsize,
    closed: AtomicBool,
}

impl<T> SliceStream<T> {
    /// Returns a stream over `items`. Its [Meta::total] is the sequence
    /// length.
    pub fn new(items: impl Into<Vec<T>>) -> Self {
        let items = items.into();
        SliceStream {
            meta: Meta {
                total: Some(items.len()),
            },
            items,
            cursor: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }
}

impl<T: Clone> Stream<T> for SliceStream<T> {
    fn meta(&self) -> Meta {
        self.meta
    }

    fn next(&self) -> Result<T, Error> {
        // The flag is checked before reserving a position, so a close always
        // wins over positions reserved after it.
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        match self.items.get(index) {
            Some(item) => Ok(item.clone()),
            None => Err(Error::Closed),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
