use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use log::*;

use crate::cancel::CancelToken;
use crate::error::Error;
use crate::stream::{Meta, Stream, StreamWriter};

/// A channel-backed stream, suitable for live, concurrently fed pipelines.
///
/// The producer and consumer share one instance (typically through an
/// [std::sync::Arc]): the producer uses the [StreamWriter] surface while the
/// consumer uses the [Stream] surface. Elements are handed over through a
/// bounded queue in strict FIFO order; a `capacity` of zero makes every
/// [StreamWriter::write] rendezvous directly with a [Stream::next].
///
/// Shutdown can be initiated by the consumer ([Stream::close]), by the
/// producer ([StreamWriter::cancel]), or by an external [CancelToken] firing,
/// whichever happens first. The release itself runs exactly once no matter how
/// many of those race.
pub struct ChannelStream<T> {
    meta: Meta,
    token: CancelToken,

    /// The consumer end of the element queue. Disconnection means the queue
    /// was released; elements buffered before the release still drain first.
    elements: Receiver<Result<T, Error>>,

    /// Becomes ready (by disconnecting) once the stream is shut down. Blocked
    /// writes wait on this, since they hold a clone of the element sender and
    /// would otherwise never observe the release.
    done: Receiver<()>,

    /// The producer-side handles, present while the stream is open. Taking
    /// them out exactly once is what makes shutdown idempotent.
    producer: Mutex<Option<Producer<T>>>,
}

/// The sending halves of a [ChannelStream]'s internal channels. Dropping this
/// is the shutdown action.
struct Producer<T> {
    // Dropped in declaration order: the element sender disconnects before the
    // done signal fires, so a thread that observed "done" can rely on the
    // queue already being released.
    elements: Sender<Result<T, Error>>,
    done: Sender<()>,
}

impl<T> ChannelStream<T> {
    /// Returns a new stream whose queue buffers up to `capacity` elements
    /// ahead of the consumer before [StreamWriter::write] blocks.
    pub fn new(capacity: usize) -> Self {
        Self::with_token(capacity, CancelToken::never())
    }

    /// Like [ChannelStream::new], but any blocked or future operation
    /// reports [Error::Canceled] once `token` fires.
    pub fn with_token(capacity: usize, token: CancelToken) -> Self {
        Self::with_meta(capacity, token, Meta::default())
    }

    /// Like [ChannelStream::with_token], but with explicit [Meta] for
    /// producers that know ahead of time how many elements they'll yield.
    pub fn with_meta(capacity: usize, token: CancelToken, meta: Meta) -> Self {
        let (elements_sender, elements) = bounded(capacity);
        let (done_sender, done) = bounded(0);
        ChannelStream {
            meta,
            token,
            elements,
            done,
            producer: Mutex::new(Some(Producer {
                elements: elements_sender,
                done: done_sender,
            })),
        }
    }

    /// Returns a handle to the element sender, or `None` if the stream was
    /// already shut down.
    fn sender(&self) -> Option<Sender<Result<T, Error>>> {
        self.producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|producer| producer.elements.clone())
    }

    /// Hands one entry to the consumer, blocking until it's accepted or the
    /// stream terminates.
    ///
    /// The fast path checks the already-shut-down state before anything else:
    /// a stream that's fully closed reports [Error::Closed] even when the
    /// cancellation token has also fired. Once this actually blocks, the
    /// first of {accepted, closed, canceled} to become ready wins, with no
    /// further preference among them.
    fn transfer(&self, entry: Result<T, Error>) -> Result<(), Error> {
        let Some(sender) = self.sender() else {
            return Err(Error::Closed);
        };
        if self.token.is_canceled() {
            return Err(Error::Canceled);
        }

        select! {
            send(sender, entry) -> result => result.map_err(|_| Error::Closed),
            recv(self.done) -> _ => Err(Error::Closed),
            recv(self.token.receiver()) -> _ => Err(Error::Canceled),
        }
    }
}

impl<T> Stream<T> for ChannelStream<T> {
    fn meta(&self) -> Meta {
        self.meta
    }

    fn next(&self) -> Result<T, Error> {
        // Fast path, with the same priority rule as [ChannelStream::transfer]:
        // an element (including a producer error) buffered before the release
        // still drains, and a released queue reports Closed even when the
        // token has also fired.
        match self.elements.try_recv() {
            Ok(entry) => return entry,
            Err(TryRecvError::Disconnected) => return Err(Error::Closed),
            Err(TryRecvError::Empty) => {}
        }

        select! {
            recv(self.elements) -> entry => entry.unwrap_or(Err(Error::Closed)),
            recv(self.token.receiver()) -> _ => Err(Error::Canceled),
        }
    }

    fn close(&self) {
        let mut producer = self
            .producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(producer) = producer.take() {
            trace!("releasing stream queue");
            drop(producer);
        }
    }
}

impl<T> StreamWriter<T> for ChannelStream<T> {
    fn write(&self, value: T) -> Result<(), Error> {
        self.transfer(Ok(value))
    }

    fn cancel(&self, error: Option<anyhow::Error>) -> Result<(), Error> {
        let result = match error {
            Some(error) => {
                debug!("producer canceling stream: {error}");
                self.transfer(Err(Error::Other(error)))
            }
            None => Ok(()),
        };
        self.close();
        result
    }
}
