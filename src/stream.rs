use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::error::Error;

/// Descriptive information about a stream, fixed at construction time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Meta {
    /// The total number of elements the stream expects to yield, if known.
    ///
    /// This is advisory only: streaming sources usually can't know it, and
    /// even when set it's a hint (for example to presize buffers), never a
    /// promise about how many elements [Stream::next] will actually return.
    pub total: Option<usize>,
}

/// A pull-based sequence of elements.
///
/// Unlike [std::iter::Iterator], a [Stream]'s `next` can fail, can block until
/// an element arrives from a concurrent producer, and is callable through a
/// shared reference so the producer and consumer halves of a live pipeline can
/// hold the same instance from different threads.
///
/// Once a stream reports a finished condition ([Error::Closed] or
/// [Error::Canceled]) it will keep reporting one deterministically; the
/// transition is one-way.
pub trait Stream<T> {
    /// Returns this stream's descriptive metadata.
    fn meta(&self) -> Meta;

    /// Returns the next element.
    ///
    /// Returns [Error::Closed] once the stream is exhausted or shut down,
    /// [Error::Canceled] once the stream's cancellation token has fired, and
    /// [Error::Other] for an error the producer handed to
    /// [StreamWriter::cancel]. The first two are normal end-of-sequence
    /// conditions; see [Error::is_finished].
    fn next(&self) -> Result<T, Error>;

    /// Shuts the stream down.
    ///
    /// This is safe to call any number of times, from any number of threads,
    /// concurrently with any other operation on the same stream. Underlying
    /// resources are released exactly once.
    fn close(&self);

    /// Adapts this stream into a standard [Iterator] over
    /// `Result<T, Error>`.
    ///
    /// The iterator ends when the stream reports a finished condition. Any
    /// other error is yielded once, after which the iterator ends as well.
    fn elements(&self) -> Elements<'_, T, Self> {
        Elements {
            stream: self,
            done: false,
            _elem: PhantomData,
        }
    }
}

/// A [Stream] that also accepts elements from a producer.
///
/// The writer is the same instance as its [Stream] view: both sides share one
/// finished state, and closing either side closes both. A given instance
/// supports exactly one producer thread and one consumer thread; only the
/// termination operations ([Stream::close] and [StreamWriter::cancel]) may be
/// called from any number of threads at once.
pub trait StreamWriter<T>: Stream<T> {
    /// Hands one element to the consumer.
    ///
    /// Returns [Error::Closed] if the stream was already shut down and
    /// [Error::Canceled] if the cancellation token already fired. Otherwise
    /// this blocks until the consumer accepts the element or one of those two
    /// conditions becomes true first.
    fn write(&self, value: T) -> Result<(), Error>;

    /// Shuts the stream down from the producer side, optionally delivering
    /// `error` to the consumer first.
    ///
    /// If `error` is `Some`, it is delivered as the final element and
    /// surfaced by exactly one subsequent [Stream::next] call. Delivery is
    /// best-effort: if the stream is already closed or canceled the error is
    /// dropped and that termination state's sentinel is returned instead.
    /// The stream is closed unconditionally either way.
    ///
    /// `cancel(None)` is identical to [Stream::close] and returns `Ok(())`.
    fn cancel(&self, error: Option<anyhow::Error>) -> Result<(), Error>;
}

/// The [Iterator] returned by [Stream::elements].
pub struct Elements<'a, T, S: ?Sized> {
    stream: &'a S,
    done: bool,
    _elem: PhantomData<fn() -> T>,
}

impl<T, S: Stream<T> + ?Sized> Iterator for Elements<'_, T, S> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.stream.next() {
            Ok(value) => Some(Ok(value)),
            Err(err) if err.is_finished() => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<T, S: Stream<T> + ?Sized> FusedIterator for Elements<'_, T, S> {}
