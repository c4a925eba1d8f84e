use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, never};
use log::*;

/// The owning half of a cooperative cancellation signal.
///
/// A source hands out any number of observe-only [CancelToken]s via
/// [CancelSource::token]. Calling [CancelSource::cancel], or simply dropping
/// the source, fires every token permanently. Streams never own a source;
/// whoever constructs the stream decides when (and whether) to cancel it.
pub struct CancelSource {
    sender: Sender<()>,
    receiver: Receiver<()>,
}

impl CancelSource {
    /// Returns a new, unfired cancellation source.
    pub fn new() -> Self {
        // Firing is modeled as the sender disconnecting, never as a message:
        // a disconnect wakes every blocked observer, while a message would
        // wake exactly one.
        let (sender, receiver) = bounded(0);
        CancelSource { sender, receiver }
    }

    /// Returns a token observing this source.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            receiver: self.receiver.clone(),
        }
    }

    /// Fires every token handed out by this source.
    ///
    /// Dropping the source has the same effect.
    pub fn cancel(self) {
        trace!("cancellation source fired");
        drop(self.sender);
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        CancelSource::new()
    }
}

/// An observe-only indicator that asynchronous work should stop.
///
/// Tokens are cheap to clone; every clone observes the same underlying
/// signal. A token can't be un-fired.
#[derive(Clone)]
pub struct CancelToken {
    receiver: Receiver<()>,
}

impl CancelToken {
    /// Returns a token that can never fire, for streams that don't need
    /// external cancellation.
    pub fn never() -> Self {
        CancelToken {
            receiver: never(),
        }
    }

    /// Returns a token that fires once `timeout` has elapsed.
    ///
    /// The deadline is tracked by a dedicated timer thread. The streams
    /// observing the token have no timers of their own.
    pub fn deadline(timeout: Duration) -> Self {
        let source = CancelSource::new();
        let token = source.token();
        thread::Builder::new()
            .name("striter::deadline".into())
            .spawn(move || {
                thread::sleep(timeout);
                debug!("deadline of {timeout:?} elapsed, firing cancellation");
                source.cancel();
            })
            .expect("failed to spawn deadline timer thread");
        token
    }

    /// Returns whether this token has fired, without blocking.
    pub fn is_canceled(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Returns the channel receiver that becomes ready (by disconnecting)
    /// when the token fires, for use in `select!` waits.
    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}

impl Default for CancelToken {
    /// Returns [CancelToken::never].
    fn default() -> Self {
        CancelToken::never()
    }
}
