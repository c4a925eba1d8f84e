use thiserror::Error as ThisError;

/// The enumeration of all possible errors a stream can hand to its consumer.
#[derive(ThisError, Debug)]
pub enum Error {
    /// The stream was shut down, either by the consumer calling
    /// [Stream::close] or by the producer finishing. This is a normal
    /// end-of-sequence condition, not a failure.
    ///
    /// [Stream::close]: crate::Stream::close
    #[error("stream closed")]
    Closed,

    /// The externally supplied [CancelToken] fired before the operation could
    /// complete. Like [Error::Closed], this is a normal end-of-sequence
    /// condition.
    ///
    /// [CancelToken]: crate::CancelToken
    #[error("stream canceled")]
    Canceled,

    /// An application error, either handed to [StreamWriter::cancel] by the
    /// producer or raised by a visitor callback during consumption.
    ///
    /// [StreamWriter::cancel]: crate::StreamWriter::cancel
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Returns whether this error indicates that the stream has reached a
    /// normal end of sequence (it was closed or canceled), as opposed to an
    /// application error that the consumer may want to propagate.
    pub fn is_finished(&self) -> bool {
        matches!(self, Error::Closed | Error::Canceled)
    }
}
