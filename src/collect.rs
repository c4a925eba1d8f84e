use crate::error::Error;
use crate::stream::Stream;

/// Applies `visitor` to every element of `stream`.
///
/// A finished condition stops the loop silently and returns `Ok(())`. Any
/// other stream error is returned as-is, *without* closing the stream; the
/// caller still owns it in that case. If the visitor itself fails, the stream
/// is closed and the visitor's error is returned.
pub fn visit<T, S, F>(stream: &S, mut visitor: F) -> Result<(), Error>
where
    S: Stream<T> + ?Sized,
    F: FnMut(T) -> anyhow::Result<()>,
{
    loop {
        let value = match stream.next() {
            Ok(value) => value,
            Err(err) if err.is_finished() => return Ok(()),
            Err(err) => return Err(err),
        };

        if let Err(err) = visitor(value) {
            stream.close();
            return Err(err.into());
        }
    }
}

/// Consumes the entire stream and returns its elements in order.
///
/// The stream is closed before returning, on every path; callers never need
/// to close it themselves.
pub fn collect<T, S>(stream: &S) -> Result<Vec<T>, Error>
where
    S: Stream<T> + ?Sized,
{
    collect_n(stream, None)
}

/// Consumes the stream to its end or to `limit` elements, whichever comes
/// first, and returns the elements in order. A `limit` of `None` imposes no
/// limit.
///
/// The stream is closed before returning, on every path. Elements collected
/// before a non-finished error are discarded along with it; use
/// [collect_into] to keep them.
pub fn collect_n<T, S>(stream: &S, limit: Option<usize>) -> Result<Vec<T>, Error>
where
    S: Stream<T> + ?Sized,
{
    // The total is advisory, so it only presizes the buffer.
    let hint = stream.meta().total.unwrap_or(0);
    let mut items = Vec::with_capacity(limit.map_or(hint, |limit| hint.min(limit)));
    collect_into(stream, limit, &mut items)?;
    Ok(items)
}

/// Like [collect_n], but appends into `out`, so that elements collected
/// before a mid-stream error are preserved alongside it.
///
/// The stream is closed before returning, on every path.
pub fn collect_into<T, S>(stream: &S, limit: Option<usize>, out: &mut Vec<T>) -> Result<(), Error>
where
    S: Stream<T> + ?Sized,
{
    let mut taken = 0;
    while limit.is_none_or(|limit| taken < limit) {
        match stream.next() {
            Ok(value) => {
                out.push(value);
                taken += 1;
            }
            // The stream is consumed or canceled; this is not unusual.
            Err(err) if err.is_finished() => break,
            Err(err) => {
                stream.close();
                return Err(err);
            }
        }
    }

    stream.close();
    Ok(())
}

/// Like [collect], but accepts the `Result` of a fallible stream constructor
/// directly. An `Err` is returned as-is, without the stream ever being
/// touched:
///
/// ```
/// use striter::{Error, SliceStream, try_collect};
///
/// fn load_data() -> Result<SliceStream<u32>, Error> {
///     Ok(SliceStream::new(vec![1, 2, 3]))
/// }
///
/// let items = try_collect(load_data())?;
/// # assert_eq!(items, vec![1, 2, 3]);
/// # Ok::<(), Error>(())
/// ```
pub fn try_collect<T, S>(stream: Result<S, Error>) -> Result<Vec<T>, Error>
where
    S: Stream<T>,
{
    collect(&stream?)
}
