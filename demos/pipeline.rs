use std::sync::Arc;
use std::thread;
use std::time::Duration;

use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use striter::{CancelToken, ChannelStream, Stream, StreamWriter, visit};

/// Feeds squares through a rendezvous stream on a worker thread and prints
/// them from the main thread, until a deadline token cancels the pipeline.
fn main() -> anyhow::Result<()> {
    TermLogger::init(
        LevelFilter::Trace,
        Default::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let token = CancelToken::deadline(Duration::from_millis(500));
    let stream = Arc::new(ChannelStream::with_token(0, token));

    let producer = Arc::clone(&stream);
    let worker = thread::spawn(move || {
        for i in 1.. {
            if producer.write(i * i).is_err() {
                // Closed or canceled; either way we're done producing.
                return;
            }
            thread::sleep(Duration::from_millis(50));
        }
    });

    let result = visit(stream.as_ref(), |square| {
        println!("{square}");
        Ok(())
    });
    stream.close();
    worker.join().expect("worker thread panicked");

    result?;
    Ok(())
}
