mod cancel;
mod channel;
mod collect;
mod error;
mod slice;
mod stream;

pub use cancel::*;
pub use channel::*;
pub use collect::*;
pub use error::*;
pub use slice::*;
pub use stream::*;
