mod commands;
mod dispatcher;
mod error;
mod formats;
mod progress;
mod request;

pub use commands::*;
pub use dispatcher::*;
pub use error::*;
pub use formats::*;
pub use progress::*;
pub use request::*;
