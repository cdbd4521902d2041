pub use failure::{format_err, Error};
pub use plain_enum::*;
pub use tractor_util::*;
