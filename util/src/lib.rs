#[macro_use]
pub mod if_dbg_else;
#[macro_use]
pub mod verify;
pub use self::verify::*;
#[macro_use]
pub mod if_then;
pub mod logging;
pub use self::logging::{debug, error, info, warn};
