#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;

pub mod error;
pub mod gb;
pub mod io;

pub use error::{Error, Result};
