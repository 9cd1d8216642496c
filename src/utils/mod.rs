pub mod console;
mod logging;

pub use logging::*;
