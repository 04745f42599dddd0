pub use self::app::*;
pub use self::main::*;

mod app;
mod main;
pub mod prelude;
