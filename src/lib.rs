#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate slog;

pub mod app;
pub mod dataset;
pub mod engine;
pub mod io;
pub mod lang;
pub mod logging;
pub mod models;
pub mod preprocessing;
pub mod syntax;
pub mod tensor;
pub mod utils;
