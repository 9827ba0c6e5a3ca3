#[macro_use]
extern crate tracing;

mod app;
pub mod args;
mod logging;
mod report;

pub use app::App;
pub use args::Cli;
pub use logging::{
    init_errors,
    init_logging,
};
