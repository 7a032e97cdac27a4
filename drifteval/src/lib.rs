#[macro_export]
macro_rules! unwrap_opt_or {
    ($opt:expr, $default:expr) => {
        match $opt {
            Some(x) => x,
            None => $default,
        }
    };
}

pub mod config;
pub mod correct;
pub mod dataset;
pub mod driving;
mod error;
pub mod eval;
pub mod events;
pub mod score;
pub mod segment;
pub mod source;
pub mod trace;

pub use error::*;
