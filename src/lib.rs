mod csv_utils;
mod dto;
mod engine;
mod error;
mod runner;
mod stores;

pub use dto::{InsertStatus, StatusRow, SumRow, Transaction, TypeRow, NO_PARENT};
pub use engine::Engine;
pub use error::Error;
pub use runner::{run, run_async, Report};
