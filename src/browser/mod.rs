//! Headless-browser page visits for device-variant rendering and live
//! tracking-event capture (spec.md §4.2).

mod hooks;
mod worker;

pub use worker::{BrowserPageResult, BrowserWorker};
