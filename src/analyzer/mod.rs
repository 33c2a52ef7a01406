//! Display side: analyser traces, the response curve and the refresh loop that publishes them.

pub mod config;
pub mod path;
pub mod path_generator;
pub mod path_producer;
pub mod refresh;
pub mod response_curve;

pub use config::AnalyzerConfig;
pub use refresh::{DisplayFrame, DisplayOutput, RefreshTask, RefreshTaskSlot, RefreshThread};
