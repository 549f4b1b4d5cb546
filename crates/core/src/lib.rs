pub mod config;
pub mod trace;

pub use config::Config;
pub use trace::TraceContext;
