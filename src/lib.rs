// Headless core: session state machine, metrics, passage corpus, and event
// plumbing. The TUI front end lives in main.rs and consumes RenderModel.
pub mod metrics;
pub mod passages;
pub mod runtime;
pub mod session;
