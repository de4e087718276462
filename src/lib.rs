// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod guards;
pub mod lessons;
pub mod machine;
pub mod metrics;
pub mod runtime;
pub mod settings;
pub mod ui;
