//! Public SDK surface for Reverie.
//!
//! Re-exports the building blocks under stable module names so consumers
//! depend on one crate, plus a small logging bootstrap.

/// Config schema and loader.
pub use reverie_rs_config as config;
/// Orchestrator and errors.
pub use reverie_rs_core as core;
/// Model clients and the speech bridge.
pub use reverie_rs_llm as llm;
/// Vector memory core.
pub use reverie_rs_memory as memory;

#[inline]
/// Initialize env_logger when the "logging" feature is enabled; a no-op
/// otherwise. Safe to call more than once.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
