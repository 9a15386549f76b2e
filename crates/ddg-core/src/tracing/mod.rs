//! Observability for the DDG engine.
//! `tracing` crate with `EnvFilter`, configured through `DDG_LOG`.

pub mod setup;

pub use setup::init_tracing;
