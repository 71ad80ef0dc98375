//! Tooling primitives for action stack diagnostics.
//!
//! This crate is intentionally lightweight and engine-agnostic. The stack engine emits
//! [`TraceEvent`]s into whatever [`TraceSink`] its owner installs; inspectors and log
//! viewers live on top of these types.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    NullTraceSink, SharedTraceLog, TraceEvent, TraceKind, TraceLog, TraceSink, TracingSink,
    VecTraceSink,
};
