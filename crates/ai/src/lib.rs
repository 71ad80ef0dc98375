//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! This crate is intended as a convenient entrypoint for users and as a home for docs.rs guides.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "stack")]
#[cfg_attr(docsrs, doc(cfg(feature = "stack")))]
pub use ai_stack as stack;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(doc)]
pub mod guides {
    #![allow(clippy::all)]

    #[doc = include_str!("../../../docs/guides/action-stack.md")]
    pub mod action_stack {}
}
