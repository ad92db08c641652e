//! classdep library — dependency-graph construction from decoded compiled
//! units, via an open/close capture protocol and a fixed chain of
//! semantics-preserving transformation stages.

pub mod cli;
pub mod graph;
pub mod producer;
pub mod signal;
pub mod sink;
pub mod transform;
pub mod unit;
