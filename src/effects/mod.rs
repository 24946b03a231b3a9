//! Ability resolution engine.
//!
//! A pure computation over one turn's committed cards: it mutates the two
//! borrowed sessions, returns the events describing each mutation in order,
//! and holds nothing between calls. No I/O.

mod resolver;

pub use resolver::{AbilityResolver, Resolution};
