//! An AVL tree engine for interactive tree visualizers.
//!
//! [`Tree`] stores a set of distinct ordered values and keeps itself
//! balanced through rotations on every insert and remove. Renderers read its
//! shape through [`NodeRef`], which exposes each node's value, children,
//! cached height and a stable [`NodeId`].
//!
//! [`Workspace`] wraps a tree for front ends: it reports a status for every
//! operation and notifies subscribers after each structural change. The
//! [`input`] module parses user-typed values.

pub mod input;
mod tree;
mod workspace;

pub use tree::{NodeId, NodeRef, Tree};
pub use workspace::{Event, Outcome, SubscriptionId, Workspace};
