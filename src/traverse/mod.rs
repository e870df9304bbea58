// src/traverse/mod.rs
// =============================================================================
// Folder traversal: turns the remote tree into a flat list of FileMatch.
// =============================================================================

mod walker;

pub use walker::Traverser;
