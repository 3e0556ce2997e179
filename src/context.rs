//! Context Stack - Structural Legality of Nesting
//!
//! Tracks which block keywords are currently open. A stanza asks the stack
//! whether its immediate parent is one it may appear in.

use crate::error::{RenderError, RenderResult};

/// Sentinel keyword at the bottom of every stack.
pub const ROOT: &str = "root";

/// Ordered block keywords, root first, innermost last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStack {
    frames: Vec<String>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self {
            frames: vec![ROOT.to_string()],
        }
    }

    /// Push the keyword of a block being opened.
    pub fn enter(&mut self, keyword: &str) {
        self.frames.push(keyword.to_string());
    }

    /// Pop the frame for `keyword`.
    ///
    /// Frames are strictly LIFO. Exiting anything but the innermost frame,
    /// or trying to exit the root sentinel, is a bug in the caller and panics.
    pub fn exit(&mut self, keyword: &str) {
        if self.frames.len() <= 1 {
            panic!("context stack underflow: exit('{keyword}') with only the root frame open");
        }
        match self.frames.pop() {
            Some(top) if top == keyword => {}
            top => panic!("context stack out of order: exit('{keyword}') but top was {top:?}"),
        }
    }

    /// The innermost open keyword.
    pub fn current(&self) -> &str {
        self.frames.last().map(String::as_str).unwrap_or(ROOT)
    }

    /// Number of open blocks, not counting the root sentinel.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn is_root(&self) -> bool {
        self.frames.len() == 1
    }

    /// Fails with a structure error unless the innermost keyword is in `allowed`.
    pub fn assert_context(&self, stanza: &str, allowed: &[&str]) -> RenderResult<()> {
        if allowed.contains(&self.current()) {
            Ok(())
        } else {
            Err(RenderError::Structure {
                stanza: stanza.to_string(),
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            })
        }
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}
