//! Block Emitter - Indentation-Aware Output Buffer
//!
//! Owns the text being produced for one document. Every line passes through
//! `emit_line`, which applies two spaces of indentation per open block.

use tracing::trace;

use crate::context::ContextStack;
use crate::error::RenderResult;
use crate::value::json_string;

/// Indentation applied per nesting level.
pub const INDENT_UNIT: &str = "  ";

#[derive(Debug)]
pub struct Emitter {
    out: String,
    indent: usize,
    first: bool,
    stack: ContextStack,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            first: true,
            stack: ContextStack::new(),
        }
    }

    pub fn context(&self) -> &ContextStack {
        &self.stack
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Emit `text` as one line at the current indentation.
    pub fn emit_line(&mut self, text: &str) {
        debug_assert_eq!(self.indent, self.stack.depth());
        self.first = false;
        for _ in 0..self.indent {
            self.out.push_str(INDENT_UNIT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Append text exactly as given, ignoring indentation.
    pub fn emit_raw(&mut self, text: &str) {
        self.first = false;
        self.out.push_str(text);
    }

    /// Open `keyword ["name"] {`, separated from a previous sibling by a blank line.
    pub fn open_block(&mut self, keyword: &str, name: Option<&str>) {
        if !self.first {
            self.out.push('\n');
        }
        trace!(keyword, name, depth = self.indent, "open block");
        self.emit_line(&block_header(keyword, name, "{"));
        self.stack.enter(keyword);
        self.first = true;
        self.indent += 1;
    }

    pub fn close_block(&mut self, keyword: &str) {
        self.indent -= 1;
        self.first = false;
        self.stack.exit(keyword);
        self.emit_line("}");
    }

    /// Open a block, run `body` inside it and close it again.
    ///
    /// The block is closed even when `body` fails so the context stack
    /// stays balanced while the error unwinds.
    pub fn block<F>(&mut self, keyword: &str, name: Option<&str>, body: F) -> RenderResult<()>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.open_block(keyword, name);
        let result = body(self);
        self.close_block(keyword);
        result
    }

    /// One-line `keyword ["name"] {}` with no separator and no context frame.
    pub fn empty_block(&mut self, keyword: &str, name: Option<&str>) {
        self.emit_line(&block_header(keyword, name, "{}"));
    }

    /// Consume the emitter and return the finished document.
    ///
    /// Panics if a block is still open.
    pub fn finish(self) -> String {
        if !self.stack.is_root() {
            panic!(
                "document finished with '{}' still open",
                self.stack.current()
            );
        }
        self.out
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

fn block_header(keyword: &str, name: Option<&str>, brace: &str) -> String {
    match name {
        Some(n) => format!("{} {} {}", keyword, json_string(n), brace),
        None => format!("{} {}", keyword, brace),
    }
}
