//! Line-oriented document scanner.
//!
//! The scanner is a small state machine fed one line at a time:
//!
//! | state     | heading `## /p`               | fence line            | other line |
//! |-----------|-------------------------------|-----------------------|------------|
//! | `Idle`    | `PathSet(p)`                  | `InBlock`, no path    | ignored    |
//! | `PathSet` | `PathSet(p)`                  | `InBlock`, with path  | ignored    |
//! | `InBlock` | emit if path set, `PathSet(p)` | emit if path set, `Idle` | appended |
//!
//! What happens to a block still open at end of input is decided by
//! [`TrailingBlock`].

use crate::utils::{fence_language, heading_path, is_fence, trim_line_end};
use log::{debug, trace, warn};
use std::borrow::Cow;
use std::io::{self, BufRead};
use std::mem;

/// One file recovered from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionUnit {
    /// Path as written in the heading, e.g. `/src/main.rs`.
    pub path: String,
    /// Block body, every line terminated by `\n`. Bytes are kept as they
    /// appear in the document, whatever their encoding.
    pub content: Vec<u8>,
    /// Info string of the opening fence, if any.
    pub language: Option<String>,
}

impl ExtractionUnit {
    /// The content as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Policy for a code block that is still open when the input ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingBlock {
    /// Drop the unfinished block.
    #[default]
    Discard,
    /// Emit the unfinished block as if it had been closed.
    Flush,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    PathSet {
        path: String,
    },
    InBlock {
        path: Option<String>,
        language: Option<String>,
        buffer: Vec<u8>,
    },
}

impl State {
    /// Consumes an open block, yielding a unit only if it has a path.
    fn into_unit(self) -> Option<ExtractionUnit> {
        match self {
            State::InBlock {
                path: Some(path),
                language,
                buffer,
            } => Some(ExtractionUnit {
                path,
                content: buffer,
                language,
            }),
            State::InBlock {
                path: None, buffer, ..
            } => {
                if !buffer.is_empty() {
                    debug!("Dropping {} byte(s) from a block with no heading", buffer.len());
                }
                None
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scanner {
    state: State,
    trailing: TrailingBlock,
    line_no: usize,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trailing(trailing: TrailingBlock) -> Self {
        Self {
            trailing,
            ..Self::default()
        }
    }

    /// Whether a fenced block is currently open.
    pub fn in_block(&self) -> bool {
        matches!(self.state, State::InBlock { .. })
    }

    /// Advances the machine by one line (without its terminator) and returns
    /// the unit completed by that line, if any.
    pub fn feed(&mut self, line: impl AsRef<[u8]>) -> Option<ExtractionUnit> {
        let line = line.as_ref();
        self.line_no += 1;

        if let Some(path) = heading_path(line) {
            trace!("line {}: heading {}", self.line_no, path);
            let previous = mem::replace(&mut self.state, State::PathSet { path });
            return previous.into_unit();
        }

        if is_fence(line) {
            let language = fence_language(line);
            return match mem::take(&mut self.state) {
                State::Idle => {
                    self.state = State::InBlock {
                        path: None,
                        language,
                        buffer: Vec::new(),
                    };
                    None
                }
                State::PathSet { path } => {
                    trace!("line {}: block opened for {}", self.line_no, path);
                    self.state = State::InBlock {
                        path: Some(path),
                        language,
                        buffer: Vec::new(),
                    };
                    None
                }
                open @ State::InBlock { .. } => open.into_unit(),
            };
        }

        if let State::InBlock { buffer, .. } = &mut self.state {
            buffer.extend_from_slice(line);
            buffer.push(b'\n');
        }
        None
    }

    /// Ends the scan, applying the trailing-block policy.
    pub fn finish(self) -> Option<ExtractionUnit> {
        match (self.trailing, self.state) {
            (TrailingBlock::Flush, open) => open.into_unit(),
            (
                TrailingBlock::Discard,
                State::InBlock {
                    path: Some(path), ..
                },
            ) => {
                warn!("Input ended inside the block for {path}; it was not extracted");
                None
            }
            (TrailingBlock::Discard, _) => None,
        }
    }
}

/// Lazily yields the units of a document. Stops after the first read error.
///
/// Lines are split on `\n` as raw bytes, so a document that is not valid
/// UTF-8 is scanned like any other.
pub struct Units<R> {
    lines: io::Split<R>,
    scanner: Option<Scanner>,
}

impl<R: BufRead> Iterator for Units<R> {
    type Item = io::Result<ExtractionUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let scanner = self.scanner.as_mut()?;
            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Some(unit) = scanner.feed(trim_line_end(&line)) {
                        return Some(Ok(unit));
                    }
                }
                Some(Err(e)) => {
                    self.scanner = None;
                    return Some(Err(e));
                }
                None => return self.scanner.take().and_then(Scanner::finish).map(Ok),
            }
        }
    }
}

pub fn scan<R: BufRead>(reader: R, trailing: TrailingBlock) -> Units<R> {
    Units {
        lines: reader.split(b'\n'),
        scanner: Some(Scanner::with_trailing(trailing)),
    }
}
