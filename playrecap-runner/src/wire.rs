// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of the JSON-lines event stream.
//!
//! Each non-blank line holds one event object, tagged by its `event` field.

use crate::{errors::EventReadError, events::PlayEventKind};
use std::io::BufRead;

/// Reads events from a JSON-lines stream.
///
/// This is an iterator over decoded events. A line that fails to decode, including one that is
/// not valid UTF-8, produces an [`EventReadError::Parse`] and reading can continue with the next
/// line; an I/O error ends the iteration.
#[derive(Debug)]
pub struct EventReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> EventReader<R> {
    /// Creates a new reader over `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<PlayEventKind, EventReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.buf.trim_ascii();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_slice(line).map_err(|error| {
                        EventReadError::Parse {
                            line_number: self.line_number,
                            error,
                        }
                    }));
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(EventReadError::Io {
                        line_number: self.line_number,
                        error,
                    }));
                }
            }
        }
        None
    }
}
