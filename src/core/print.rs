//! Print targets: the sink-agnostic text primitive every header and message
//! is written through.
//!
//! Both forms implement [`std::fmt::Write`], so the same rendering code serves
//! in-memory capture ([`BufferTarget`]) and live output ([`StreamTarget`]).

use std::fmt;
use std::io;

/// Bounded print target over a caller-owned byte buffer.
///
/// Each write stores at most `remaining - 1` bytes followed by a NUL
/// terminator. A write that does not fit is clipped (on a UTF-8 boundary) and
/// exhausts the target; later writes are ignored. Nothing is ever written past
/// the end of the buffer.
#[derive(Debug)]
pub struct BufferTarget<'a> {
    data: &'a mut [u8],
    len: usize,
    exhausted: bool,
}

impl<'a> BufferTarget<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        if let Some(first) = data.first_mut() {
            *first = 0;
        }
        let exhausted = data.is_empty();
        Self {
            data,
            len: 0,
            exhausted,
        }
    }

    /// Total buffer size, terminator included.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of visible bytes written so far (terminator excluded).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` once a write has been clipped; the target accepts nothing more.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Visible text written so far.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.data[..self.len]).unwrap_or("")
    }

    fn push(&mut self, s: &str) {
        if self.exhausted {
            return;
        }
        // NUL at data[len] keeps remaining >= 1
        let remaining = self.data.len() - self.len;
        let mut count = s.len().min(remaining - 1);
        while !s.is_char_boundary(count) {
            count -= 1;
        }
        self.data[self.len..self.len + count].copy_from_slice(&s.as_bytes()[..count]);
        self.len += count;
        self.data[self.len] = 0;
        if s.len() >= remaining {
            self.exhausted = true;
        }
    }
}

impl fmt::Write for BufferTarget<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s);
        Ok(())
    }
}

/// Unbounded print target over an [`io::Write`] stream.
///
/// I/O failures are swallowed: a logging line may end up truncated but the
/// caller never sees an error.
#[derive(Debug)]
pub struct StreamTarget<W> {
    inner: W,
}

impl<W: io::Write> StreamTarget<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn flush(&mut self) {
        let _ = self.inner.flush();
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> fmt::Write for StreamTarget<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let _ = self.inner.write_all(s.as_bytes());
        Ok(())
    }
}
