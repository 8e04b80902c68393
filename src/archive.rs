//!
//! Little-endian byte archive used to load and store frame streams.
//!

use std::io::Write;
use std::mem;

use crate::base::YukeError;

/// Input archive over an immutable byte buffer.
///
/// All Yuke streams are little-endian. Reads either consume exactly the
/// requested bytes or fail with `YukeError::TruncatedStream`, leaving the
/// cursor where it was.
#[derive(Debug, Clone, Copy)]
pub struct Archive<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Archive<'a> {
    /// Creates an `Archive` over `buf`, positioned at the first byte.
    pub fn new(buf: &'a [u8]) -> Archive<'a> {
        Archive { buf, pos: 0 }
    }

    /// Reads `T` from the archive.
    #[inline]
    pub fn read<T: ArchiveRead>(&mut self) -> Result<T, YukeError> {
        T::read(self)
    }

    /// Reads `Vec<T>` from the archive.
    /// * `count` - The number of elements to read.
    pub fn read_vec<T: ArchiveRead>(&mut self, count: usize) -> Result<Vec<T>, YukeError> {
        let mut buffer = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            buffer.push(T::read(self)?);
        }
        Ok(buffer)
    }

    /// Reads a fixed number of raw bytes.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], YukeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Borrows the next `len` bytes and advances past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], YukeError> {
        self.check(len)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Advances the cursor by `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<(), YukeError> {
        self.check(len)?;
        self.pos += len;
        Ok(())
    }

    /// Moves the cursor to an absolute position. Seeking to the end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<(), YukeError> {
        if pos > self.buf.len() {
            return Err(YukeError::TruncatedStream {
                offset: self.pos,
                needed: pos - self.pos,
                remaining: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor reached the end of the buffer.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    fn check(&self, needed: usize) -> Result<(), YukeError> {
        if needed > self.remaining() {
            return Err(YukeError::TruncatedStream {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Implements `ArchiveRead` to read `Self` from an `Archive`.
pub trait ArchiveRead: Sized {
    fn read(archive: &mut Archive<'_>) -> Result<Self, YukeError>;
}

macro_rules! primitive_reader {
    ($type:ty) => {
        impl ArchiveRead for $type {
            #[inline]
            fn read(archive: &mut Archive<'_>) -> Result<$type, YukeError> {
                let bytes = archive.read_array::<{ mem::size_of::<$type>() }>()?;
                Ok(<$type>::from_le_bytes(bytes))
            }
        }
    };
}

primitive_reader!(u8);
primitive_reader!(i8);
primitive_reader!(u16);
primitive_reader!(i16);
primitive_reader!(u32);
primitive_reader!(i32);
primitive_reader!(f32);

/// Output archive appending little-endian values to a byte sink.
pub struct ArchiveWriter<W: Write> {
    write: W,
    written: usize,
}

impl<W: Write> ArchiveWriter<W> {
    /// Creates an `ArchiveWriter` over a sink.
    pub fn new(write: W) -> ArchiveWriter<W> {
        ArchiveWriter { write, written: 0 }
    }

    /// Writes `T` to the sink.
    #[inline]
    pub fn write<T: ArchiveWrite>(&mut self, value: T) -> Result<(), YukeError> {
        value.write(self)
    }

    /// Writes raw bytes to the sink.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), YukeError> {
        self.write.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes the sink.
    pub fn flush(&mut self) -> Result<(), YukeError> {
        self.write.flush()?;
        Ok(())
    }

    /// Gets back the sink.
    pub fn into_inner(self) -> W {
        self.write
    }
}

/// Implements `ArchiveWrite` to write `Self` to an `ArchiveWriter`.
pub trait ArchiveWrite {
    fn write<W: Write>(self, writer: &mut ArchiveWriter<W>) -> Result<(), YukeError>;
}

macro_rules! primitive_writer {
    ($type:ty) => {
        impl ArchiveWrite for $type {
            #[inline]
            fn write<W: Write>(self, writer: &mut ArchiveWriter<W>) -> Result<(), YukeError> {
                writer.write_bytes(&self.to_le_bytes())
            }
        }
    };
}

primitive_writer!(u8);
primitive_writer!(i8);
primitive_writer!(u16);
primitive_writer!(i16);
primitive_writer!(u32);
primitive_writer!(i32);
primitive_writer!(f32);
