use super::DumpRecord;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

//===========================================================================//

/// A destination for dump records.
pub trait RecordSink {
    /// Writes one record.
    fn write_record(&mut self, record: &DumpRecord) -> io::Result<()>;

    /// Flushes any buffered output.  Called once, after the last record.
    fn finish(&mut self) -> io::Result<()>;
}

//===========================================================================//

/// Writes one `0xAAAAAA: 0xWWWW` line per record.
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Returns a sink that writes text lines to `writer`.
    pub fn new(writer: W) -> TextSink<W> {
        TextSink { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for TextSink<W> {
    fn write_record(&mut self, record: &DumpRecord) -> io::Result<()> {
        writeln!(self.writer, "{record}")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

//===========================================================================//

/// Writes the raw ROM image: each word big-endian, in address order, with no
/// framing.
pub struct BinarySink<W: Write> {
    writer: W,
}

impl<W: Write> BinarySink<W> {
    /// Returns a sink that writes the ROM image to `writer`.
    pub fn new(writer: W) -> BinarySink<W> {
        BinarySink { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for BinarySink<W> {
    fn write_record(&mut self, record: &DumpRecord) -> io::Result<()> {
        self.writer.write_u16::<BigEndian>(record.word)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

//===========================================================================//


//===========================================================================//
