//! Serializes a [`Gif`] record back into the GIF container format. The
//! writer is the mirror image of the parser: every frame becomes a graphic
//! control extension followed by an image block with LZW-packed sub-blocks.

use crate::gif::{ColorTable, Gif};
use crate::lzw;
use crate::stream::ByteSink;
use crate::{Error, Result};

/// The largest sub-block payload the size prefix can describe.
const MAX_SUB_BLOCK: usize = 255;

/// Drives the encoding of one GIF record.
pub struct GifEncoder<'a> {
    /// The record to serialize.
    gif: &'a Gif,
    /// The output stream.
    output: &'a mut Vec<u8>,
}

/// Encode a record into a fresh byte buffer.
pub fn encode(gif: &Gif) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    GifEncoder::new(gif, &mut output).encode()?;
    Ok(output)
}

impl<'a> GifEncoder<'a> {
    pub fn new(gif: &'a Gif, output: &'a mut Vec<u8>) -> Self {
        Self { gif, output }
    }

    /// Serialize the record and return the number of bytes written.
    pub fn encode(&mut self) -> Result<usize> {
        let mut sink = ByteSink::with_capacity(1 << 10);

        sink.write_bytes(b"GIF89a");
        sink.write_u16_le(self.gif.width);
        sink.write_u16_le(self.gif.height);
        match &self.gif.global_table {
            Some(table) => {
                let code = table_size_code(table);
                sink.write_u8(0x80 | code);
                sink.write_u8(0); // background color index
                sink.write_u8(0); // pixel aspect ratio
                write_color_table(&mut sink, table);
            }
            None => {
                sink.write_u8(0);
                sink.write_u8(0);
                sink.write_u8(0);
            }
        }

        if let Some(count) = self.gif.loop_count {
            write_netscape_looping(&mut sink, count);
        }

        for frame in &self.gif.frames {
            let expected = frame.width as usize * frame.height as usize;
            if frame.pixels.len() != expected {
                return Err(Error::PixelCountMismatch {
                    expected,
                    got: frame.pixels.len(),
                });
            }

            // Graphic control extension.
            sink.write_u8(0x21);
            sink.write_u8(0xf9);
            sink.write_u8(4);
            let flags =
                (frame.disposal.to_bits() << 2) | frame.transparent.is_some() as u8;
            sink.write_u8(flags);
            sink.write_u16_le(frame.delay_cs);
            sink.write_u8(frame.transparent.unwrap_or(0));
            sink.write_u8(0);

            // Image descriptor. Frames are always written non-interlaced;
            // the decoded plane is already in natural row order.
            sink.write_u8(0x2c);
            sink.write_u16_le(frame.left);
            sink.write_u16_le(frame.top);
            sink.write_u16_le(frame.width);
            sink.write_u16_le(frame.height);
            match &frame.local_table {
                Some(table) => {
                    sink.write_u8(0x80 | table_size_code(table));
                    write_color_table(&mut sink, table);
                }
                None => sink.write_u8(0),
            }

            let palette = frame
                .palette(self.gif)
                .ok_or(Error::MissingColorTable)?;
            let min_code_size = (table_size_code(palette) + 1).max(2);

            let codes = lzw::encode(min_code_size, &frame.pixels)?;
            let packed = lzw::pack(min_code_size, &codes);
            sink.write_u8(min_code_size);
            for chunk in packed.chunks(MAX_SUB_BLOCK) {
                sink.write_u8(chunk.len() as u8);
                sink.write_bytes(chunk);
            }
            sink.write_u8(0);
        }

        sink.write_u8(0x3b);

        let bytes = sink.finalize_bytes();
        let written = bytes.len();
        self.output.extend(bytes);
        Ok(written)
    }
}

/// The NETSCAPE2.0 application extension carrying the iteration count.
fn write_netscape_looping(sink: &mut ByteSink, count: u16) {
    sink.write_u8(0x21);
    sink.write_u8(0xff);
    sink.write_u8(11);
    sink.write_bytes(b"NETSCAPE2.0");
    sink.write_u8(3); // sub-block size
    sink.write_u8(1); // looping sub-block id
    sink.write_u16_le(count);
    sink.write_u8(0);
}

/// The 3-bit size code for a color table: the table is stored padded to
/// `2^(code + 1)` entries.
fn table_size_code(table: &ColorTable) -> u8 {
    let padded = table.len().next_power_of_two().max(2);
    (padded.trailing_zeros() - 1) as u8
}

/// Write a color table padded with black up to its declared size.
fn write_color_table(sink: &mut ByteSink, table: &ColorTable) {
    let padded = 1usize << (table_size_code(table) + 1);
    for rgb in table {
        sink.write_bytes(rgb);
    }
    for _ in table.len()..padded {
        sink.write_bytes(&[0, 0, 0]);
    }
}
