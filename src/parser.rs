//! The GIF container parser. A state machine over a single byte stream that
//! dispatches on block-type sentinels and extension labels, one block per
//! call, so a host event loop can interleave other work between blocks.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::gif::{deinterlace, ColorTable, DisposalMethod, Frame, Gif, Rgb};
use crate::lzw;
use crate::stream::ByteStream;
use crate::{Error, Result};

const SENTINEL_EXT: u8 = 0x21;
const SENTINEL_IMG: u8 = 0x2c;
const SENTINEL_EOF: u8 = 0x3b;

const EXT_GRAPHIC_CONTROL: u8 = 0xf9;
const EXT_COMMENT: u8 = 0xfe;
const EXT_PLAIN_TEXT: u8 = 0x01;
const EXT_APPLICATION: u8 = 0xff;

/// Disposal, delay and transparency parsed from a graphic control extension.
/// The values apply to the image block that immediately follows it.
#[derive(Default)]
struct GraphicControl {
    disposal: DisposalMethod,
    delay_cs: u16,
    transparent: Option<u8>,
}

/// Parses one GIF byte buffer. Each parse owns its own stream cursor and
/// in-progress record; nothing is shared across parses.
pub struct Parser<'a> {
    stream: ByteStream<'a>,
    gif: Gif,
    /// A graphic control extension waiting for its image block.
    pending: Option<GraphicControl>,
    done: bool,
}

/// Parse a whole buffer in one call.
pub fn parse(data: &[u8]) -> Result<Gif> {
    let mut parser = Parser::new(data)?;
    while parser.parse_block()? {}
    Ok(parser.finish())
}

/// Parse a whole buffer, checking the cancellation flag between blocks.
pub fn parse_cancellable(data: &[u8], cancel: &AtomicBool) -> Result<Gif> {
    let mut parser = Parser::new(data)?;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        if !parser.parse_block()? {
            return Ok(parser.finish());
        }
    }
}

impl<'a> Parser<'a> {
    /// Create a parser over a fully resident byte buffer and parse the
    /// header, including the global color table if one is declared.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut stream = ByteStream::new(data);
        let mut gif = Gif::default();
        parse_header(&mut stream, &mut gif)?;
        Ok(Self {
            stream,
            gif,
            pending: None,
            done: false,
        })
    }

    /// Process exactly one block. Returns `true` while more blocks remain
    /// and `false` once the trailer has been consumed.
    pub fn parse_block(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        let sentinel = self.stream.read_u8()?;
        match sentinel {
            SENTINEL_EXT => self.parse_extension()?,
            SENTINEL_IMG => self.parse_image()?,
            SENTINEL_EOF => self.done = true,
            // Block framing is lost; there is no way to resynchronize.
            other => return Err(Error::UnknownBlock(other)),
        }
        Ok(!self.done)
    }

    /// Whether the trailer has been reached.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume the parser and return the record built so far. Complete once
    /// [`Parser::parse_block`] has reported the trailer.
    pub fn finish(self) -> Gif {
        self.gif
    }

    fn parse_extension(&mut self) -> Result<()> {
        let label = self.stream.read_u8()?;
        match label {
            EXT_GRAPHIC_CONTROL => self.parse_graphic_control(),
            EXT_COMMENT => self.skip_sub_blocks(),
            EXT_PLAIN_TEXT => {
                self.stream.skip(13)?;
                self.skip_sub_blocks()
            }
            EXT_APPLICATION => self.parse_application(),
            // Unrecognized labels are skipped, never failed on.
            _ => {
                log::debug!("skipping unknown extension 0x{:02x}", label);
                self.skip_sub_blocks()
            }
        }
    }

    fn parse_graphic_control(&mut self) -> Result<()> {
        self.stream.skip(1)?; // block size, always 4
        let flags = self.stream.read_u8()?;
        let delay_cs = self.stream.read_u16_le()?;
        let index = self.stream.read_u8()?;
        self.stream.skip(1)?; // terminator
        self.pending = Some(GraphicControl {
            disposal: DisposalMethod::from_bits((flags >> 2) & 0x07),
            delay_cs,
            transparent: (flags & 0x01 != 0).then_some(index),
        });
        Ok(())
    }

    fn parse_application(&mut self) -> Result<()> {
        self.stream.skip(1)?; // block size, conventionally 11
        let identifier = self.stream.read_fixed_str(8)?;
        self.stream.skip(3)?; // authentication code
        if identifier == "NETSCAPE" {
            self.stream.skip(2)?; // sub-block size and id
            self.gif.loop_count = Some(self.stream.read_u16_le()?);
            self.stream.skip(1)?; // terminator
            Ok(())
        } else {
            log::debug!("skipping application extension {:?}", identifier);
            self.skip_sub_blocks()
        }
    }

    fn parse_image(&mut self) -> Result<()> {
        let left = self.stream.read_u16_le()?;
        let top = self.stream.read_u16_le()?;
        let width = self.stream.read_u16_le()?;
        let height = self.stream.read_u16_le()?;
        let flags = self.stream.read_u8()?;
        let interlaced = flags & 0x40 != 0;

        let local_table = if flags & 0x80 != 0 {
            let entries = 1usize << ((flags & 0x07) + 1);
            Some(parse_color_table(&mut self.stream, entries)?)
        } else {
            None
        };

        let min_code_size = self.stream.read_u8()?;
        let data = self.read_sub_blocks()?;
        let codes = lzw::unpack(min_code_size, &data)?;
        let mut indices = lzw::decode(&codes)?;

        let expected = width as usize * height as usize;
        if indices.len() < expected {
            return Err(Error::PixelCountMismatch {
                expected,
                got: indices.len(),
            });
        }
        // Padded streams can decode a few indices past the plane.
        indices.truncate(expected);

        let pixels = if interlaced {
            deinterlace(&indices, width as usize, height as usize)
        } else {
            indices
        };

        let control = self.pending.take().unwrap_or_default();
        self.gif.frames.push(Frame {
            left,
            top,
            width,
            height,
            local_table,
            interlaced,
            disposal: control.disposal,
            delay_cs: control.delay_cs,
            transparent: control.transparent,
            pixels,
        });
        Ok(())
    }

    /// Concatenate a size-prefixed sub-block sequence into one buffer.
    fn read_sub_blocks(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        loop {
            let size = self.stream.read_u8()?;
            if size == 0 {
                return Ok(data);
            }
            let chunk = self
                .stream
                .read_bytes(size as usize)
                .map_err(|_| Error::MalformedSubBlocks)?;
            data.extend_from_slice(chunk);
        }
    }

    /// Discard a size-prefixed sub-block sequence.
    fn skip_sub_blocks(&mut self) -> Result<()> {
        loop {
            let size = self.stream.read_u8()?;
            if size == 0 {
                return Ok(());
            }
            self.stream
                .skip(size as usize)
                .map_err(|_| Error::MalformedSubBlocks)?;
        }
    }
}

fn parse_header(stream: &mut ByteStream, gif: &mut Gif) -> Result<()> {
    let signature = stream.read_fixed_str(3)?;
    if signature != "GIF" {
        return Err(Error::SignatureMismatch(signature));
    }
    stream.skip(3)?; // version, assume 89a
    gif.width = stream.read_u16_le()?;
    gif.height = stream.read_u16_le()?;
    let flags = stream.read_u8()?;
    stream.skip(2)?; // background color index, pixel aspect ratio
    if flags & 0x80 != 0 {
        let entries = 1usize << ((flags & 0x07) + 1);
        gif.global_table = Some(parse_color_table(stream, entries)?);
    }
    Ok(())
}

/// Read `entries` RGB triples in stream order.
fn parse_color_table(stream: &mut ByteStream, entries: usize) -> Result<ColorTable> {
    let bytes = stream.read_bytes(3 * entries)?;
    Ok(bytes
        .chunks_exact(3)
        .map(|c| -> Rgb { [c[0], c[1], c[2]] })
        .collect())
}
