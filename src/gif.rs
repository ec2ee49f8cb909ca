//! The decoded GIF data model: the top-level record, the per-frame records,
//! color tables, and the interlace row ordering.

use crate::{Error, Result};

/// One color table entry: red, green, blue. No alpha.
pub type Rgb = [u8; 3];

/// An ordered color table, global or local. Sizes are powers of two between
/// 2 and 256.
pub type ColorTable = Vec<Rgb>;

/// How a frame's pixels should be treated before the next frame is rendered.
/// Rendering itself is outside this crate; the enum only carries the decoded
/// intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    /// No disposal specified.
    #[default]
    None,
    /// Leave the frame in place.
    Keep,
    /// Restore the area to the background color.
    RestoreBackground,
    /// Restore the area to the previous frame.
    RestorePrevious,
}

impl DisposalMethod {
    /// Decode the 3-bit disposal field of a graphic control extension.
    /// Reserved values map to `None`.
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            1 => DisposalMethod::Keep,
            2 => DisposalMethod::RestoreBackground,
            3 => DisposalMethod::RestorePrevious,
            _ => DisposalMethod::None,
        }
    }

    /// The 3-bit field value for the graphic control extension.
    pub fn to_bits(self) -> u8 {
        match self {
            DisposalMethod::None => 0,
            DisposalMethod::Keep => 1,
            DisposalMethod::RestoreBackground => 2,
            DisposalMethod::RestorePrevious => 3,
        }
    }
}

/// One image block of a GIF file, decoded.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Position of the frame on the logical screen.
    pub left: u16,
    pub top: u16,
    /// Dimensions of the frame, which may be smaller than the screen.
    pub width: u16,
    pub height: u16,
    /// A local color table superseding the global one for this frame only.
    pub local_table: Option<ColorTable>,
    /// Whether the frame was stored with interlaced rows. The pixel plane is
    /// always kept in natural row order.
    pub interlaced: bool,
    pub disposal: DisposalMethod,
    /// Delay before the next frame, in hundredths of a second.
    pub delay_cs: u16,
    /// The index that should be treated as transparent, if any.
    pub transparent: Option<u8>,
    /// The decoded pixel-index plane, row-major, `width * height` long.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// The color table that applies to this frame.
    pub fn palette<'a>(&'a self, gif: &'a Gif) -> Option<&'a ColorTable> {
        self.local_table.as_ref().or(gif.global_table.as_ref())
    }
}

/// A fully parsed GIF file.
#[derive(Debug, Clone, Default)]
pub struct Gif {
    /// Logical screen dimensions.
    pub width: u16,
    pub height: u16,
    /// The global color table, if the header declared one.
    pub global_table: Option<ColorTable>,
    /// Animation iteration count from the NETSCAPE application extension.
    /// `None` means play once.
    pub loop_count: Option<u16>,
    /// Frames in parse order, one per image block.
    pub frames: Vec<Frame>,
}

impl Gif {
    pub fn has_global_table(&self) -> bool {
        self.global_table.is_some()
    }

    /// Hand one frame's index plane and its applicable color table to an
    /// external pixel surface.
    pub fn blit_frame(&self, index: usize, sink: &mut dyn PixelSink) -> Result<()> {
        let frame = &self.frames[index];
        let palette = frame.palette(self).ok_or(Error::MissingColorTable)?;
        sink.accept(frame, palette);
        Ok(())
    }
}

/// An abstract 2-D pixel surface. The parser does not own how pixels are
/// displayed; a sink receives the decoded index stream together with the
/// color table that applies to it and does whatever it wants.
pub trait PixelSink {
    fn accept(&mut self, frame: &Frame, palette: &[Rgb]);
}

/// The row offset and step of each interlace pass.
const INTERLACE_PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Reorder an interlaced pixel plane into natural row order. The input holds
/// the rows in pass order: rows 0,8,16,..., then 4,12,20,..., then
/// 2,6,10,..., then 1,3,5,...
pub fn deinterlace(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; pixels.len()];
    let mut cursor = 0;
    for (start, step) in INTERLACE_PASSES {
        for row in (start..height).step_by(step) {
            out[row * width..(row + 1) * width]
                .copy_from_slice(&pixels[cursor..cursor + width]);
            cursor += width;
        }
    }
    out
}

#[test]
fn test_deinterlace_row_order() {
    // One byte per row, ten rows. Pass order for height 10 is
    // 0,8 / 4 / 2,6 / 1,3,5,7,9.
    let stored = [0u8, 8, 4, 2, 6, 1, 3, 5, 7, 9];
    let natural = deinterlace(&stored, 1, 10);
    assert_eq!(natural, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}
