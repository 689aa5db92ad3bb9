//! Generic RIFF chunks: `INFO` strings, `DISP` and the `data` chunk of RMID files.
//!
//! There's an abomination called RMID, MIDI embedded in a RIFF file. The wrapped SMF is walked
//! as children of the `data` chunk, so its `MThd` and `MTrk` chunks show up in the chunk list
//! like those of a plain SMF.

use crate::{
    chunk::{walk, Chunk, Decoded},
    prelude::*,
};

/// Read a zero-terminated string.
///
/// Without a terminator the whole payload is used.
pub(crate) fn zstring<'a>(raw: &'a [u8], tag: Tag, diags: &mut Diagnostics) -> &'a [u8] {
    match raw.iter().position(|&b| b == 0) {
        Some(len) => &raw[..len],
        None => {
            diags.warn_at(format!("ZSTR in '{}' not terminated by zero", tag), raw);
            raw
        }
    }
}

const CF_TEXT: u32 = 0x0001;
const CF_DIB: u32 = 0x0008;

/// A `DISP` chunk, holding clipboard data to display for the file.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Disp<'a> {
    /// Windows clipboard format.
    pub kind: u32,
    pub data: &'a [u8],
    /// Text, for `CF_TEXT` data.
    pub text: Option<&'a [u8]>,
    /// Bitmap header, for `CF_DIB` data.
    pub bitmap: Option<BitmapInfo>,
}

/// A `BITMAPINFOHEADER`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BitmapInfo {
    pub size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub clr_used: u32,
    pub clr_important: u32,
}
impl BitmapInfo {
    fn read(raw: &mut &[u8]) -> Option<BitmapInfo> {
        Some(BitmapInfo {
            size: u32::read_le(raw)?,
            width: i32::read_le(raw)?,
            height: i32::read_le(raw)?,
            planes: u16::read_le(raw)?,
            bit_count: u16::read_le(raw)?,
            compression: u32::read_le(raw)?,
            size_image: u32::read_le(raw)?,
            x_pels_per_meter: i32::read_le(raw)?,
            y_pels_per_meter: i32::read_le(raw)?,
            clr_used: u32::read_le(raw)?,
            clr_important: u32::read_le(raw)?,
        })
    }
}

impl<'a> Disp<'a> {
    pub(crate) fn decode(mut raw: &'a [u8], tag: Tag, diags: &mut Diagnostics) -> Option<Disp<'a>> {
        let kind = match u32::read_le(&mut raw) {
            Some(kind) => kind,
            None => {
                diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
                return None;
            }
        };
        let data = raw;
        let mut disp = Disp {
            kind,
            data,
            text: None,
            bitmap: None,
        };
        match kind {
            CF_TEXT => disp.text = Some(&data[..data.len().saturating_sub(1)]),
            CF_DIB => {
                let mut cur = data;
                disp.bitmap = BitmapInfo::read(&mut cur);
            }
            _ => {}
        }
        Some(disp)
    }
}

/// Decode a `data` chunk. Only RMID data is understood.
pub(crate) fn decode_data<'a>(
    raw: &'a [u8],
    tag: Tag,
    ancestors: &[Tag],
    diags: &mut Diagnostics,
) -> Decoded<'a> {
    if ancestors.last().map_or(true, |parent| parent != b"RMID") {
        return Decoded::Opaque;
    }
    let own = Chunk::new(tag, ancestors, raw, None);
    let path = own.path();
    let mut chunks = vec![own];
    chunks.extend(walk(raw, &path, diags));
    Decoded::Chunks(chunks)
}
