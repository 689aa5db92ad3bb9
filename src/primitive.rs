//! Simple building-block data that can be read in one go.
//! Primitives advance the input slice when read.

use crate::prelude::*;

pub(crate) trait SplitChecked: Sized {
    fn split_checked(&mut self, at: usize) -> Option<Self>;
}
impl<'a> SplitChecked for &'a [u8] {
    #[inline]
    fn split_checked(&mut self, at: usize) -> Option<&'a [u8]> {
        if at > self.len() {
            None
        } else {
            let (extracted, remainder) = self.split_at(at);
            *self = remainder;
            Some(extracted)
        }
    }
}

/// Implemented on integer types for reading in either byte order.
pub(crate) trait IntRead: Sized {
    /// Reads a big-endian integer.
    fn read_be(data: &mut &[u8]) -> Option<Self>;
    /// Reads a little-endian integer.
    fn read_le(data: &mut &[u8]) -> Option<Self>;
}

macro_rules! impl_read_int {
    {$( $int:ty ),*} => {
        $(
            impl IntRead for $int {
                #[inline]
                fn read_be(raw: &mut &[u8]) -> Option<$int> {
                    let bytes = raw.split_checked(mem::size_of::<$int>())?;
                    let mut buf = [0; mem::size_of::<$int>()];
                    buf.copy_from_slice(bytes);
                    Some(<$int>::from_be_bytes(buf))
                }
                #[inline]
                fn read_le(raw: &mut &[u8]) -> Option<$int> {
                    let bytes = raw.split_checked(mem::size_of::<$int>())?;
                    let mut buf = [0; mem::size_of::<$int>()];
                    buf.copy_from_slice(bytes);
                    Some(<$int>::from_le_bytes(buf))
                }
            }
        )*
    }
}
impl_read_int! {u8, i8, u16, i16, u32, i32}

/// Reads a 24-bit big-endian integer.
pub(crate) fn read_u24_be(raw: &mut &[u8]) -> Option<u32> {
    let bytes = raw.split_checked(3)?;
    Some(bytes.iter().fold(0, |acc, &byte| (acc << 8) | byte as u32))
}

/// Maximum value representable as a variable-length quantity.
pub const VARLEN_MAX: u32 = (1 << 28) - 1;

/// Reads a variable-length quantity, as used by Standard Midi Files.
///
/// Fails if the quantity spans more than 4 bytes or runs out of input. On failure the slice is
/// left where the error was found.
pub fn read_varlen(raw: &mut &[u8]) -> Option<u32> {
    let mut int: u32 = 0;
    for _ in 0..4 {
        let byte = raw.split_checked(1)?[0];
        int = (int << 7) | bit_range(byte, 0..7) as u32;
        if bit_range(byte, 7..8) == 0 {
            return Some(int);
        }
    }
    None
}

/// Write a variable-length quantity.
///
/// Values above [`VARLEN_MAX`](constant.VARLEN_MAX.html) are truncated to 28 bits.
pub fn write_varlen(int: u32, out: &mut Vec<u8>) {
    let int = int & VARLEN_MAX;
    let mut skipping = true;
    for i in (0..4).rev() {
        let byte = ((int >> (i * 7)) & 0x7F) as u8;
        if skipping && byte == 0 && i != 0 {
            //Skip these leading zeros
        } else {
            skipping = false;
            out.push(if i == 0 { byte } else { byte | 0x80 });
        }
    }
}

/// Reads a slice represented in the input as a varlen length followed by that many bytes.
pub(crate) fn read_varlen_slice<'a>(raw: &mut &'a [u8]) -> Option<&'a [u8]> {
    let len = read_varlen(raw)?;
    raw.split_checked(len as usize)
}

/// Read `count` records of `size` bytes each from the start of `raw`.
///
/// Returns `None` without advancing the input if the records would overrun it.
pub(crate) fn read_records<'a, T, F>(
    raw: &mut &'a [u8],
    count: u32,
    size: usize,
    mut read: F,
) -> Option<Vec<T>>
where
    F: FnMut(&mut &'a [u8]) -> Option<T>,
{
    let all: &'a [u8] = *raw;
    let total = (count as usize).checked_mul(size)?;
    let mut records = all.get(..total)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut record = records.split_checked(size)?;
        out.push(read(&mut record)?);
    }
    *raw = &all[total..];
    Some(out)
}

/// A four-character chunk identifier.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);
impl Tag {
    #[inline]
    pub const fn new(bytes: &[u8; 4]) -> Tag {
        Tag(*bytes)
    }

    /// Reads a tag, without checking its validity.
    #[inline]
    pub(crate) fn read(raw: &mut &[u8]) -> Option<Tag> {
        let bytes = raw.split_checked(4)?;
        let mut tag = [0; 4];
        tag.copy_from_slice(bytes);
        Some(Tag(tag))
    }

    /// A tag is valid if all of its characters are printable ASCII (space included).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|&c| (0x20..=0x7E).contains(&c))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}
impl PartialEq<[u8; 4]> for Tag {
    fn eq(&self, rhs: &[u8; 4]) -> bool {
        self.0 == *rhs
    }
}
impl PartialEq<&[u8; 4]> for Tag {
    fn eq(&self, rhs: &&[u8; 4]) -> bool {
        self.0 == **rhs
    }
}
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &c in self.0.iter() {
            if (0x20..=0x7E).contains(&c) {
                write!(f, "{}", c as char)?;
            } else {
                write!(f, "\\x{:02x}", c)?;
            }
        }
        Ok(())
    }
}
impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag(\"{}\")", self)
    }
}

/// The order in which tracks should be laid out when playing back a Standard Midi File.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Format {
    /// This file should have a single track only.
    SingleTrack,
    /// This file has several tracks that should be played simultaneously.
    ///
    /// Usually the first track controls tempo and other song metadata.
    Parallel,
    /// This file has several tracks, each one a separate song.
    Sequential,
}
impl Format {
    pub fn from_int(format: u16) -> Option<Format> {
        Some(match format {
            0 => Format::SingleTrack,
            1 => Format::Parallel,
            2 => Format::Sequential,
            _ => return None,
        })
    }
}

/// The timing for a Standard Midi File.
/// This can be in ticks/beat or ticks/second.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Timing {
    /// Specifies ticks/beat as a 15-bit integer.
    ///
    /// The length of a beat is not standard, so in order to fully describe the length of a MIDI
    /// tick the tempo meta event should be present.
    Metrical(u16),
    /// Specifies ticks/second by dividing a second into frames and then into subframes.
    ///
    /// `fps` is taken as-is from the file, so it may not be one of the standard SMPTE rates.
    Timecode { fps: i16, subframes: u8 },
}
impl Timing {
    pub fn from_division(division: u16) -> Timing {
        if bit_range(division, 15..16) != 0 {
            let hi = bit_range(division, 8..16) as u8;
            Timing::Timecode {
                fps: -(hi as i8 as i16),
                subframes: bit_range(division, 0..8) as u8,
            }
        } else {
            Timing::Metrical(division)
        }
    }
}
