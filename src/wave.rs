//! WAVE form chunks.
//!
//! All multi-byte fields are little-endian.

use crate::{prelude::*, primitive::read_records};

/// Read the repeated records of a chunk.
///
/// If the declared count overruns the payload, no record is read and the rest of the payload is
/// dropped.
pub(crate) fn records<'a, T, F>(
    raw: &mut &'a [u8],
    count: u32,
    size: usize,
    tag: Tag,
    diags: &mut Diagnostics,
    read: F,
) -> Vec<T>
where
    F: FnMut(&mut &'a [u8]) -> Option<T>,
{
    match read_records(raw, count, size, read) {
        Some(records) => records,
        None => {
            diags.warn_at(
                format!("Not enough '{}' size for {} record(s)", tag, count),
                *raw,
            );
            *raw = &[];
            Vec::new()
        }
    }
}

/// Report any bytes left after the known fields.
pub(crate) fn check_garbage(rest: &[u8], tag: Tag, diags: &mut Diagnostics) {
    if !rest.is_empty() {
        diags.warn_at(format!("Garbage in '{}'", tag), rest);
    }
}

/// Reject payloads shorter than `len`.
pub(crate) fn at_least(raw: &[u8], len: usize, tag: Tag, diags: &mut Diagnostics) -> Option<()> {
    if raw.len() < len {
        diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
        None
    } else {
        Some(())
    }
}

/// Reject payloads that are not exactly `len` bytes long.
pub(crate) fn exactly(raw: &[u8], len: usize, tag: Tag, diags: &mut Diagnostics) -> Option<()> {
    if raw.len() != len {
        diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
        None
    } else {
        Some(())
    }
}

/// Format chunk.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Fmt<'a> {
    pub format_tag: u16,
    pub channels: u16,
    pub samples_per_sec: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Size of the extension and the extension bytes, when present.
    pub extension: Option<(u16, &'a [u8])>,
}
impl<'a> Fmt<'a> {
    pub(crate) fn decode(mut raw: &'a [u8], tag: Tag, diags: &mut Diagnostics) -> Option<Fmt<'a>> {
        at_least(raw, 16, tag, diags)?;
        let mut fmt = Fmt {
            format_tag: u16::read_le(&mut raw)?,
            channels: u16::read_le(&mut raw)?,
            samples_per_sec: u32::read_le(&mut raw)?,
            avg_bytes_per_sec: u32::read_le(&mut raw)?,
            block_align: u16::read_le(&mut raw)?,
            bits_per_sample: u16::read_le(&mut raw)?,
            extension: None,
        };
        if let Some(cb_size) = u16::read_le(&mut raw) {
            let len = (cb_size as usize).min(raw.len());
            fmt.extension = Some((cb_size, &raw[..len]));
        }
        Some(fmt)
    }
}

/// Fact chunk.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Fact {
    pub sample_length: u32,
}
impl Fact {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Fact> {
        at_least(raw, 4, tag, diags)?;
        Some(Fact {
            sample_length: u32::read_le(&mut raw)?,
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CuePoint {
    pub name: u32,
    pub position: u32,
    pub chunk: Tag,
    pub chunk_start: u32,
    pub block_start: u32,
    pub sample_offset: u32,
}

/// Cue points chunk.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cue {
    pub count: u32,
    pub points: Vec<CuePoint>,
}
impl Cue {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Cue> {
        at_least(raw, 4, tag, diags)?;
        let count = u32::read_le(&mut raw)?;
        let points = records(&mut raw, count, 24, tag, diags, |rec| {
            Some(CuePoint {
                name: u32::read_le(rec)?,
                position: u32::read_le(rec)?,
                chunk: Tag::read(rec)?,
                chunk_start: u32::read_le(rec)?,
                block_start: u32::read_le(rec)?,
                sample_offset: u32::read_le(rec)?,
            })
        });
        check_garbage(raw, tag, diags);
        Some(Cue { count, points })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PlaySegment {
    pub name: u32,
    pub length: u32,
    pub loops: u32,
}

/// Playlist chunk.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Plst {
    pub count: u32,
    pub segments: Vec<PlaySegment>,
}
impl Plst {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Plst> {
        at_least(raw, 4, tag, diags)?;
        let count = u32::read_le(&mut raw)?;
        let segments = records(&mut raw, count, 12, tag, diags, |rec| {
            Some(PlaySegment {
                name: u32::read_le(rec)?,
                length: u32::read_le(rec)?,
                loops: u32::read_le(rec)?,
            })
        });
        check_garbage(raw, tag, diags);
        Some(Plst { count, segments })
    }
}

/// Label or note associated with a cue point (`labl`, `note`).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Label<'a> {
    pub name: u32,
    pub text: &'a [u8],
}
impl<'a> Label<'a> {
    pub(crate) fn decode(mut raw: &'a [u8], tag: Tag, diags: &mut Diagnostics) -> Option<Label<'a>> {
        at_least(raw, 5, tag, diags)?;
        let name = u32::read_le(&mut raw)?;
        let text = crate::riff::zstring(raw, tag, diags);
        Some(Label { name, text })
    }
}

/// Labeled text chunk.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Ltxt {
    pub name: u32,
    pub sample_length: u32,
    pub purpose: Tag,
    pub country: u16,
    pub language: u16,
    pub dialect: u16,
    pub code_page: u16,
}
impl Ltxt {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Ltxt> {
        at_least(raw, 20, tag, diags)?;
        Some(Ltxt {
            name: u32::read_le(&mut raw)?,
            sample_length: u32::read_le(&mut raw)?,
            purpose: Tag::read(&mut raw)?,
            country: u16::read_le(&mut raw)?,
            language: u16::read_le(&mut raw)?,
            dialect: u16::read_le(&mut raw)?,
            code_page: u16::read_le(&mut raw)?,
        })
    }
}

/// Instrument chunk.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Inst {
    pub unshifted_note: u8,
    pub fine_tune: i8,
    pub gain: i8,
    pub low_note: u8,
    pub high_note: u8,
    pub low_velocity: u8,
    pub high_velocity: u8,
}
impl Inst {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Inst> {
        at_least(raw, 7, tag, diags)?;
        Some(Inst {
            unshifted_note: u8::read_le(&mut raw)?,
            fine_tune: i8::read_le(&mut raw)?,
            gain: i8::read_le(&mut raw)?,
            low_note: u8::read_le(&mut raw)?,
            high_note: u8::read_le(&mut raw)?,
            low_velocity: u8::read_le(&mut raw)?,
            high_velocity: u8::read_le(&mut raw)?,
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SampleLoop {
    pub identifier: u32,
    pub kind: u32,
    pub start: u32,
    pub end: u32,
    pub fraction: u32,
    pub play_count: u32,
}

/// Sampler chunk.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Smpl<'a> {
    pub manufacturer: u32,
    pub product: u32,
    pub sample_period: u32,
    pub midi_unity_note: u32,
    pub midi_pitch_fraction: u32,
    pub smpte_format: u32,
    pub smpte_offset: u32,
    pub loop_count: u32,
    pub sampler_data_len: u32,
    pub loops: Vec<SampleLoop>,
    /// Empty if the declared size does not fit in the payload.
    pub sampler_data: &'a [u8],
}
impl<'a> Smpl<'a> {
    pub(crate) fn decode(mut raw: &'a [u8], tag: Tag, diags: &mut Diagnostics) -> Option<Smpl<'a>> {
        at_least(raw, 36, tag, diags)?;
        let mut smpl = Smpl {
            manufacturer: u32::read_le(&mut raw)?,
            product: u32::read_le(&mut raw)?,
            sample_period: u32::read_le(&mut raw)?,
            midi_unity_note: u32::read_le(&mut raw)?,
            midi_pitch_fraction: u32::read_le(&mut raw)?,
            smpte_format: u32::read_le(&mut raw)?,
            smpte_offset: u32::read_le(&mut raw)?,
            loop_count: u32::read_le(&mut raw)?,
            sampler_data_len: u32::read_le(&mut raw)?,
            loops: Vec::new(),
            sampler_data: &[],
        };
        smpl.loops = match read_records(&mut raw, smpl.loop_count, 24, |rec| {
            Some(SampleLoop {
                identifier: u32::read_le(rec)?,
                kind: u32::read_le(rec)?,
                start: u32::read_le(rec)?,
                end: u32::read_le(rec)?,
                fraction: u32::read_le(rec)?,
                play_count: u32::read_le(rec)?,
            })
        }) {
            Some(loops) => loops,
            None => {
                diags.warn_at(
                    format!("Not enough '{}' size for {} loop(s)", tag, smpl.loop_count),
                    raw,
                );
                Vec::new()
            }
        };
        match raw.split_checked(smpl.sampler_data_len as usize) {
            Some(data) => smpl.sampler_data = data,
            None => diags.warn_at(
                format!("Not enough sampler-specific-data size in '{}'", tag),
                raw,
            ),
        }
        check_garbage(raw, tag, diags);
        Some(smpl)
    }
}
