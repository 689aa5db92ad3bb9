//! Downloadable Sounds (DLS) chunks.

use crate::{
    prelude::*,
    wave::{at_least, check_garbage, exactly, records},
};

/// Collection header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Colh {
    pub instruments: u16,
}
impl Colh {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Colh> {
        exactly(raw, 4, tag, diags)?;
        Some(Colh {
            instruments: u16::read_le(&mut raw)?,
        })
    }
}

/// A DLS identifier (a GUID).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Dlid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}
impl Dlid {
    /// Leaves the input untouched on failure.
    fn read(raw: &mut &[u8]) -> Option<Dlid> {
        let mut cur = *raw;
        let data1 = u32::read_le(&mut cur)?;
        let data2 = u16::read_le(&mut cur)?;
        let data3 = u16::read_le(&mut cur)?;
        let mut data4 = [0; 8];
        data4.copy_from_slice(cur.split_checked(8)?);
        *raw = cur;
        Some(Dlid {
            data1,
            data2,
            data3,
            data4,
        })
    }

    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Dlid> {
        exactly(raw, 16, tag, diags)?;
        Dlid::read(&mut raw)
    }
}

/// A single operation of a conditional chunk.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CdlOp {
    /// Operators without operand (`AND` through `NOT`), by opcode.
    Operator(u16),
    Const(u32),
    Query(Dlid),
    QuerySupported(Dlid),
}

/// Conditional chunk, a small stack-machine expression.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cdl {
    pub ops: Vec<CdlOp>,
}
impl Cdl {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Cdl> {
        at_least(raw, 2, tag, diags)?;
        let mut ops = Vec::new();
        loop {
            let mut cur = raw;
            let opcode = match u16::read_le(&mut cur) {
                Some(opcode) => opcode,
                None => break,
            };
            let op = match opcode {
                0x0001..=0x000F => CdlOp::Operator(opcode),
                0x0010 => match u32::read_le(&mut cur) {
                    Some(constant) => CdlOp::Const(constant),
                    None => {
                        diags.warn_at(format!("Not enough '{}' size for constant", tag), cur);
                        raw = cur;
                        break;
                    }
                },
                0x0011 | 0x0012 => match Dlid::read(&mut cur) {
                    Some(id) if opcode == 0x0011 => CdlOp::Query(id),
                    Some(id) => CdlOp::QuerySupported(id),
                    None => {
                        diags.warn_at(format!("Not enough '{}' size for query", tag), cur);
                        raw = cur;
                        break;
                    }
                },
                _ => {
                    diags.warn_at(format!("Invalid opcode in '{}' chunk", tag), raw);
                    raw = cur;
                    break;
                }
            };
            ops.push(op);
            raw = cur;
        }
        check_garbage(raw, tag, diags);
        Some(Cdl { ops })
    }
}

/// Instrument header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Insh {
    pub regions: u32,
    pub bank_locale: u32,
    pub instrument_locale: u32,
}
impl Insh {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Insh> {
        exactly(raw, 12, tag, diags)?;
        Some(Insh {
            regions: u32::read_le(&mut raw)?,
            bank_locale: u32::read_le(&mut raw)?,
            instrument_locale: u32::read_le(&mut raw)?,
        })
    }
}

/// Region header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Rgnh {
    pub low_key: u16,
    pub high_key: u16,
    pub low_velocity: u16,
    pub high_velocity: u16,
    pub options: u16,
    pub key_group: u16,
    /// Only present in DLS level 2 files.
    pub layer: Option<u16>,
}
impl Rgnh {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Rgnh> {
        at_least(raw, 12, tag, diags)?;
        Some(Rgnh {
            low_key: u16::read_le(&mut raw)?,
            high_key: u16::read_le(&mut raw)?,
            low_velocity: u16::read_le(&mut raw)?,
            high_velocity: u16::read_le(&mut raw)?,
            options: u16::read_le(&mut raw)?,
            key_group: u16::read_le(&mut raw)?,
            layer: u16::read_le(&mut raw),
        })
    }
}

/// A connection block of an articulator.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Connection {
    pub source: u16,
    pub control: u16,
    pub destination: u16,
    pub transform: u16,
    pub scale: i32,
}

/// Level 1 or level 2 articulator (`art1`, `art2`).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Art {
    pub size: u32,
    pub count: u32,
    pub connections: Vec<Connection>,
}
impl Art {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Art> {
        at_least(raw, 8, tag, diags)?;
        let size = u32::read_le(&mut raw)?;
        let count = u32::read_le(&mut raw)?;
        let connections = records(&mut raw, count, 12, tag, diags, |rec| {
            Some(Connection {
                source: u16::read_le(rec)?,
                control: u16::read_le(rec)?,
                destination: u16::read_le(rec)?,
                transform: u16::read_le(rec)?,
                scale: i32::read_le(rec)?,
            })
        });
        check_garbage(raw, tag, diags);
        Some(Art {
            size,
            count,
            connections,
        })
    }
}

/// Wave link.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Wlnk {
    pub options: u16,
    pub phase_group: u16,
    pub channel: u32,
    pub table_index: u32,
}
impl Wlnk {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Wlnk> {
        exactly(raw, 12, tag, diags)?;
        Some(Wlnk {
            options: u16::read_le(&mut raw)?,
            phase_group: u16::read_le(&mut raw)?,
            channel: u32::read_le(&mut raw)?,
            table_index: u32::read_le(&mut raw)?,
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct WsmpLoop {
    pub size: u32,
    pub kind: u32,
    pub start: u32,
    pub length: u32,
}

/// Wave sample.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Wsmp {
    pub size: u32,
    pub unity_note: u16,
    pub fine_tune: i16,
    pub gain: i32,
    pub options: u32,
    pub loop_count: u32,
    pub loops: Vec<WsmpLoop>,
}
impl Wsmp {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Wsmp> {
        at_least(raw, 20, tag, diags)?;
        let size = u32::read_le(&mut raw)?;
        let unity_note = u16::read_le(&mut raw)?;
        let fine_tune = i16::read_le(&mut raw)?;
        let gain = i32::read_le(&mut raw)?;
        let options = u32::read_le(&mut raw)?;
        let loop_count = u32::read_le(&mut raw)?;
        let loops = records(&mut raw, loop_count, 16, tag, diags, |rec| {
            Some(WsmpLoop {
                size: u32::read_le(rec)?,
                kind: u32::read_le(rec)?,
                start: u32::read_le(rec)?,
                length: u32::read_le(rec)?,
            })
        });
        check_garbage(raw, tag, diags);
        Some(Wsmp {
            size,
            unity_note,
            fine_tune,
            gain,
            options,
            loop_count,
            loops,
        })
    }
}

/// Pool table, offsets of the wave data.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Ptbl {
    pub size: u32,
    pub count: u32,
    pub offsets: Vec<u32>,
}
impl Ptbl {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Ptbl> {
        at_least(raw, 8, tag, diags)?;
        let size = u32::read_le(&mut raw)?;
        let count = u32::read_le(&mut raw)?;
        let offsets = records(&mut raw, count, 4, tag, diags, u32::read_le);
        check_garbage(raw, tag, diags);
        Some(Ptbl {
            size,
            count,
            offsets,
        })
    }
}

/// Version of the collection.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Vers {
    pub version_ms: u32,
    pub version_ls: u32,
}
impl Vers {
    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Vers> {
        exactly(raw, 8, tag, diags)?;
        Some(Vers {
            version_ms: u32::read_le(&mut raw)?,
            version_ls: u32::read_le(&mut raw)?,
        })
    }
}
