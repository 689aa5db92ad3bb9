//! YAMAHA style file chunks (`CASM` sections, `OTSc` and `FNRc` containers).

use crate::{
    chunk::{Content, Decoded},
    prelude::*,
    primitive::read_u24_be,
    registry::with_children,
};

/// Channel table entry, as stored in `Ctab`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChannelTable<'a> {
    pub source_channel: u8,
    /// Raw, space padded.
    pub voice_name: &'a [u8],
    pub destination_channel: u8,
    pub editable: u8,
    pub note_mute: [u8; 2],
    pub chord_mute: [u8; 5],
    pub source_chord: u8,
    pub chord_type: u8,
    pub note_transposition_rule: u8,
    pub note_transposition_table: u8,
    pub high_key: u8,
    pub note_limit_low: u8,
    pub note_limit_high: u8,
    pub retrigger_rule: u8,
    pub special_feature_id: u8,
    pub special_features: Option<[u8; 4]>,
}

/// Fields shared by both versions of the channel table.
struct Common<'a> {
    source_channel: u8,
    voice_name: &'a [u8],
    destination_channel: u8,
    editable: u8,
    note_mute: [u8; 2],
    chord_mute: [u8; 5],
    source_chord: u8,
    chord_type: u8,
}
impl<'a> Common<'a> {
    /// `raw` must hold at least 20 bytes.
    fn read(raw: &'a [u8]) -> Common<'a> {
        let mut note_mute = [0; 2];
        note_mute.copy_from_slice(&raw[11..13]);
        let mut chord_mute = [0; 5];
        chord_mute.copy_from_slice(&raw[13..18]);
        Common {
            source_channel: raw[0],
            voice_name: &raw[1..9],
            destination_channel: raw[9],
            editable: raw[10],
            note_mute,
            chord_mute,
            source_chord: raw[18],
            chord_type: raw[19],
        }
    }
}

impl<'a> ChannelTable<'a> {
    pub(crate) fn decode(
        raw: &'a [u8],
        tag: Tag,
        diags: &mut Diagnostics,
    ) -> Option<ChannelTable<'a>> {
        if raw.len() < 27 {
            diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
            return None;
        }
        let common = Common::read(raw);
        let special_feature_id = raw[26];
        let special_features = if special_feature_id != 0 {
            raw.get(27..31).map(|b| [b[0], b[1], b[2], b[3]])
        } else {
            None
        };
        Some(ChannelTable {
            source_channel: common.source_channel,
            voice_name: common.voice_name,
            destination_channel: common.destination_channel,
            editable: common.editable,
            note_mute: common.note_mute,
            chord_mute: common.chord_mute,
            source_chord: common.source_chord,
            chord_type: common.chord_type,
            note_transposition_rule: raw[20],
            note_transposition_table: raw[21],
            high_key: raw[22],
            note_limit_low: raw[23],
            note_limit_high: raw[24],
            retrigger_rule: raw[25],
            special_feature_id,
            special_features,
        })
    }
}

/// Transposition settings of one note range in `Ctb2`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct PartTransposition {
    pub note_transposition_rule: u8,
    pub note_transposition_table: u8,
    pub high_key: u8,
    pub note_limit_low: u8,
    pub note_limit_high: u8,
    pub retrigger_rule: u8,
}

/// Channel table entry, second version (`Ctb2`).
///
/// The chunk is followed by embedded `Cntt` chunks, which show up as its children.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChannelTableV2<'a> {
    pub source_channel: u8,
    pub voice_name: &'a [u8],
    pub destination_channel: u8,
    pub editable: u8,
    pub note_mute: [u8; 2],
    pub chord_mute: [u8; 5],
    pub source_chord: u8,
    pub chord_type: u8,
    pub middle_note_limit_low: u8,
    pub middle_note_limit_high: u8,
    /// Low, middle and high note ranges.
    pub parts: [PartTransposition; 3],
    pub unknown: &'a [u8],
}

const CTB2_HEAD: usize = 47;

pub(crate) fn decode_ctb2<'a>(
    raw: &'a [u8],
    tag: Tag,
    ancestors: &[Tag],
    diags: &mut Diagnostics,
) -> Decoded<'a> {
    if raw.len() < CTB2_HEAD {
        diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
        return Decoded::Invalid;
    }
    let (head, rest) = raw.split_at(CTB2_HEAD);
    let common = Common::read(head);
    let mut parts = [PartTransposition::default(); 3];
    for (i, part) in parts.iter_mut().enumerate() {
        let p = &head[22 + 6 * i..28 + 6 * i];
        *part = PartTransposition {
            note_transposition_rule: p[0],
            note_transposition_table: p[1],
            high_key: p[2],
            note_limit_low: p[3],
            note_limit_high: p[4],
            retrigger_rule: p[5],
        };
    }
    let table = ChannelTableV2 {
        source_channel: common.source_channel,
        voice_name: common.voice_name,
        destination_channel: common.destination_channel,
        editable: common.editable,
        note_mute: common.note_mute,
        chord_mute: common.chord_mute,
        source_chord: common.source_chord,
        chord_type: common.chord_type,
        middle_note_limit_low: head[20],
        middle_note_limit_high: head[21],
        parts,
        unknown: &head[40..47],
    };
    with_children(
        head,
        Content::ChannelTableV2(table),
        rest,
        tag,
        ancestors,
        diags,
    )
}

/// Note transposition table override for a source channel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Cntt {
    pub source_channel: u8,
    pub note_transposition_table: u8,
}
impl Cntt {
    pub(crate) fn decode(raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Cntt> {
        if raw.len() != 2 {
            diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
            return None;
        }
        Some(Cntt {
            source_channel: raw[0],
            note_transposition_table: raw[1],
        })
    }
}

/// Tempo and time signature of a registration (`FNRP`).
///
/// The chunk is followed by embedded name and keyword chunks, which show up as its children.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Fnrp {
    pub usec_per_beat: u32,
    pub numerator: u8,
    pub denominator: u8,
}

const FNRP_HEAD: usize = 5;

pub(crate) fn decode_fnrp<'a>(
    raw: &'a [u8],
    tag: Tag,
    ancestors: &[Tag],
    diags: &mut Diagnostics,
) -> Decoded<'a> {
    if raw.len() < FNRP_HEAD {
        diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
        return Decoded::Invalid;
    }
    let (head, rest) = raw.split_at(FNRP_HEAD);
    let mut cur = head;
    let fnrp = match (read_u24_be(&mut cur), u8::read_be(&mut cur), u8::read_be(&mut cur)) {
        (Some(usec_per_beat), Some(numerator), Some(denominator)) => Fnrp {
            usec_per_beat,
            numerator,
            denominator,
        },
        _ => return Decoded::Invalid,
    };
    with_children(head, Content::Fnrp(fnrp), rest, tag, ancestors, diags)
}
