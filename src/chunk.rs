//! The generic tag/length/value walker and the chunk records it produces.

use crate::{
    dls,
    macbinary::MacBinary,
    mu,
    prelude::*,
    registry::{self, ChunkTypeInfo},
    riff,
    smf::{Header, TrackEvent},
    wave, ysf,
};

/// Identifies a chunk record.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ChunkId {
    /// A chunk read from the input.
    Tag(Tag),
    /// Trailing bytes of a level that could not be read as chunks.
    Garbage,
    /// The MacBinary envelope in front of the actual file.
    MacBinary,
}
impl ChunkId {
    #[inline]
    pub fn tag(&self) -> Option<Tag> {
        match self {
            ChunkId::Tag(tag) => Some(*tag),
            _ => None,
        }
    }
}
impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChunkId::Tag(tag) => fmt::Display::fmt(tag, f),
            ChunkId::Garbage => f.write_str("$Garbage$"),
            ChunkId::MacBinary => f.write_str("$MacBinary$"),
        }
    }
}

/// The decoded payload of a chunk with a known layout.
#[derive(Clone, PartialEq, Debug)]
pub enum Content<'a> {
    Header(Header),
    Track(Vec<TrackEvent<'a>>),
    /// Raw string bytes, without any terminator. No text encoding is assumed.
    Str(&'a [u8]),
    ChannelTable(ysf::ChannelTable<'a>),
    ChannelTableV2(ysf::ChannelTableV2<'a>),
    Cntt(ysf::Cntt),
    Fnrp(ysf::Fnrp),
    Disp(riff::Disp<'a>),
    Fmt(wave::Fmt<'a>),
    Fact(wave::Fact),
    Cue(wave::Cue),
    Plst(wave::Plst),
    Label(wave::Label<'a>),
    Ltxt(wave::Ltxt),
    Inst(wave::Inst),
    Smpl(wave::Smpl<'a>),
    Colh(dls::Colh),
    Dlid(dls::Dlid),
    Cdl(dls::Cdl),
    Insh(dls::Insh),
    Rgnh(dls::Rgnh),
    Art(dls::Art),
    Wlnk(dls::Wlnk),
    Wsmp(dls::Wsmp),
    Ptbl(dls::Ptbl),
    Vers(dls::Vers),
    Tone(mu::ToneParams<'a>),
    Drum(mu::DrumParams<'a>),
    MacBinary(MacBinary<'a>),
}

/// One record of the flat, depth-first chunk list.
#[derive(Clone, PartialEq, Debug)]
pub struct Chunk<'a> {
    pub id: ChunkId,
    /// Tags from the outermost container down to the direct parent.
    ///
    /// RIFF containers appear under their form type (eg. `INFO` rather than `LIST`).
    pub ancestors: Vec<Tag>,
    /// The payload bytes, without the chunk head.
    pub payload: &'a [u8],
    /// `None` for containers, opaque chunks and payloads that could not be decoded.
    pub content: Option<Content<'a>>,
}
impl<'a> Chunk<'a> {
    pub(crate) fn new(
        tag: Tag,
        ancestors: &[Tag],
        payload: &'a [u8],
        content: Option<Content<'a>>,
    ) -> Chunk<'a> {
        Chunk {
            id: ChunkId::Tag(tag),
            ancestors: ancestors.to_vec(),
            payload,
            content,
        }
    }

    /// The tag of this chunk, if it is not a synthetic record.
    #[inline]
    pub fn tag(&self) -> Option<Tag> {
        self.id.tag()
    }

    /// Whether this chunk has the given tag.
    #[inline]
    pub fn is(&self, tag: &[u8; 4]) -> bool {
        self.tag().map_or(false, |own| own == *tag)
    }

    /// Whether any of the containers around this chunk has the given tag.
    pub fn has_ancestor(&self, tag: &[u8; 4]) -> bool {
        self.ancestors.iter().any(|anc| anc == tag)
    }

    /// All of the ids from the outermost container down to this chunk, inclusive.
    pub fn tags(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.ancestors
            .iter()
            .map(|&tag| ChunkId::Tag(tag))
            .chain(Some(self.id))
    }

    /// Path to use as the ancestors of children of this chunk.
    pub(crate) fn path(&self) -> Vec<Tag> {
        let mut path = self.ancestors.clone();
        path.extend(self.tag());
        path
    }

    /// Get the events of a decoded track chunk.
    pub fn track(&self) -> Option<&[TrackEvent<'a>]> {
        match &self.content {
            Some(Content::Track(events)) => Some(events),
            _ => None,
        }
    }

    /// Get the decoded header of an `MThd` chunk.
    pub fn header(&self) -> Option<&Header> {
        match &self.content {
            Some(Content::Header(header)) => Some(header),
            _ => None,
        }
    }
}

/// What a payload decoder made of a leaf chunk.
pub(crate) enum Decoded<'a> {
    Content(Content<'a>),
    /// Records to splice in place of the leaf, own record included.
    Chunks(Vec<Chunk<'a>>),
    /// Nothing to decode here. Not an anomaly.
    Opaque,
    /// The payload was rejected and a diagnostic was recorded.
    Invalid,
}

#[inline]
fn ceil2(len: usize) -> usize {
    len + (len & 1)
}

/// Split a buffer into a flat, depth-first list of chunks.
///
/// `ancestors` is the tag path of the container the buffer belongs to, empty at the top level.
/// Anomalies are recorded into `diags`. Whatever cannot be read as chunks ends up in a trailing
/// `ChunkId::Garbage` record.
pub fn walk<'a>(buf: &'a [u8], ancestors: &[Tag], diags: &mut Diagnostics) -> Vec<Chunk<'a>> {
    log::trace!("walking {} bytes under {:?}", buf.len(), ancestors);
    let mut chunks = Vec::new();
    let mut index = 0;
    while buf.len() - index >= 8 {
        let start = index;
        let mut raw = &buf[index..];
        let tag = match Tag::read(&mut raw) {
            Some(tag) => tag,
            None => break,
        };
        if !tag.is_valid() {
            diags.warn_at("Invalid tag", &buf[start..start + 4]);
            break;
        }
        let registered = registry::lookup(tag);
        let info: ChunkTypeInfo = registered.unwrap_or_default();
        let len = if info.is_big_endian {
            u32::read_be(&mut raw)
        } else {
            u32::read_le(&mut raw)
        };
        let mut len = match len {
            Some(len) => len as usize,
            None => break,
        };
        index += 8;

        if len > buf.len() - index {
            diags.warn_at(format!("Not enough chunk size for '{}'", tag), &buf[start..]);
            if registered.is_some() {
                len = buf.len() - index;
                diags.warn(format!(
                    "Truncated the '{}' chunk (It may be incomplete)",
                    tag
                ));
            } else {
                index = start;
                break;
            }
        }
        let payload = &buf[index..index + len];

        if info.is_container && !info.is_big_endian {
            //RIFF-style container, the form type stands in for the tag
            let form = match payload.get(..4) {
                Some(form) => Tag([form[0], form[1], form[2], form[3]]),
                None => {
                    diags.warn_at("Invalid RIFF type", payload);
                    break;
                }
            };
            if !form.is_valid() {
                diags.warn_at("Invalid RIFF type", &payload[..4]);
                break;
            }
            let body = &payload[4..];
            let record = Chunk::new(form, ancestors, body, None);
            let path = record.path();
            chunks.push(record);
            if !body.is_empty() {
                chunks.extend(walk(body, &path, diags));
            }
            index += ceil2(len);
        } else if info.is_container {
            let record = Chunk::new(tag, ancestors, payload, None);
            let path = record.path();
            chunks.push(record);
            if !payload.is_empty() {
                chunks.extend(walk(payload, &path, diags));
            }
            index += len;
        } else {
            let decoded = match info.decoder {
                Some(decoder) => decoder.decode(payload, tag, ancestors, diags),
                None => Decoded::Opaque,
            };
            match decoded {
                Decoded::Content(content) => {
                    chunks.push(Chunk::new(tag, ancestors, payload, Some(content)))
                }
                Decoded::Chunks(list) => chunks.extend(list),
                Decoded::Opaque | Decoded::Invalid => {
                    chunks.push(Chunk::new(tag, ancestors, payload, None))
                }
            }
            index += if info.is_big_endian { len } else { ceil2(len) };
        }
        index = index.min(buf.len());
    }

    if index < buf.len() {
        let payload = &buf[index..];
        match ancestors.last() {
            None => diags.warn_at("Garbage in the file", payload),
            Some(parent) => diags.warn_at(format!("Garbage in '{}'", parent), payload),
        }
        chunks.push(Chunk {
            id: ChunkId::Garbage,
            ancestors: ancestors.to_vec(),
            payload,
            content: None,
        });
    }
    chunks
}
