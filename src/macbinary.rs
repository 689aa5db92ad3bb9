//! Detection and removal of the MacBinary envelope.

use crate::{chunk::{Chunk, ChunkId, Content}, prelude::*};

const HEADER_LEN: usize = 128;
const MAX_FORK_LEN: u32 = 0x80_0000;
/// Seconds between the Macintosh epoch (1904) and the Unix epoch (1970).
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// The metadata of a MacBinary envelope.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MacBinary<'a> {
    /// Raw file name, no text encoding is assumed.
    pub file_name: &'a [u8],
    pub file_type: Tag,
    pub creator: Tag,
    pub data_fork_len: u32,
    pub resource_fork_len: u32,
    /// Creation date, in seconds since the Unix epoch.
    pub created: i64,
    /// Modification date, in seconds since the Unix epoch.
    pub modified: i64,
}

fn be_u32(raw: &[u8], at: usize) -> Option<u32> {
    let mut cur = raw.get(at..)?;
    u32::read_be(&mut cur)
}

impl<'a> MacBinary<'a> {
    /// Check whether the buffer starts with a MacBinary header.
    pub fn detect(raw: &[u8]) -> bool {
        let head = match raw.get(..HEADER_LEN) {
            Some(head) => head,
            None => return false,
        };
        let name_len = head[1];
        head[0] == 0
            && head[74] == 0
            && (1..64).contains(&name_len)
            && head[108..116].iter().all(|&b| b == 0)
            && be_u32(head, 83).map_or(false, |len| len < MAX_FORK_LEN)
            && be_u32(head, 87).map_or(false, |len| len < MAX_FORK_LEN)
    }

    /// Read the envelope metadata, if there is one.
    pub fn read(raw: &'a [u8]) -> Option<MacBinary<'a>> {
        if !Self::detect(raw) {
            return None;
        }
        let name_len = raw[1] as usize;
        let tag_at = |at: usize| Tag([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);
        Some(MacBinary {
            file_name: &raw[2..2 + name_len],
            file_type: tag_at(65),
            creator: tag_at(69),
            data_fork_len: be_u32(raw, 83)?,
            resource_fork_len: be_u32(raw, 87)?,
            created: be_u32(raw, 91)? as i64 - MAC_EPOCH_OFFSET,
            modified: be_u32(raw, 95)? as i64 - MAC_EPOCH_OFFSET,
        })
    }
}

/// Strip a MacBinary envelope off the input, if present.
///
/// Returns the data fork and, if an envelope was found, its synthetic chunk record.
pub(crate) fn strip<'a>(raw: &'a [u8], diags: &mut Diagnostics) -> (&'a [u8], Option<Chunk<'a>>) {
    let header = match MacBinary::read(raw) {
        Some(header) => header,
        None => return (raw, None),
    };
    let envelope = &raw[..HEADER_LEN];
    diags.warn_at("Found MacBinary", envelope);
    let fork = &raw[HEADER_LEN..];
    let fork_len = header.data_fork_len as usize;
    let data = match fork.get(..fork_len) {
        Some(data) => data,
        None => {
            diags.warn_at("Not enough data fork size in MacBinary", fork);
            fork
        }
    };
    let record = Chunk {
        id: ChunkId::MacBinary,
        ancestors: Vec::new(),
        payload: envelope,
        content: Some(Content::MacBinary(header)),
    };
    (data, Some(record))
}
