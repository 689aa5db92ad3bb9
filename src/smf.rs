//! Specific to the SMF packaging of MIDI streams.

use crate::{
    event::channel_data_len,
    prelude::*,
    primitive::{read_varlen, Format, Timing},
};

/// A MIDI file header, as stored in the `MThd` chunk.
///
/// Values are kept as-is. Use `format()` and `timing()` to interpret them.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Header {
    pub format: u16,
    pub track_count: u16,
    pub division: u16,
}
impl Header {
    pub fn new(format: u16, track_count: u16, division: u16) -> Header {
        Header {
            format,
            track_count,
            division,
        }
    }

    pub(crate) fn decode(mut raw: &[u8], tag: Tag, diags: &mut Diagnostics) -> Option<Header> {
        if raw.len() != 6 {
            diags.warn_at(format!("Invalid '{}' chunk", tag), raw);
            return None;
        }
        let format = u16::read_be(&mut raw)?;
        let track_count = u16::read_be(&mut raw)?;
        let division = u16::read_be(&mut raw)?;
        Some(Header::new(format, track_count, division))
    }

    /// The track layout, if it is one of the three defined formats.
    #[inline]
    pub fn format(&self) -> Option<Format> {
        Format::from_int(self.format)
    }

    #[inline]
    pub fn timing(&self) -> Timing {
        Timing::from_division(self.division)
    }
}

/// A single event of a decoded track.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct TrackEvent<'a> {
    /// Absolute time of the event in ticks.
    pub tick: u32,
    /// Exact input bytes of the event, without the delta time.
    ///
    /// For events under running status this does not include the status byte.
    pub raw: &'a [u8],
    /// The message itself.
    ///
    /// - Channel messages: status and data bytes, with the running status byte restored.
    /// - `F0` System Exclusive: `F0` followed by the payload, without the length.
    /// - `F7` escapes: the payload only.
    /// - Meta events: the whole event, `FF` type, length and data.
    pub bytes: Cow<'a, [u8]>,
    /// Whether the event has bad data bytes or had to be recovered.
    pub is_invalid: bool,
}
impl<'a> TrackEvent<'a> {
    /// Whether this is a meta event of the given type.
    #[inline]
    pub fn is_meta(&self, kind: u8) -> bool {
        self.bytes.len() >= 2 && self.bytes[0] == 0xFF && self.bytes[1] == kind
    }

    /// Whether this is the End of Track meta event.
    #[inline]
    pub fn is_end_of_track(&self) -> bool {
        self.is_meta(0x2F)
    }
}

/// Decode the events of a track chunk.
///
/// Decoding stops at the End of Track meta event or at the first unrecoverable problem, keeping
/// whatever was decoded up to that point.
pub(crate) fn decode_track<'a>(
    buf: &'a [u8],
    tag: Tag,
    diags: &mut Diagnostics,
) -> Vec<TrackEvent<'a>> {
    let mut events = Vec::new();
    let mut index = 0;
    let mut tick: u32 = 0;
    let mut running_status: Option<u8> = None;
    let mut in_running_status = false;
    let mut end_of_track = false;

    while index < buf.len() && !end_of_track {
        //Delta time
        let mut raw = &buf[index..];
        let delta = match read_varlen(&mut raw) {
            Some(delta) => delta,
            None => {
                let end = (index + 4).min(buf.len());
                diags.warn_at("Invalid delta time", &buf[index..end]);
                break;
            }
        };
        tick = tick.saturating_add(delta);
        index = buf.len() - raw.len();

        let mut status = match buf.get(index) {
            Some(&status) => status,
            None => {
                diags.warn_at("Missing status byte after the delta time", &buf[index..]);
                break;
            }
        };
        let mut is_invalid = false;

        let event = if bit_range(status, 7..8) == 0 {
            if !in_running_status {
                diags.warn_at("Invalid status byte", &buf[index..index + 1]);
                match running_status {
                    Some(_) => {
                        is_invalid = true;
                        diags.warn("Recovered missing status byte from the disabled running status");
                        in_running_status = true;
                    }
                    None => break,
                }
            }
            status = match running_status {
                Some(status) => status,
                None => break,
            };
            let len = channel_data_len(status);
            let data = match buf[index..].get(..len) {
                Some(data) => data,
                None => {
                    diags.warn_at(
                        format!(
                            "Not enough '{}' size for channel message (w/o status byte)",
                            tag
                        ),
                        &buf[index..],
                    );
                    break;
                }
            };
            index += len;
            if data.iter().any(|&b| b & 0x80 != 0) {
                is_invalid = true;
                diags.warn_at(
                    "Invalid data byte(s) in a channel message (w/o status byte)",
                    data,
                );
            }
            let mut bytes = Vec::with_capacity(1 + len);
            bytes.push(status);
            bytes.extend_from_slice(data);
            TrackEvent {
                tick,
                raw: data,
                bytes: Cow::Owned(bytes),
                is_invalid,
            }
        } else if status < 0xF0 {
            //Channel message
            running_status = Some(status);
            in_running_status = true;
            let len = 1 + channel_data_len(status);
            let msg = match buf[index..].get(..len) {
                Some(msg) => msg,
                None => {
                    diags.warn_at(
                        format!("Not enough '{}' size for channel message", tag),
                        &buf[index..],
                    );
                    break;
                }
            };
            index += len;
            if msg[1..].iter().any(|&b| b & 0x80 != 0) {
                is_invalid = true;
                diags.warn_at("Invalid data byte(s) in a channel message", msg);
            }
            TrackEvent {
                tick,
                raw: msg,
                bytes: Cow::Borrowed(msg),
                is_invalid,
            }
        } else if status == 0xF0 || status == 0xF7 {
            let mut rest = &buf[index + 1..];
            let payload = match crate::primitive::read_varlen_slice(&mut rest) {
                Some(payload) => payload,
                None => {
                    let what = if status == 0xF0 {
                        "SysEx event"
                    } else {
                        "F7 SysEx event"
                    };
                    diags.warn_at(
                        format!("Not enough '{}' size for {}", tag, what),
                        &buf[index..],
                    );
                    break;
                }
            };
            in_running_status = false;
            let end = buf.len() - rest.len();
            let raw = &buf[index..end];
            index = end;
            if status == 0xF0 {
                let mut bytes = Vec::with_capacity(1 + payload.len());
                bytes.push(0xF0);
                bytes.extend_from_slice(payload);
                let terminated = payload.last() == Some(&0xF7);
                let interior = &payload[..payload.len().saturating_sub(1)];
                if !terminated || interior.iter().any(|&b| b & 0x80 != 0) {
                    is_invalid = true;
                    diags.warn_at("Invalid data byte(s) in a SysEx message", raw);
                }
                TrackEvent {
                    tick,
                    raw,
                    bytes: Cow::Owned(bytes),
                    is_invalid,
                }
            } else {
                TrackEvent {
                    tick,
                    raw,
                    bytes: Cow::Borrowed(payload),
                    is_invalid,
                }
            }
        } else if status == 0xFF {
            //Meta event
            let mut rest = buf.get(index + 2..).unwrap_or(&[]);
            let kind = buf.get(index + 1).copied();
            let kind = match (kind, crate::primitive::read_varlen_slice(&mut rest)) {
                (Some(kind), Some(_data)) => kind,
                _ => {
                    diags.warn_at(
                        format!("Not enough '{}' size for meta event", tag),
                        &buf[index..],
                    );
                    break;
                }
            };
            in_running_status = false;
            let end = buf.len() - rest.len();
            let raw = &buf[index..end];
            index = end;
            if kind == 0x2F {
                end_of_track = true;
            }
            TrackEvent {
                tick,
                raw,
                bytes: Cow::Borrowed(raw),
                is_invalid,
            }
        } else {
            diags.warn_at(
                "Invalid status byte (Not F0h, F7h or FFh)",
                &buf[index..index + 1],
            );
            break;
        };
        events.push(event);
    }

    if index < buf.len() {
        let suffix = if end_of_track {
            " after the End of Track meta event"
        } else {
            ""
        };
        diags.warn_at(format!("Garbage in '{}'{}", tag, suffix), &buf[index..]);
    } else if !end_of_track {
        diags.warn_at("No End of Track meta event", &buf[index..]);
    }
    events
}
