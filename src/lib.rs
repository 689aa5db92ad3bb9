//! # Overview
//!
//! `midichunk` is a tolerant decoder for Standard Midi Files and the container formats they are
//! usually found in: RIFF (RMID, WAVE, DLS) and several YAMAHA chunk dialects (style files, XF,
//! XG Works, MU sampling extensions).
//!
//! Usage is as simple as:
//!
//! ```rust
//! use midichunk::MidiFile;
//!
//! # let bytes: &[u8] = &[
//! #     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96,
//! #     b'M', b'T', b'r', b'k', 0, 0, 0, 4, 0, 0xFF, 0x2F, 0,
//! # ];
//! let (file, diagnostics) = MidiFile::parse(bytes).unwrap();
//!
//! for diag in &diagnostics {
//!     println!("{}", diag);
//! }
//! if let Some(song) = file.song() {
//!     for (i, track) in song.tracks.iter().enumerate() {
//!         println!("track {} has {} events", i, track.len());
//!     }
//! }
//! ```
//!
//! # Chunks
//!
//! Every input is first split into a flat, depth-first list of [`Chunk`](struct.Chunk.html)s.
//! Containers come right before their children, and each chunk knows the path of tags leading
//! to it. Chunks with a known layout carry a decoded [`Content`](enum.Content.html).
//!
//! The parser never gives up on corrupt data unless the input cannot possibly be one of the
//! supported formats. Anything odd is reported as a [`Diagnostic`](struct.Diagnostic.html) next
//! to the result, and as much of the surrounding structure as possible is kept.
//!
//! # About lifetimes
//!
//! All parse results borrow from the raw input bytes in order to avoid allocations, so the byte
//! buffer must be created separately and outlive the `MidiFile`.
//!
//! # Derived analyses
//!
//! An assembled [`Song`](struct.Song.html) can be turned into a [`TempoMap`](struct.TempoMap.html)
//! (tick to measure/beat/tick and elapsed microseconds) and a [`PortMap`](struct.PortMap.html)
//! (best-effort MIDI port for each track).
//!
//! # Raw MIDI streams
//!
//! [`MidiStream`](struct.MidiStream.html) rebuilds discrete messages out of a fragmented raw byte
//! stream, as received from a MIDI cable, honoring running status.
//!
//! # About features
//!
//! - The `parallel` feature (enabled by default)
//!
//!   Enables [`parse_many`](fn.parse_many.html), which parses several independent files in
//!   parallel through the `rayon` dependency.
//!
//! - The `strict` feature
//!
//!   By default the parser plows through corrupted files, reporting anomalies as diagnostics.
//!   With the `strict` feature any diagnostic turns the parse into an `ErrorKind::Malformed`
//!   error.

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

/// All of the errors this crate produces.
#[macro_use]
mod error;

mod prelude {
    pub(crate) use crate::{
        diag::Diagnostics,
        error::{ErrorKind, Result, ResultExt},
        primitive::{IntRead, SplitChecked, Tag},
    };
    pub(crate) use std::{borrow::Cow, fmt, mem, ops};

    pub(crate) fn bit_range<T>(val: T, range: ops::Range<u32>) -> T
    where
        T: From<u8>
            + ops::Shr<u32, Output = T>
            + ops::Shl<u32, Output = T>
            + ops::Not<Output = T>
            + ops::BitAnd<Output = T>,
    {
        let mask = !((!T::from(0)) << (range.end - range.start));
        (val >> range.start) & mask
    }
}

mod chunk;
mod diag;
mod dls;
mod event;
mod file;
mod macbinary;
mod mu;
mod port;
mod primitive;
mod registry;
mod riff;
mod smf;
mod song;
mod stream;
mod tempo;
mod wave;
mod ysf;

#[cfg(feature = "parallel")]
pub use crate::file::parse_many;
pub use crate::{
    chunk::{walk, Chunk, ChunkId, Content},
    diag::{ByteInfo, Diagnostic, Diagnostics},
    error::{Error, ErrorKind, Result},
    event::{is_realtime, is_valid_message, message_length},
    file::{MidiFile, ParseOptions},
    macbinary::MacBinary,
    port::{Evidence, PortAssignment, PortInfo, PortMap},
    primitive::{read_varlen, write_varlen, Format, Tag, Timing, VARLEN_MAX},
    registry::{lookup, ChunkTypeInfo, Decoder},
    smf::{Header, TrackEvent},
    song::{Song, SongLayout},
    stream::MidiStream,
    tempo::{Mbt, Smpte, TempoEntry, TempoMap, TimeSignature},
};

/// Decoded payloads of the RIFF-based families.
pub mod formats {
    pub use crate::dls::{
        Art, Cdl, CdlOp, Colh, Connection, Dlid, Insh, Ptbl, Rgnh, Vers, Wlnk, Wsmp, WsmpLoop,
    };
    pub use crate::mu::{DrumParams, DrumSetup, ElementParams, ToneElement, ToneParams};
    pub use crate::riff::{BitmapInfo, Disp};
    pub use crate::wave::{
        Cue, CuePoint, Fact, Fmt, Inst, Label, Ltxt, Plst, PlaySegment, SampleLoop, Smpl,
    };
    pub use crate::ysf::{ChannelTable, ChannelTableV2, Cntt, Fnrp, PartTransposition};
}
