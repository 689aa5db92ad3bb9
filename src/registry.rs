//! The closed set of known chunk types.
//!
//! Unknown tags are little-endian, non-container and opaque.

use crate::{
    chunk::{Chunk, Content, Decoded},
    dls, mu,
    prelude::*,
    riff, smf, wave, ysf,
};

/// Which payload decoder handles a registered tag.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Decoder {
    SmfHeader,
    SmfTrack,
    /// Whole payload as a raw string.
    RawString,
    ChannelTable,
    ChannelTableV2,
    Cntt,
    Fnrp,
    /// Zero-terminated string.
    ZString,
    Disp,
    Data,
    Fmt,
    Fact,
    Cue,
    Plst,
    Label,
    Ltxt,
    Inst,
    Smpl,
    Colh,
    Dlid,
    Cdl,
    Insh,
    Rgnh,
    Art,
    Wlnk,
    Wsmp,
    Ptbl,
    Vers,
    V000,
}

/// How a registered tag is framed and decoded.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ChunkTypeInfo {
    /// Whether the payload is a sequence of chunks.
    pub is_container: bool,
    /// Whether the length field (and YAMAHA payload fields) are big-endian.
    /// Big-endian chunks are never padded.
    pub is_big_endian: bool,
    /// Decoder for the payload of a leaf chunk, if its layout is known.
    pub decoder: Option<Decoder>,
}

/// Look up the framing of a tag.
///
/// Returns `None` for unregistered tags.
pub fn lookup(tag: Tag) -> Option<ChunkTypeInfo> {
    use self::Decoder::*;
    const BE_CONTAINER: (bool, bool) = (true, true);
    const LE_CONTAINER: (bool, bool) = (true, false);
    const BE: (bool, bool) = (false, true);
    const LE: (bool, bool) = (false, false);
    let ((is_container, is_big_endian), decoder) = match &tag.0 {
        // Standard Midi File
        b"MThd" => (BE, Some(SmfHeader)),
        b"MTrk" => (BE, Some(SmfTrack)),
        // YAMAHA XF
        b"XFIH" | b"XFKM" => (BE, Some(SmfTrack)),
        // YAMAHA style files
        b"CASM" | b"CSEG" | b"OTSc" | b"FNRc" => (BE_CONTAINER, None),
        b"Sdec" | b"Mnam" | b"Gnam" | b"Kwd1" | b"Kwd2" => (BE, Some(RawString)),
        b"Ctab" => (BE, Some(ChannelTable)),
        b"Ctb2" => (BE, Some(ChannelTableV2)),
        b"Cntt" => (BE, Some(Cntt)),
        b"FNRP" => (BE, Some(Fnrp)),
        b"MHhd" | b"MHtr" | b"CdS1" => (BE, None),
        b"NZem" => (BE, Some(SmfTrack)),
        // YAMAHA XG Works
        b"S4WB" => (BE, Some(SmfTrack)),
        b"S4WH" | b"S4WT" | b"S4ST" | b"SCRS" | b"SCRA" | b"SCRD" => (BE, None),
        // RIFF
        b"RIFF" | b"LIST" => (LE_CONTAINER, None),
        b"IARL" | b"IART" | b"ICMS" | b"ICMT" | b"ICOP" | b"ICRD" | b"ICRP" | b"IDIM"
        | b"IDPI" | b"IENG" | b"IGNR" | b"IKEY" | b"ILGT" | b"ILNG" | b"IMED" | b"INAM"
        | b"IPLT" | b"IPRD" | b"IPRT" | b"ISBJ" | b"ISFT" | b"ISHP" | b"ISRC" | b"ISRF"
        | b"ITCH" | b"ISMP" | b"IDIT" | b"ITRK" | b"ITOC" => (LE, Some(ZString)),
        b"DISP" => (LE, Some(Disp)),
        b"data" => (LE, Some(Data)),
        // WAVE
        b"fmt " => (LE, Some(Fmt)),
        b"fact" => (LE, Some(Fact)),
        b"cue " => (LE, Some(Cue)),
        b"plst" => (LE, Some(Plst)),
        b"labl" | b"note" => (LE, Some(Label)),
        b"ltxt" => (LE, Some(Ltxt)),
        b"inst" => (LE, Some(Inst)),
        b"smpl" => (LE, Some(Smpl)),
        // DLS
        b"colh" => (LE, Some(Colh)),
        b"dlid" => (LE, Some(Dlid)),
        b"cdl " => (LE, Some(Cdl)),
        b"insh" => (LE, Some(Insh)),
        b"rgnh" => (LE, Some(Rgnh)),
        b"art1" | b"art2" => (LE, Some(Art)),
        b"wlnk" => (LE, Some(Wlnk)),
        b"wsmp" => (LE, Some(Wsmp)),
        b"ptbl" => (LE, Some(Ptbl)),
        b"vers" => (LE, Some(Vers)),
        // YAMAHA MU sampling extension
        b"v000" => (LE, Some(V000)),
        _ => return None,
    };
    Some(ChunkTypeInfo {
        is_container,
        is_big_endian,
        decoder,
    })
}

/// Wrap the result of a single-value decoder.
fn content<'a, T>(val: Option<T>, wrap: fn(T) -> Content<'a>) -> Decoded<'a> {
    match val {
        Some(val) => Decoded::Content(wrap(val)),
        None => Decoded::Invalid,
    }
}

impl Decoder {
    /// Decode the payload of a leaf chunk.
    pub(crate) fn decode<'a>(
        self,
        payload: &'a [u8],
        tag: Tag,
        ancestors: &[Tag],
        diags: &mut Diagnostics,
    ) -> Decoded<'a> {
        use self::Decoder::*;
        match self {
            SmfHeader => content(smf::Header::decode(payload, tag, diags), Content::Header),
            SmfTrack => Decoded::Content(Content::Track(smf::decode_track(payload, tag, diags))),
            RawString => Decoded::Content(Content::Str(payload)),
            ChannelTable => content(
                ysf::ChannelTable::decode(payload, tag, diags),
                Content::ChannelTable,
            ),
            ChannelTableV2 => ysf::decode_ctb2(payload, tag, ancestors, diags),
            Cntt => content(ysf::Cntt::decode(payload, tag, diags), Content::Cntt),
            Fnrp => ysf::decode_fnrp(payload, tag, ancestors, diags),
            ZString => Decoded::Content(Content::Str(riff::zstring(payload, tag, diags))),
            Disp => content(riff::Disp::decode(payload, tag, diags), Content::Disp),
            Data => riff::decode_data(payload, tag, ancestors, diags),
            Fmt => content(wave::Fmt::decode(payload, tag, diags), Content::Fmt),
            Fact => content(wave::Fact::decode(payload, tag, diags), Content::Fact),
            Cue => content(wave::Cue::decode(payload, tag, diags), Content::Cue),
            Plst => content(wave::Plst::decode(payload, tag, diags), Content::Plst),
            Label => content(wave::Label::decode(payload, tag, diags), Content::Label),
            Ltxt => content(wave::Ltxt::decode(payload, tag, diags), Content::Ltxt),
            Inst => content(wave::Inst::decode(payload, tag, diags), Content::Inst),
            Smpl => content(wave::Smpl::decode(payload, tag, diags), Content::Smpl),
            Colh => content(dls::Colh::decode(payload, tag, diags), Content::Colh),
            Dlid => content(dls::Dlid::decode(payload, tag, diags), Content::Dlid),
            Cdl => content(dls::Cdl::decode(payload, tag, diags), Content::Cdl),
            Insh => content(dls::Insh::decode(payload, tag, diags), Content::Insh),
            Rgnh => content(dls::Rgnh::decode(payload, tag, diags), Content::Rgnh),
            Art => content(dls::Art::decode(payload, tag, diags), Content::Art),
            Wlnk => content(dls::Wlnk::decode(payload, tag, diags), Content::Wlnk),
            Wsmp => content(dls::Wsmp::decode(payload, tag, diags), Content::Wsmp),
            Ptbl => content(dls::Ptbl::decode(payload, tag, diags), Content::Ptbl),
            Vers => content(dls::Vers::decode(payload, tag, diags), Content::Vers),
            V000 => mu::decode_v000(payload, tag, ancestors, diags),
        }
    }
}

/// Build the record of a decoder that embeds further chunks after a fixed-size head.
pub(crate) fn with_children<'a>(
    head: &'a [u8],
    content: Content<'a>,
    rest: &'a [u8],
    tag: Tag,
    ancestors: &[Tag],
    diags: &mut Diagnostics,
) -> Decoded<'a> {
    let own = Chunk::new(tag, ancestors, head, Some(content));
    let path = own.path();
    let mut chunks = vec![own];
    chunks.extend(crate::chunk::walk(rest, &path, diags));
    Decoded::Chunks(chunks)
}
