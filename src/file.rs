//! Top-level entry point: identification, chunk walking and song assembly.

use crate::{
    chunk::{walk, Chunk},
    diag::Diagnostic,
    error::Error,
    macbinary,
    prelude::*,
    song::{self, Song, SongLayout},
};

/// Inputs shorter than this cannot hold a header chunk and a track chunk head.
const MIN_LEN: usize = 18;

/// Knobs for a single parse.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ParseOptions {
    /// Walk the input even if it does not start with `MThd` or `RIFF`.
    pub forced: bool,
}
impl ParseOptions {
    #[inline]
    pub fn new() -> ParseOptions {
        ParseOptions::default()
    }

    #[inline]
    pub fn forced(mut self, forced: bool) -> ParseOptions {
        self.forced = forced;
        self
    }
}

/// A parsed file: the flat chunk list and the songs found in it.
#[derive(Clone, PartialEq, Debug)]
pub struct MidiFile<'a> {
    /// All chunks in depth-first order, containers before their children.
    pub chunks: Vec<Chunk<'a>>,
    /// Songs, as indices into `chunks`.
    pub layouts: Vec<SongLayout>,
}
impl<'a> MidiFile<'a> {
    /// Parse a file with the default options.
    ///
    /// Anomalies are returned alongside the file. An error is only returned if the input is too
    /// short or is not recognized, or if the `strict` feature is enabled and any anomaly was found.
    pub fn parse(raw: &'a [u8]) -> Result<(MidiFile<'a>, Vec<Diagnostic>)> {
        MidiFile::parse_with(raw, &ParseOptions::default())
    }

    pub fn parse_with(
        raw: &'a [u8],
        options: &ParseOptions,
    ) -> Result<(MidiFile<'a>, Vec<Diagnostic>)> {
        match parse_impl(raw, options) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                log::warn!("{}", err);
                Err(err)
            }
        }
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk<'a>] {
        &self.chunks
    }

    /// All of the songs in the file.
    pub fn songs(&self) -> Vec<Song<'_, 'a>> {
        self.layouts
            .iter()
            .filter_map(|layout| Song::from_layout(&self.chunks, layout))
            .collect()
    }

    /// The main song of the file, if there is one.
    pub fn song(&self) -> Option<Song<'_, 'a>> {
        self.layouts
            .first()
            .and_then(|layout| Song::from_layout(&self.chunks, layout))
    }
}

fn check_identity(raw: &[u8], data: &[u8], options: &ParseOptions) -> Result<()> {
    if options.forced {
        return Ok(());
    }
    match data.get(..4) {
        Some(b"MThd") | Some(b"RIFF") => Ok(()),
        _ => {
            let start = data.as_ptr() as usize - raw.as_ptr() as usize;
            let end = start + data.len().min(4);
            bail!(Error::new(err_invalid!("not a MIDI or RIFF file")).with_span(start..end))
        }
    }
}

fn parse_impl<'a>(
    raw: &'a [u8],
    options: &ParseOptions,
) -> Result<(MidiFile<'a>, Vec<Diagnostic>)> {
    ensure!(
        raw.len() >= MIN_LEN,
        Error::new(err_invalid!("file too short")).with_span(0..raw.len())
    );
    let mut diags = Diagnostics::new(raw);
    let (data, envelope) = macbinary::strip(raw, &mut diags);
    check_identity(raw, data, options).context(err_invalid!("unrecognized file"))?;

    let mut chunks = Vec::new();
    chunks.extend(envelope);
    chunks.extend(walk(data, &[], &mut diags));
    let layouts = song::assemble(&chunks, &mut diags);
    log::debug!(
        "parsed {} chunk(s), {} song(s), {} diagnostic(s)",
        chunks.len(),
        layouts.len(),
        diags.len()
    );

    if cfg!(feature = "strict") {
        ensure!(
            diags.is_empty(),
            err_malformed!("anomalies found while parsing")
        );
    }
    Ok((MidiFile { chunks, layouts }, diags.into_vec()))
}

/// Parse several independent files in parallel.
///
/// Results come back in input order.
#[cfg(feature = "parallel")]
pub fn parse_many<'a>(inputs: &[&'a [u8]]) -> Vec<Result<(MidiFile<'a>, Vec<Diagnostic>)>> {
    use rayon::prelude::*;

    inputs.par_iter().map(|&raw| MidiFile::parse(raw)).collect()
}
