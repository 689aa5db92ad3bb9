//! Grouping of decoded tracks into playable songs.

use crate::{
    chunk::Chunk,
    prelude::*,
    smf::{Header, TrackEvent},
};

/// Where the pieces of a song are in the flat chunk list.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct SongLayout {
    /// Index of the `MThd` chunk.
    pub header: usize,
    /// Indices of the track chunks, in playing order.
    pub tracks: Vec<usize>,
}

/// A song borrowed from a parsed file.
#[derive(Clone, PartialEq, Debug)]
pub struct Song<'f, 'a> {
    pub header: &'f Header,
    pub tracks: Vec<&'f [TrackEvent<'a>]>,
}
impl<'f, 'a> Song<'f, 'a> {
    /// Materialize a layout against the chunk list it was assembled from.
    ///
    /// Returns `None` if the layout does not point at a decoded header.
    pub fn from_layout(chunks: &'f [Chunk<'a>], layout: &SongLayout) -> Option<Song<'f, 'a>> {
        let header = chunks.get(layout.header)?.header()?;
        let tracks = layout
            .tracks
            .iter()
            .map(|&idx| chunks.get(idx).and_then(Chunk::track).unwrap_or(&[]))
            .collect();
        Some(Song { header, tracks })
    }
}

/// Split the indices of `MTrk` chunks into runs of adjacent list positions.
fn track_runs(chunks: &[Chunk]) -> Vec<Vec<usize>> {
    let mut runs: Vec<Vec<usize>> = Vec::new();
    for (idx, chunk) in chunks.iter().enumerate() {
        if !chunk.is(b"MTrk") {
            continue;
        }
        match runs.last_mut() {
            Some(run) if run.last().map_or(false, |&last| last + 1 == idx) => run.push(idx),
            _ => runs.push(vec![idx]),
        }
    }
    runs
}

/// Figure out the songs contained in a chunk list.
pub(crate) fn assemble(chunks: &[Chunk], diags: &mut Diagnostics) -> Vec<SongLayout> {
    let mut headers = chunks
        .iter()
        .enumerate()
        .filter(|(_, chunk)| chunk.is(b"MThd"));
    let (header_idx, header_chunk) = match headers.next() {
        Some(first) => first,
        None => {
            diags.warn("No MThd chunks");
            return Vec::new();
        }
    };
    let extra = headers.count();
    if extra > 0 {
        diags.warn(format!(
            "Contains {} MThd chunks. Ignored the latter chunk(s)",
            extra + 1
        ));
    }
    let header = match header_chunk.header() {
        Some(header) => header,
        None => {
            diags.warn_at("No valid MThd chunk", header_chunk.payload);
            return Vec::new();
        }
    };

    let runs = track_runs(chunks);
    let main_run = runs
        .iter()
        .position(|run| run.first() == Some(&(header_idx + 1)));
    let main_tracks = main_run.map(|pos| runs[pos].clone()).unwrap_or_default();
    if main_tracks.len() != header.track_count as usize {
        diags.warn(format!(
            "MThd.ntrks ({}) is not equal to the number of MTrks ({})",
            header.track_count,
            main_tracks.len()
        ));
    }

    let mut layouts = Vec::new();
    if header.format == 2 {
        layouts.extend(main_tracks.iter().map(|&idx| SongLayout {
            header: header_idx,
            tracks: vec![idx],
        }));
    } else {
        layouts.push(SongLayout {
            header: header_idx,
            tracks: main_tracks,
        });
    }

    //Alternate settings of style files, one song per track
    for (pos, run) in runs.iter().enumerate() {
        if Some(pos) == main_run {
            continue;
        }
        layouts.extend(
            run.iter()
                .filter(|&&idx| chunks[idx].has_ancestor(b"OTSc"))
                .map(|&idx| SongLayout {
                    header: header_idx,
                    tracks: vec![idx],
                }),
        );
    }
    log::trace!("assembled {} song(s)", layouts.len());
    layouts
}
