//! Musical and absolute time for every tick used by a song.

use crate::{prelude::*, song::Song};
use std::{collections::BTreeMap, convert::TryFrom};

const DEFAULT_USEC_PER_BEAT: u32 = 500_000;

/// A time signature, with the denominator already raised to its power of two.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u32,
}
impl Default for TimeSignature {
    fn default() -> TimeSignature {
        TimeSignature {
            numerator: 4,
            denominator: 4,
        }
    }
}

/// Measure, beat and tick within the beat. Measures and beats count from 1.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Mbt {
    pub measure: u32,
    pub beat: u32,
    pub tick: u32,
}

/// SMPTE-style time code, for files using time-code based division.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct Smpte {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
    pub fractional_frames: u32,
}

/// Everything known about a single tick.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TempoEntry {
    /// Set if a tempo change happens at this tick.
    pub usec_per_beat: Option<u32>,
    /// Set if a time signature change happens at this tick.
    pub time_signature: Option<TimeSignature>,
    /// Only available in metrical mode with a nonzero division.
    pub mbt: Option<Mbt>,
    /// Elapsed time since tick 0, in microseconds.
    pub usec: f64,
    /// Only available in time-code mode.
    pub smpte: Option<Smpte>,
}

/// A map from every tick any track uses (and tick 0) to its timing information.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TempoMap {
    entries: BTreeMap<u32, TempoEntry>,
}
impl TempoMap {
    /// Build the tempo map of a song.
    ///
    /// Time-code based songs ignore tempo events, and SMPTE offset meta events are never applied.
    ///
    /// Beat lengths are whole ticks (`division * 4 / denominator`, rounded down). When that
    /// division is not exact, measure/beat/tick positions drift from a fractional beat grid.
    pub fn build(song: &Song) -> TempoMap {
        let mut entries: BTreeMap<u32, TempoEntry> = BTreeMap::new();
        entries.insert(0, TempoEntry::default());
        for track in song.tracks.iter() {
            for ev in track.iter() {
                entries.entry(ev.tick).or_default();
            }
        }
        let mut map = TempoMap { entries };
        let division = song.header.division;
        if bit_range(division, 15..16) == 0 {
            map.fill_metrical(song, division as u32);
        } else {
            let fps = -((division >> 8) as u8 as i8 as i32);
            let subframes = (division & 0xFF) as i32;
            map.fill_timecode(fps * subframes, subframes);
        }
        map
    }

    fn fill_metrical(&mut self, song: &Song, division: u32) {
        if let Some(first) = self.entries.get_mut(&0) {
            first.usec_per_beat = Some(DEFAULT_USEC_PER_BEAT);
            first.time_signature = Some(TimeSignature::default());
        }
        for track in song.tracks.iter() {
            for ev in track.iter() {
                let bytes = &ev.bytes[..];
                let entry = match self.entries.get_mut(&ev.tick) {
                    Some(entry) => entry,
                    None => continue,
                };
                match bytes {
                    [0xFF, 0x51, 0x03, a, b, c] => {
                        entry.usec_per_beat =
                            Some((*a as u32) << 16 | (*b as u32) << 8 | *c as u32);
                    }
                    [0xFF, 0x58, 0x04, nn, dd, _, _] => {
                        entry.time_signature = Some(TimeSignature {
                            numerator: *nn,
                            denominator: 2u32.checked_pow(*dd as u32).unwrap_or(u32::MAX),
                        });
                    }
                    _ => {}
                }
            }
        }
        if division == 0 {
            return;
        }
        self.fill_mbt(division);

        let mut base_tick = 0;
        let mut base_usec = 0.0;
        let mut base_tempo = DEFAULT_USEC_PER_BEAT;
        for (&tick, entry) in self.entries.iter_mut() {
            entry.usec = base_usec
                + (tick - base_tick) as f64 * base_tempo as f64 / division as f64;
            if let Some(tempo) = entry.usec_per_beat {
                base_tick = tick;
                base_usec = entry.usec;
                base_tempo = tempo;
            }
        }
    }

    fn fill_mbt(&mut self, division: u32) {
        let ticks: Vec<u32> = self.entries.keys().copied().collect();
        let mut sig = TimeSignature::default();
        let mut measure: u32 = 1;
        let mut measure_start: u64 = 0;
        let mut i = 0;
        while i < ticks.len() {
            //Signatures at the measure start govern the whole measure
            let at_start = u32::try_from(measure_start)
                .ok()
                .and_then(|tick| self.entries.get(&tick))
                .and_then(|entry| entry.time_signature);
            if let Some(at_start) = at_start {
                sig = at_start;
            }
            if sig.denominator > 256 {
                sig = TimeSignature::default();
            }
            let beat_ticks = (division as u64 * 4 / sig.denominator as u64).max(1);
            let beats = if sig.numerator == 0 {
                sig.denominator as u64
            } else {
                sig.numerator as u64
            };
            let measure_ticks = beat_ticks * beats;

            let next = ticks[i] as u64;
            if next >= measure_start + measure_ticks {
                let skip = (next - measure_start) / measure_ticks;
                measure = measure.saturating_add(skip as u32);
                measure_start += skip * measure_ticks;
                continue;
            }

            let measure_end = measure_start + measure_ticks;
            while i < ticks.len() && (ticks[i] as u64) < measure_end {
                let offset = ticks[i] as u64 - measure_start;
                if let Some(entry) = self.entries.get_mut(&ticks[i]) {
                    entry.mbt = Some(Mbt {
                        measure,
                        beat: (offset / beat_ticks + 1) as u32,
                        tick: (offset % beat_ticks) as u32,
                    });
                    //Takes effect from the next measure
                    if let Some(mid) = entry.time_signature {
                        sig = mid;
                    }
                }
                i += 1;
            }
            measure = measure.saturating_add(1);
            measure_start = measure_end;
        }
    }

    fn fill_timecode(&mut self, ticks_per_sec: i32, subframes: i32) {
        if ticks_per_sec <= 0 {
            return;
        }
        let ticks_per_sec = ticks_per_sec as u32;
        let subframes = subframes as u32;
        for (&tick, entry) in self.entries.iter_mut() {
            let sec = tick / ticks_per_sec;
            entry.smpte = Some(Smpte {
                hours: sec / 3600,
                minutes: sec / 60 % 60,
                seconds: sec % 60,
                frames: tick % ticks_per_sec / subframes,
                fractional_frames: tick % subframes,
            });
            entry.usec = tick as f64 * 1_000_000.0 / ticks_per_sec as f64;
        }
    }

    /// Get the information of a tick used by the song.
    #[inline]
    pub fn get(&self, tick: u32) -> Option<&TempoEntry> {
        self.entries.get(&tick)
    }

    /// Iterate over all entries, in increasing tick order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &TempoEntry)> + '_ {
        self.entries.iter().map(|(&tick, entry)| (tick, entry))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
