//! Best-effort guess of the MIDI port each track is meant for.
//!
//! There is no standard way of addressing more than 16 channels in a Standard Midi File, so this
//! looks at the de-facto conventions found at the start of each track.

use crate::{primitive::read_varlen, smf::TrackEvent, song::Song};

/// Port hints found at tick 0 of a track.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PortInfo {
    /// Value of the (unofficial) `FF 21` port prefix meta event.
    pub unofficial_prefix: Option<u8>,
    /// Value of the YAMAHA sequencer-specific port prefix (`FF 7F 04 43 00 01 pp`).
    pub yamaha_prefix: Option<u8>,
    /// Device name, printable ASCII kept as-is and every other byte escaped as `\xNN`.
    pub device_name: Option<String>,
    /// Index of the device name among all the distinct names of the song, in first-seen order.
    pub device_name_index: Option<usize>,
}

/// What a port assignment was based on.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Evidence {
    YamahaPrefix,
    UnofficialPrefix,
    /// The track names a device, but the port was not derived from it.
    DeviceName,
    None,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PortAssignment {
    pub port: u8,
    pub evidence: Evidence,
}

/// The port of every track of a song.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PortMap {
    pub ports: Vec<u8>,
    pub info: Vec<PortInfo>,
}

fn render_name(name: &[u8]) -> String {
    let mut out = String::with_capacity(name.len());
    for &byte in name {
        if (0x20..0x7F).contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("\\x{:02x}", byte));
        }
    }
    out
}

fn scan_track(track: &[TrackEvent], names: &mut Vec<String>) -> PortInfo {
    let mut info = PortInfo::default();
    for ev in track.iter().take_while(|ev| ev.tick == 0) {
        match &ev.bytes[..] {
            [0xFF, 0x21, _, port] => info.unofficial_prefix = Some(*port),
            [0xFF, 0x7F, 0x04, 0x43, 0x00, 0x01, port, ..] => info.yamaha_prefix = Some(*port),
            [0xFF, 0x08, rest @ ..] => {
                let mut name: &[u8] = rest;
                if read_varlen(&mut name).is_none() {
                    continue;
                }
                let name = render_name(name);
                let index = match names.iter().position(|known| *known == name) {
                    Some(index) => index,
                    None => {
                        names.push(name.clone());
                        names.len() - 1
                    }
                };
                info.device_name = Some(name);
                info.device_name_index = Some(index);
            }
            _ => {}
        }
    }
    info
}

impl PortMap {
    /// Guess the ports of a song.
    ///
    /// YAMAHA port prefixes take precedence over unofficial port prefixes. If only unofficial
    /// prefixes are present and no track uses port 0, ports are assumed to be 1-based and are
    /// shifted down by one.
    pub fn build(song: &Song) -> PortMap {
        if song.header.format == 0 {
            return PortMap {
                ports: vec![0],
                info: vec![PortInfo::default()],
            };
        }
        let mut names = Vec::new();
        let info: Vec<PortInfo> = song
            .tracks
            .iter()
            .map(|track| scan_track(track, &mut names))
            .collect();

        let ports: Vec<u8> = if info.iter().any(|i| i.yamaha_prefix.is_some()) {
            info.iter().map(|i| i.yamaha_prefix.unwrap_or(0)).collect()
        } else if info.iter().any(|i| i.unofficial_prefix.is_some()) {
            let ports = info.iter().map(|i| i.unofficial_prefix.unwrap_or(0));
            if info.iter().any(|i| i.unofficial_prefix == Some(0)) {
                ports.collect()
            } else {
                ports.map(|port| port.saturating_sub(1)).collect()
            }
        } else {
            vec![0; info.len()]
        };
        PortMap { ports, info }
    }

    /// The port of each track, along with what it was based on.
    pub fn assignments(&self) -> Vec<PortAssignment> {
        let yamaha = self.info.iter().any(|i| i.yamaha_prefix.is_some());
        let unofficial = !yamaha && self.info.iter().any(|i| i.unofficial_prefix.is_some());
        self.ports
            .iter()
            .zip(self.info.iter())
            .map(|(&port, info)| {
                let evidence = if yamaha && info.yamaha_prefix.is_some() {
                    Evidence::YamahaPrefix
                } else if unofficial && info.unofficial_prefix.is_some() {
                    Evidence::UnofficialPrefix
                } else if info.device_name.is_some() {
                    Evidence::DeviceName
                } else {
                    Evidence::None
                };
                PortAssignment { port, evidence }
            })
            .collect()
    }
}
