//! Rebuilding discrete messages out of a raw, "live" MIDI byte stream.
//!
//! Messages read from a Standard Midi File are already delimited by the file structure. Bytes
//! coming from a MIDI cable, on the other hand, arrive in arbitrary fragments, may omit the status
//! byte (running status) and may have System Realtime bytes interleaved anywhere, even in the
//! middle of another message.

use crate::event::{is_realtime, is_valid_message, message_length, next_running_status};
use std::{collections::VecDeque, mem};

/// A streaming raw MIDI parser.
/// This parser takes raw MIDI, *not* `.mid` files!
///
/// Bytes are pushed in with [`push_bytes`](#method.push_bytes) and complete messages are popped
/// with [`pop_events`](#method.pop_events). Every message comes out with its status byte, even if
/// it was sent under running status.
///
/// The output does not depend on how the input is split across calls.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MidiStream {
    /// Zero if there is no running status.
    running_status: u8,
    /// Bytes of an incomplete message, carried over to the next call.
    rest: Vec<u8>,
    events: VecDeque<Vec<u8>>,
}
impl MidiStream {
    pub fn new() -> MidiStream {
        MidiStream::default()
    }

    /// Forget the running status and any carried over or unclaimed data.
    pub fn reset(&mut self) {
        self.running_status = 0;
        self.rest.clear();
        self.events.clear();
    }

    /// Take all of the messages completed so far.
    pub fn pop_events(&mut self) -> Vec<Vec<u8>> {
        self.events.drain(..).collect()
    }

    /// Push some bytes through the parser, and feed the complete messages to the given closure.
    pub fn feed(&mut self, bytes: &[u8], mut handle_ev: impl FnMut(&[u8])) {
        self.push_bytes(bytes);
        for ev in self.events.drain(..) {
            handle_ev(&ev);
        }
    }

    /// Push a fragment of the stream.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if self.rest.is_empty() && self.push_whole(bytes) {
            return;
        }
        let mut rest = mem::take(&mut self.rest);
        rest.extend_from_slice(bytes);
        self.drain_messages(&mut rest);
        self.rest = rest;
    }

    /// Handle the usual case of a fragment being exactly one complete message.
    fn push_whole(&mut self, bytes: &[u8]) -> bool {
        let status = match bytes.first() {
            Some(&status) if status != 0xF7 => status,
            _ => return false,
        };
        let whole = match message_length(status) {
            Some(0) => true,
            Some(len) => bytes.len() == len,
            None => false,
        };
        if whole && is_valid_message(bytes) {
            self.events.push_back(bytes.to_vec());
            self.running_status = next_running_status(status, self.running_status);
            true
        } else {
            false
        }
    }

    fn drain_messages(&mut self, rest: &mut Vec<u8>) {
        while let Some(&first) = rest.first() {
            if first & 0x80 == 0 {
                if self.running_status & 0x80 == 0 {
                    //Stray data byte
                    rest.remove(0);
                    continue;
                }
                rest.insert(0, self.running_status);
            }

            let status = rest[0];
            if status == 0xF7 {
                //Stray End of Exclusive
                rest.remove(0);
                self.running_status = 0;
            } else if status != 0xF0 {
                let len = message_length(status).unwrap_or(1);
                if len > rest.len() {
                    break;
                }
                if let Some(idx) = (1..len).find(|&i| is_realtime(rest[i])) {
                    //System Realtime messages may interrupt any other message
                    self.events.push_back(vec![rest.remove(idx)]);
                    continue;
                }
                if is_valid_message(&rest[..len]) {
                    self.events.push_back(rest.drain(..len).collect());
                    self.running_status = next_running_status(status, self.running_status);
                } else {
                    rest.remove(0);
                    self.running_status = 0;
                }
            } else {
                //System Exclusive
                self.running_status = 0;
                let idx = match (1..rest.len()).find(|&i| rest[i] & 0x80 != 0) {
                    Some(idx) => idx,
                    None => break,
                };
                let byte = rest[idx];
                if is_realtime(byte) {
                    self.events.push_back(vec![rest.remove(idx)]);
                } else if byte == 0xF7 {
                    self.events.push_back(rest.drain(..=idx).collect());
                } else {
                    //Interrupted by another status byte, which starts the next message
                    rest.drain(..idx);
                }
            }
        }
    }
}
