//! Message length and validity tables shared by the track decoder and the stream reassembler.

/// Total length of a message (status byte included), indexed by `status - 0x80`.
///
/// `0` marks System Exclusive, whose length is only known once `F7` is found.
const LENGTH_BY_STATUS: [u8; 128] = {
    let mut table = [0; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = match i >> 4 {
            0x4 | 0x5 => 2,
            0x0..=0x6 => 3,
            _ => match i & 0x0F {
                0x0 => 0,
                0x1 | 0x3 => 2,
                0x2 => 3,
                _ => 1,
            },
        };
        i += 1;
    }
    table
};

/// Get the full length of the message started by the given status byte.
///
/// Returns `None` for data bytes and `Some(0)` for `F0` (System Exclusive).
#[inline]
pub fn message_length(status: u8) -> Option<usize> {
    if status & 0x80 == 0 {
        None
    } else {
        Some(LENGTH_BY_STATUS[(status - 0x80) as usize] as usize)
    }
}

/// Amount of data bytes following a channel message status byte (`0x80..=0xEF`).
#[inline]
pub(crate) fn channel_data_len(status: u8) -> usize {
    match status >> 4 {
        0xC | 0xD => 1,
        _ => 2,
    }
}

/// Whether the status byte is a System Realtime message, which may appear anywhere in a stream.
#[inline]
pub fn is_realtime(status: u8) -> bool {
    status >= 0xF8
}

/// Check that the given bytes form exactly one complete and valid message.
///
/// A System Exclusive message must start with `F0`, end with `F7`, and carry only data bytes in
/// between.
pub fn is_valid_message(bytes: &[u8]) -> bool {
    let status = match bytes.first() {
        Some(&status) => status,
        None => return false,
    };
    match message_length(status) {
        None => false,
        Some(0) => {
            bytes.len() >= 2
                && bytes[bytes.len() - 1] == 0xF7
                && bytes[1..bytes.len() - 1].iter().all(|&b| b & 0x80 == 0)
        }
        Some(len) => bytes.len() == len && bytes[1..].iter().all(|&b| b & 0x80 == 0),
    }
}

/// Running status after a message with the given status byte has been sent.
///
/// Channel messages set it, System Common messages clear it and System Realtime messages leave it
/// untouched.
#[inline]
pub(crate) fn next_running_status(status: u8, running_status: u8) -> u8 {
    if status < 0xF0 {
        status
    } else if status < 0xF8 {
        0
    } else {
        running_status
    }
}
