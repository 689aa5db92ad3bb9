//! YAMAHA MU sampling extension (`v000` chunks inside DLS-like `YMHM` lists).
//!
//! The layout of `v000` depends on where it sits: under an instrument it holds tone parameters,
//! under a region it holds drum parameters.

use crate::{
    chunk::{Content, Decoded},
    prelude::*,
};

/// Declare a struct of byte-sized parameters, each read from a fixed offset.
macro_rules! byte_fields {
    {
        $(#[$attr:meta])*
        pub struct $name:ident {
            $( $field:ident = $offset:expr, )*
        }
    } => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
        pub struct $name {
            $( pub $field: u8, )*
        }
        impl $name {
            fn read(raw: &[u8]) -> $name {
                $name {
                    $( $field: raw.get($offset).copied().unwrap_or(0), )*
                }
            }
        }
    };
}

byte_fields! {
    /// Parameters of one tone element, except the two 14-bit fields kept in `ToneElement`.
    pub struct ElementParams {
        note_limit_low = 2,
        note_limit_high = 3,
        velocity_limit_low = 4,
        velocity_limit_high = 5,
        filter_curve = 6,
        lfo_wave = 7,
        lfo_phase_shift = 8,
        lfo_speed = 9,
        plfo_delay = 10,
        plfo_fade_time = 11,
        lfo_pmod = 12,
        lfo_fmod = 13,
        lfo_amod = 14,
        note_shift = 15,
        detune = 16,
        pitch_scaling_rate = 17,
        pitch_scaling_center = 18,
        pitch_eg_depth = 19,
        peg_depth_level_vel_sens = 20,
        peg_depth_rate_vel_sens = 21,
        peg_depth_rate_scaling = 22,
        peg_depth_rate_scal_center = 23,
        peg_attack_rate = 24,
        peg_decay1_rate = 25,
        peg_decay2_rate = 26,
        peg_release_rate = 27,
        peg_initial_level = 28,
        peg_attack_level = 29,
        peg_decay1_level = 30,
        peg_decay2_level = 31,
        peg_release_level = 32,
        filter_resonance = 33,
        amp_velocity_sens = 34,
        filter_cutoff_freq = 35,
        filter_scaling_bp1 = 36,
        filter_scaling_bp2 = 37,
        filter_scaling_bp3 = 38,
        filter_scaling_bp4 = 39,
        filter_scaling_offset1 = 40,
        filter_scaling_offset2 = 41,
        filter_scaling_offset3 = 42,
        filter_scaling_offset4 = 43,
        feg_level_velocity_sens = 44,
        feg_rate_velocity_sens = 45,
        feg_rate_scaling = 46,
        feg_rate_scaling_center = 47,
        feg_attack_rate = 48,
        feg_decay1_rate = 49,
        feg_decay2_rate = 50,
        feg_release_rate = 51,
        feg_initial_level = 52,
        feg_attack_level = 53,
        feg_decay1_level = 54,
        feg_decay2_level = 55,
        feg_release_level = 56,
        element_volume = 57,
        level_scaling_bp1 = 58,
        level_scaling_bp2 = 59,
        level_scaling_bp3 = 60,
        level_scaling_bp4 = 61,
        level_scaling_offset1 = 62,
        level_scaling_offset2 = 63,
        level_scaling_offset3 = 64,
        level_scaling_offset4 = 65,
        velocity_curve = 66,
        pan = 67,
        aeg_rate_scaling = 68,
        aeg_rate_scaling_center = 69,
        aeg_key_on_delay = 70,
        aeg_attack_rate = 71,
        aeg_decay1_rate = 72,
        aeg_decay2_rate = 73,
        aeg_release_rate = 74,
        aeg_decay1_level = 75,
        aeg_decay2_level = 76,
        resonance_sensitivity = 79,
        high_pass_filter_cutoff_freq = 80,
        aeg_initial_level = 81,
        feg_depth = 82,
        feg_depth_vel_sens = 83,
    }
}

byte_fields! {
    /// Drum setup of a single key.
    pub struct DrumSetup {
        pitch_coarse = 0,
        pitch_fine = 1,
        volume = 2,
        alternate_group = 3,
        pan = 4,
        reverb_send_level = 5,
        chorus_send_level = 6,
        variation_send_level = 7,
        key_assign = 8,
        receive_note_off = 9,
        receive_note_on = 10,
        filter_cutoff_frequency = 11,
        filter_resonance = 12,
        eg_attack_rate = 13,
        eg_decay1_rate = 14,
        eg_decay2_rate = 15,
        eq_bass_gain = 16,
        eq_treble_gain = 17,
        eq_bass_frequency = 18,
        eq_treble_frequency = 19,
        high_pass_filter_cutoff_freq = 20,
        velocity_sens_pitch = 21,
        velocity_sens_lpf_cutoff = 22,
    }
}

const ELEMENT_LEN: usize = 84;
const ELEMENTS_START: usize = 22;
const TONE_LEN: usize = ELEMENTS_START + 4 * ELEMENT_LEN;
const DRUM_LEN: usize = 50;

/// One of the four elements of a tone.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ToneElement {
    pub wave_no: u16,
    pub address_offset: u16,
    pub params: ElementParams,
}
impl ToneElement {
    fn read(raw: &[u8]) -> ToneElement {
        let u14 = |hi: usize, lo: usize| {
            let hi = raw.get(hi).copied().unwrap_or(0) as u16;
            let lo = raw.get(lo).copied().unwrap_or(0) as u16;
            (hi << 7) | lo
        };
        ToneElement {
            wave_no: u14(0, 1),
            address_offset: u14(77, 78),
            params: ElementParams::read(raw),
        }
    }
}

/// Tone parameters, found under `ins /YMHM/MU00`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ToneParams<'a> {
    /// Raw, space padded.
    pub voice_name: &'a [u8],
    pub elements: [ToneElement; 4],
}

/// Drum parameters, found under `rgn /YMHM/MU00`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DrumParams<'a> {
    /// Raw, space padded.
    pub voice_name: &'a [u8],
    pub setup: DrumSetup,
    /// Parameters 23 to 41, whose meaning is unknown.
    pub unknown: &'a [u8],
}

fn path_ends_with(ancestors: &[Tag], suffix: &[&[u8; 4]]) -> bool {
    ancestors.len() >= suffix.len()
        && ancestors[ancestors.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(anc, tag)| anc == *tag)
}

pub(crate) fn decode_v000<'a>(
    raw: &'a [u8],
    tag: Tag,
    ancestors: &[Tag],
    diags: &mut Diagnostics,
) -> Decoded<'a> {
    if path_ends_with(ancestors, &[b"ins ", b"YMHM", b"MU00"]) {
        if raw.len() < TONE_LEN {
            diags.warn_at(
                format!("Unexpected content of {} chunk in 'ins' chunk", tag),
                raw,
            );
            return Decoded::Invalid;
        }
        let element = |i: usize| {
            let start = ELEMENTS_START + i * ELEMENT_LEN;
            ToneElement::read(&raw[start..start + ELEMENT_LEN])
        };
        Decoded::Content(Content::Tone(ToneParams {
            voice_name: &raw[10..18],
            elements: [element(0), element(1), element(2), element(3)],
        }))
    } else if path_ends_with(ancestors, &[b"rgn ", b"YMHM", b"MU00"]) {
        if raw.len() < DRUM_LEN {
            diags.warn_at(
                format!("Unexpected content of {} chunk in 'rgn' chunk", tag),
                raw,
            );
            return Decoded::Invalid;
        }
        let params = &raw[8..];
        Decoded::Content(Content::Drum(DrumParams {
            voice_name: &raw[..8],
            setup: DrumSetup::read(params),
            unknown: &params[23..42],
        }))
    } else {
        Decoded::Opaque
    }
}
