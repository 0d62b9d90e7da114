/// Sound engine: short procedural effects via rodio.
///
/// Every effect is synthesized once into an in-memory WAV buffer when the
/// engine starts; playback is fire-and-forget through a detached Sink.
///
/// Without the "sound" feature the engine is a stub that plays nothing.
/// Waveform synthesis itself is plain code and always compiled.

use std::f32::consts::TAU;

use crate::sim::event::GameEvent;

const SAMPLE_RATE: u32 = 22050;

/// Effects the game can play.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Step,
    Push,
    Clear,
    Deadlock,
    Restart,
    Saved,
    Error,
}

impl Sfx {
    pub const ALL: [Sfx; 7] =
        [Sfx::Step, Sfx::Push, Sfx::Clear, Sfx::Deadlock, Sfx::Restart, Sfx::Saved, Sfx::Error];

    /// The effect that accompanies an event, if any.
    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::Moved { pushed: false } => Some(Sfx::Step),
            GameEvent::Moved { pushed: true } => Some(Sfx::Push),
            GameEvent::LevelCleared { .. } => Some(Sfx::Clear),
            GameEvent::Deadlocked { .. } => Some(Sfx::Deadlock),
            GameEvent::LevelStarted { .. } | GameEvent::LevelRestarted { .. } => Some(Sfx::Restart),
            GameEvent::MapSaved { .. } => Some(Sfx::Saved),
            GameEvent::LoadFailed { .. } | GameEvent::SaveFailed { .. } => Some(Sfx::Error),
            GameEvent::Quit => None,
        }
    }

    fn samples(self) -> Vec<f32> {
        match self {
            Sfx::Step => gen_blip(220.0, 0.025, 0.12),
            Sfx::Push => gen_scrape(),
            Sfx::Clear => gen_fanfare(),
            Sfx::Deadlock => gen_notes(&[392.0, 330.0, 262.0], 0.14, 0.3),
            Sfx::Restart => gen_notes(&[523.0, 784.0], 0.05, 0.2),
            Sfx::Saved => gen_notes(&[784.0, 1047.0], 0.08, 0.25),
            Sfx::Error => gen_blip(110.0, 0.18, 0.3),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{make_wav, Sfx};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// WAV buffers indexed by `Sfx`.
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::info!(error = %e, "no audio output; sound disabled");
                    return None;
                }
            };
            let buffers = Sfx::ALL.iter().map(|s| Arc::new(make_wav(&s.samples()))).collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(sfx.index()) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

impl SoundEngine {
    /// Play whatever goes with `event`.
    pub fn play_event(&self, event: &GameEvent) {
        if let Some(sfx) = Sfx::for_event(event) {
            self.play(sfx);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: mono f32 samples
// ════════════════════════════════════════════════════════════

/// Sine blip with a linear fade out.
fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            (t * freq * TAU).sin() * env * volume
        })
        .collect()
}

/// Notes played back to back, sine plus a little 2nd harmonic.
fn gen_notes(freqs: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * note_dur) as usize;
    let mut samples = Vec::with_capacity(n * freqs.len());
    for &freq in freqs {
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32) * 0.4;
            let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
            samples.push(wave * env * volume);
        }
    }
    samples
}

/// Crate scraping along the floor: low tone under LCG noise.
fn gen_scrape() -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * 0.07) as usize;
    let mut rng: u32 = 12345;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let tone = (i as f32 / SAMPLE_RATE as f32 * 140.0 * TAU).sin();
            rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
            let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
            (tone * 0.6 + noise * 0.4) * (1.0 - t).powf(0.7) * 0.25
        })
        .collect()
}

/// Ascending arpeggio C5 E5 G5 C6 with a held last note.
fn gen_fanfare() -> Vec<f32> {
    let mut samples = gen_notes(&[523.0, 659.0, 784.0], 0.1, 0.3);
    samples.extend(gen_blip(1047.0, 0.3, 0.3));
    samples
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: 16-bit mono PCM
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_map_to_effects() {
        assert_eq!(Sfx::for_event(&GameEvent::Moved { pushed: false }), Some(Sfx::Step));
        assert_eq!(Sfx::for_event(&GameEvent::Moved { pushed: true }), Some(Sfx::Push));
        assert_eq!(Sfx::for_event(&GameEvent::Deadlocked { name: "a".into() }), Some(Sfx::Deadlock));
        assert_eq!(Sfx::for_event(&GameEvent::Quit), None);
    }

    #[test]
    fn effects_are_audible_and_bounded() {
        for sfx in Sfx::ALL {
            let samples = sfx.samples();
            assert!(!samples.is_empty(), "{sfx:?}");
            assert!(samples.iter().all(|s| s.abs() <= 1.0), "{sfx:?}");
        }
    }

    #[test]
    fn index_matches_table_order() {
        for (i, sfx) in Sfx::ALL.iter().enumerate() {
            assert_eq!(sfx.index(), i);
        }
    }

    #[test]
    fn wav_header() {
        let wav = make_wav(&[0.0, 1.0, -2.0]);
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
        assert_eq!(i16::from_le_bytes([wav[48], wav[49]]), -32767);
    }
}
