//! Synthesizer — fixed-point polyphonic engine with sequencer hook
//!
//! Owns the voice bank, echo unit and output stage. Background code
//! changes the current tone and starts notes; the sample interrupt
//! calls [`Synth::next_sample`], which advances the sequencer, renders
//! and mixes every voice, runs the echo and drives the PWM pair.
//!
//! Author: Moroya Sakamoto

use crate::config::SynthConfig;
use crate::cues::Cue;
use crate::effects::{clip_i8, Echo, EchoParams, Effect};
use crate::envelope::{Adsr, AdsrPhase, AdsrState, EnvelopeRates};
use crate::error::SynthError;
use crate::oscillator::{Oscillator, Waveform, CENTER};
use crate::output::{OutputStage, PwmPair};
use crate::patch::SoundPreset;
use crate::score::Song;
use crate::sequencer::{NoteSink, Sequencer};

/// Maximum polyphony
pub const MAX_VOICES: usize = 4;

/// Volume used when the caller does not pick one
pub const FULL_VOLUME: u8 = 255;

/// Single voice state
///
/// Size: 48 bytes
#[derive(Debug, Clone)]
pub struct Voice {
    /// Is this voice currently producing sound?
    active: bool,
    /// Does this voice feed the echo unit?
    echo_send: bool,
    /// Target pitch in Hz
    frequency: u16,
    /// Linear volume (0-255)
    base_volume: u8,
    osc: Oscillator,
    env: AdsrState,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    pub const fn new() -> Self {
        Self {
            active: false,
            echo_send: false,
            frequency: 0,
            base_volume: 0,
            osc: Oscillator::new(Waveform::Sine),
            env: AdsrState::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn echo_send(&self) -> bool {
        self.echo_send
    }

    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    pub fn base_volume(&self) -> u8 {
        self.base_volume
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.osc
    }

    pub fn envelope(&self) -> &AdsrState {
        &self.env
    }

    /// Advance oscillator and envelope by one sample
    ///
    /// Returns the signed, enveloped, volume-scaled sample. Clears
    /// `active` on the sample the envelope reaches idle.
    #[inline(always)]
    fn render(&mut self) -> i32 {
        let wave = self.osc.next_sample() as i32 - CENTER as i32;
        let level = self.env.next().high8() as i32;
        if !self.env.is_active() {
            self.active = false;
        }
        (wave * level * self.base_volume as i32) >> 16
    }

    fn silence(&mut self) {
        self.active = false;
        self.env.kill();
    }
}

/// Fixed-size pool of voices with the stealing policy
#[derive(Debug, Clone, Default)]
pub struct VoiceBank {
    voices: [Voice; MAX_VOICES],
}

impl VoiceBank {
    pub const fn new() -> Self {
        Self {
            voices: [Voice::new(), Voice::new(), Voice::new(), Voice::new()],
        }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Start a note on the best available voice
    ///
    /// Never fails: when every voice is busy, the first releasing voice
    /// is reused, else voice 0. Every field is written before the voice
    /// is marked active.
    pub fn start_note(
        &mut self,
        frequency: u16,
        duration_ms: u32,
        volume: u8,
        tone: &Tone,
        sample_rate: u32,
    ) {
        let index = self.select_voice();
        let voice = &mut self.voices[index];
        if voice.active {
            log::trace!(
                "voice {index} stolen ({:?}, {} Hz) for {frequency} Hz",
                voice.env.phase(),
                voice.frequency
            );
        }

        voice.active = false;
        voice.frequency = frequency;
        voice.base_volume = volume;
        voice.echo_send = tone.echo_send;
        voice.osc.waveform = tone.waveform;
        voice.osc.set_frequency(frequency, sample_rate);
        voice.osc.reset();
        voice
            .env
            .trigger(EnvelopeRates::derive(&tone.envelope, duration_ms, sample_rate));
        voice.active = true;
    }

    /// First idle voice, else first releasing voice, else voice 0
    fn select_voice(&self) -> usize {
        if let Some(i) = self.voices.iter().position(|v| !v.active) {
            return i;
        }
        self.voices
            .iter()
            .position(|v| v.env.phase() == AdsrPhase::Release)
            .unwrap_or(0)
    }

    /// Cut every voice immediately, no release
    pub fn stop_all(&mut self) {
        self.voices.iter_mut().for_each(Voice::silence);
    }

    pub fn any_active(&self) -> bool {
        self.voices.iter().any(|v| v.active)
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    /// Render one sample from every active voice
    ///
    /// Returns `(mix, echo_send)`.
    #[inline(always)]
    pub fn render(&mut self) -> (i32, i32) {
        let mut mix = 0i32;
        let mut send = 0i32;
        for voice in self.voices.iter_mut().filter(|v| v.active) {
            let s = voice.render();
            mix += s;
            if voice.echo_send {
                send += s;
            }
        }
        (mix, send)
    }
}

/// Template applied to the next note started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub preset: SoundPreset,
    pub waveform: Waveform,
    pub envelope: Adsr,
    pub echo_send: bool,
}

impl Tone {
    pub fn from_preset(preset: SoundPreset) -> Self {
        let patch = preset.params();
        Self {
            preset,
            waveform: patch.waveform,
            envelope: patch.envelope,
            echo_send: patch.echo_send,
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::from_preset(SoundPreset::Default)
    }
}

/// Sequencer's view of the voice bank for one call
struct BankSink<'a> {
    bank: &'a mut VoiceBank,
    tone: &'a mut Tone,
    sample_rate: u32,
}

impl NoteSink for BankSink<'_> {
    #[inline]
    fn play_preset_note(&mut self, preset: SoundPreset, pitch: u16, duration_ms: u32) {
        *self.tone = Tone::from_preset(preset);
        self.bank
            .start_note(pitch, duration_ms, FULL_VOLUME, self.tone, self.sample_rate);
    }

    fn stop_all(&mut self) {
        self.bank.stop_all();
    }
}

/// Polyphonic synthesizer
pub struct Synth<O: PwmPair> {
    config: SynthConfig,
    bank: VoiceBank,
    tone: Tone,
    echo: Echo,
    output: OutputStage<O>,
    sequencer: Option<Sequencer>,
}

impl<O: PwmPair> Synth<O> {
    /// Allocate the echo buffer, park the output and select the default preset
    pub fn new(config: SynthConfig, pins: O) -> Result<Self, SynthError> {
        config.validate()?;
        log::debug!(
            "synth init: {} Hz, echo {} samples, preset {}",
            config.sample_rate,
            config.echo_capacity,
            config.default_preset.name()
        );
        Ok(Self {
            config,
            bank: VoiceBank::new(),
            tone: Tone::from_preset(config.default_preset),
            echo: Echo::new(config.echo_capacity),
            output: OutputStage::new(pins),
            sequencer: None,
        })
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn tone(&self) -> &Tone {
        &self.tone
    }

    pub fn current_preset(&self) -> SoundPreset {
        self.tone.preset
    }

    pub fn voices(&self) -> &[Voice] {
        self.bank.voices()
    }

    pub fn voice_bank(&self) -> &VoiceBank {
        &self.bank
    }

    pub fn echo(&self) -> &Echo {
        &self.echo
    }

    pub fn output(&self) -> &OutputStage<O> {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputStage<O> {
        &mut self.output
    }

    // ── Tone ──

    pub fn set_waveform(&mut self, waveform: Waveform) {
        log::debug!("waveform -> {waveform:?}");
        self.tone.waveform = waveform;
    }

    /// Envelope for notes started from now on
    pub fn set_adsr(&mut self, envelope: Adsr) {
        log::debug!("adsr -> {envelope:?}");
        self.tone.envelope = envelope;
    }

    /// Load waveform, envelope and echo send from a preset
    pub fn set_sound_preset(&mut self, preset: SoundPreset) {
        log::debug!("preset -> {}", preset.name());
        self.tone = Tone::from_preset(preset);
    }

    /// [`Synth::set_sound_preset`] for a raw id from outside the crate
    pub fn set_sound_preset_id(&mut self, id: u8) -> Result<(), SynthError> {
        let preset = SoundPreset::try_from(id)?;
        self.set_sound_preset(preset);
        Ok(())
    }

    pub fn set_echo(&mut self, params: EchoParams) {
        log::debug!("echo -> {params:?}");
        self.echo.configure(params, self.config.sample_rate);
    }

    // ── Notes ──

    /// Start a note with the current tone
    pub fn play_note(&mut self, frequency: u16, duration_ms: u32, volume: u8) {
        self.bank
            .start_note(frequency, duration_ms, volume, &self.tone, self.config.sample_rate);
    }

    /// Play a built-in cue, replacing the current waveform and envelope
    pub fn play_cue(&mut self, cue: Cue) {
        let spec = cue.spec();
        self.tone.waveform = spec.waveform;
        self.tone.envelope = spec.envelope;
        self.play_note(spec.pitch, spec.duration_ms, spec.volume);
    }

    /// Alias for [`Synth::stop_all`]
    pub fn stop_note(&mut self) {
        self.stop_all();
    }

    /// Cut every voice and park the output
    pub fn stop_all(&mut self) {
        log::debug!("stop all ({} voices active)", self.bank.active_count());
        self.bank.stop_all();
        self.output.silence();
    }

    /// Is any voice sounding?
    pub fn is_playing(&self) -> bool {
        self.bank.any_active()
    }

    pub fn active_voice_count(&self) -> usize {
        self.bank.active_count()
    }

    // ── Sequencer ──

    /// Advance `sequencer` from the sample interrupt; returns the one it replaces
    pub fn attach_sequencer(&mut self, mut sequencer: Sequencer) -> Option<Sequencer> {
        sequencer.set_sample_rate(self.config.sample_rate);
        self.sequencer.replace(sequencer)
    }

    pub fn detach_sequencer(&mut self) -> Option<Sequencer> {
        self.sequencer.take()
    }

    pub fn sequencer(&self) -> Option<&Sequencer> {
        self.sequencer.as_ref()
    }

    pub fn play_song(&mut self, song: &'static Song) -> Result<(), SynthError> {
        self.sequencer
            .as_mut()
            .ok_or(SynthError::NoSequencer)?
            .play(song)
    }

    /// Stop the song and cut every voice
    pub fn stop_song(&mut self) -> Result<(), SynthError> {
        let seq = self.sequencer.as_mut().ok_or(SynthError::NoSequencer)?;
        let mut sink = BankSink {
            bank: &mut self.bank,
            tone: &mut self.tone,
            sample_rate: self.config.sample_rate,
        };
        seq.stop(&mut sink);
        self.output.silence();
        Ok(())
    }

    pub fn song_playing(&self) -> bool {
        self.sequencer.as_ref().is_some_and(Sequencer::is_playing)
    }

    pub fn set_tempo(&mut self, bpm: u8) -> Result<(), SynthError> {
        self.sequencer
            .as_mut()
            .ok_or(SynthError::NoSequencer)?
            .set_tempo(bpm)
    }

    // ── Interrupt path ──

    /// Produce one output sample; call at the sample rate
    ///
    /// Returns the mixed sample before smoothing.
    #[inline]
    pub fn next_sample(&mut self) -> u8 {
        if let Some(seq) = self.sequencer.as_mut() {
            let mut sink = BankSink {
                bank: &mut self.bank,
                tone: &mut self.tone,
                sample_rate: self.config.sample_rate,
            };
            seq.advance(&mut sink);
        }

        let (dry, send) = self.bank.render();
        let wet = self.echo.process(send);
        let sample = (clip_i8((dry + wet) / 2) + CENTER as i32) as u8;

        if self.bank.any_active() || self.echo.is_enabled() {
            self.output.drive(sample);
        } else {
            self.output.silence();
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::output::tests::{PinEvent, RecordingPins};

    const SR: u32 = 40_000;

    fn synth() -> Synth<RecordingPins> {
        Synth::new(
            SynthConfig::default().with_sample_rate(SR).with_echo_capacity(400),
            RecordingPins::default(),
        )
        .unwrap()
    }

    fn tone(envelope: Adsr) -> Tone {
        Tone {
            envelope,
            ..Tone::default()
        }
    }

    #[test]
    fn test_new_validates_config() {
        let bad = SynthConfig::default().with_sample_rate(10);
        assert_eq!(
            Synth::new(bad, RecordingPins::default()).err(),
            Some(SynthError::InvalidSampleRate(10))
        );
        let synth = synth();
        assert_eq!(synth.output().pins().events, [PinEvent::Park]);
        assert_eq!(synth.current_preset(), SoundPreset::Default);
    }

    #[test]
    fn test_fills_free_voices_first() {
        let mut bank = VoiceBank::new();
        let t = Tone::default();
        for (i, f) in [220, 330, 440].into_iter().enumerate() {
            bank.start_note(f, 100, 255, &t, SR);
            assert_eq!(bank.active_count(), i + 1);
        }
        assert_eq!(bank.voices()[2].frequency(), 440);
        assert!(!bank.voices()[3].is_active());
    }

    #[test]
    fn test_steal_prefers_releasing_voice() {
        let mut bank = VoiceBank::new();
        let long = tone(Adsr::new(1, 1, 200, 500));
        for f in [100, 200, 300, 400] {
            let duration = if f == 300 { 0 } else { 1_000 };
            bank.start_note(f, duration, 255, &long, SR);
        }
        // Attack and decay are 40 samples each, then voice 2 releases at once
        for _ in 0..200 {
            bank.render();
        }
        assert_eq!(bank.voices()[2].envelope().phase(), AdsrPhase::Release);
        assert_eq!(bank.voices()[0].envelope().phase(), AdsrPhase::Sustain);

        bank.start_note(500, 1_000, 255, &long, SR);
        let freqs: Vec<u16> = bank.voices().iter().map(Voice::frequency).collect();
        assert_eq!(freqs, [100, 200, 500, 400]);
        assert_eq!(bank.voices()[2].envelope().phase(), AdsrPhase::Attack);

        // Nothing releasing any more: hard steal of voice 0
        bank.start_note(600, 1_000, 255, &long, SR);
        let freqs: Vec<u16> = bank.voices().iter().map(Voice::frequency).collect();
        assert_eq!(freqs, [600, 200, 500, 400]);
        assert_eq!(bank.active_count(), MAX_VOICES);
    }

    #[test]
    fn test_new_note_fully_initialised() {
        let mut bank = VoiceBank::new();
        let t = Tone {
            preset: SoundPreset::Pluck,
            waveform: Waveform::Sawtooth,
            envelope: Adsr::new(10, 20, 100, 30),
            echo_send: true,
        };
        bank.start_note(440, 250, 90, &t, SR);
        let v = &bank.voices()[0];
        assert!(v.is_active());
        assert!(v.echo_send());
        assert_eq!(v.base_volume(), 90);
        assert_eq!(v.waveform(), Waveform::Sawtooth);
        assert_eq!(v.oscillator().phase(), 0);
        assert_eq!(
            v.oscillator().phase_increment(),
            crate::oscillator::phase_increment(440, SR)
        );
        assert_eq!(v.envelope().phase(), AdsrPhase::Attack);
        assert_eq!(
            *v.envelope().rates(),
            EnvelopeRates::derive(&t.envelope, 250, SR)
        );
    }

    #[test]
    fn test_template_change_spares_sounding_notes() {
        let mut synth = synth();
        synth.play_note(440, 100, 255);
        let before = *synth.voices()[0].envelope().rates();
        synth.set_adsr(Adsr::new(500, 500, 10, 500));
        synth.set_waveform(Waveform::Square);
        assert_eq!(*synth.voices()[0].envelope().rates(), before);
        assert_eq!(synth.voices()[0].waveform(), Waveform::Sine);
    }

    #[test]
    fn test_zero_frequency_is_silent_but_completes() {
        let mut synth = synth();
        synth.play_note(0, 100, 255);
        let mut went_inactive = 0;
        let mut was_active = synth.voices()[0].is_active();
        for _ in 0..20_000 {
            assert_eq!(synth.next_sample(), CENTER);
            let active = synth.voices()[0].is_active();
            if was_active && !active {
                went_inactive += 1;
            }
            assert!(active || synth.voices()[0].envelope().level().raw() == 0);
            was_active = active;
        }
        assert_eq!(went_inactive, 1);
        assert!(!synth.is_playing());
        assert!(synth
            .output()
            .pins()
            .writes()
            .all(|w| w == (CENTER, 255 - CENTER)));
        assert_eq!(synth.output().pins().events.last(), Some(&PinEvent::Park));
    }

    #[test]
    fn test_disabled_echo_leaves_dry_mix_untouched() {
        let mut synth = synth();
        synth.set_sound_preset(SoundPreset::Pluck);
        assert!(synth.tone().echo_send);
        synth.play_note(440, 50, 255);
        synth.set_sound_preset(SoundPreset::SynthLead);
        synth.play_note(660, 50, 200);

        let mut reference = synth.voice_bank().clone();
        for _ in 0..8_000 {
            let (dry, _) = reference.render();
            let expected = (clip_i8(dry / 2) + CENTER as i32) as u8;
            assert_eq!(synth.next_sample(), expected);
        }
        assert_eq!(synth.echo().write_pos(), 0);
        assert!(synth.echo().buffer().iter().all(|&s| s == CENTER));
    }

    #[test]
    fn test_enabled_echo_records_send_and_keeps_output_live() {
        let mut synth = synth();
        synth.set_echo(EchoParams {
            enabled: true,
            delay_ms: 5,
            feedback: 100,
            mix: 200,
        });
        synth.set_sound_preset(SoundPreset::Pluck);
        synth.play_note(440, 10, 255);
        for _ in 0..2_000 {
            synth.next_sample();
        }
        assert!(synth.echo().buffer().iter().any(|&s| s != CENTER));

        for _ in 0..20_000 {
            synth.next_sample();
        }
        assert!(!synth.is_playing());
        // Echo still enabled, so the output stays up
        assert!(synth.output().is_live());
    }

    #[test]
    fn test_idle_output_parks_and_wakes() {
        let mut synth = synth();
        synth.next_sample();
        assert!(!synth.output().is_live());
        synth.play_note(440, 10, 255);
        synth.next_sample();
        assert!(synth.output().is_live());
        synth.stop_note();
        assert!(!synth.is_playing());
        assert!(!synth.output().is_live());
        assert_eq!(synth.output().pins().events.last(), Some(&PinEvent::Park));
    }

    #[test]
    fn test_preset_id_is_checked() {
        let mut synth = synth();
        assert_eq!(
            synth.set_sound_preset_id(99),
            Err(SynthError::UnknownPreset(99))
        );
        assert_eq!(synth.current_preset(), SoundPreset::Default);
        synth.set_sound_preset_id(SoundPreset::Organ as u8).unwrap();
        assert_eq!(synth.current_preset(), SoundPreset::Organ);
        assert_eq!(synth.tone().waveform, Waveform::Square);
    }

    #[test]
    fn test_song_control_needs_sequencer() {
        let mut synth = synth();
        assert_eq!(
            synth.play_song(&crate::songs::INTRO),
            Err(SynthError::NoSequencer)
        );
        assert_eq!(synth.set_tempo(100), Err(SynthError::NoSequencer));
        assert!(!synth.song_playing());
    }

    #[test]
    fn test_song_drives_voices() {
        let mut synth = synth();
        assert!(synth.attach_sequencer(Sequencer::default()).is_none());
        synth.play_song(&crate::songs::SUCCESS).unwrap();
        assert!(synth.song_playing());

        synth.next_sample();
        assert_eq!(synth.active_voice_count(), 1);
        assert_eq!(synth.current_preset(), SoundPreset::SynthLead);
        assert_eq!(synth.voices()[0].frequency(), crate::notes::C5);

        synth.stop_song().unwrap();
        assert!(!synth.song_playing());
        assert!(!synth.is_playing());
    }

    #[test]
    fn test_cue_sets_tone() {
        let mut synth = synth();
        synth.play_cue(Cue::Error);
        let spec = Cue::Error.spec();
        assert_eq!(synth.tone().waveform, spec.waveform);
        assert_eq!(synth.tone().envelope, spec.envelope);
        let v = &synth.voices()[0];
        assert_eq!(v.frequency(), spec.pitch);
        assert_eq!(v.base_volume(), spec.volume);
    }

    #[test]
    fn test_mix_headroom() {
        // Four full-scale square waves in phase clip instead of wrapping
        let mut synth = synth();
        synth.set_adsr(Adsr::new(0, 0, 255, 0));
        synth.set_waveform(Waveform::Square);
        for _ in 0..MAX_VOICES {
            synth.play_note(100, 100, 255);
        }
        let mut seen = [false; 2];
        for _ in 0..2_000 {
            let s = synth.next_sample();
            assert!(s == 0 || s == 255 || s == CENTER, "sample {s}");
            seen[0] |= s == 255;
            seen[1] |= s == 0;
        }
        assert_eq!(seen, [true, true]);
    }
}
