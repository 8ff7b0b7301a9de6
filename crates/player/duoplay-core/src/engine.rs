//! SyncEngine: owns both transports and keeps them in lockstep.
//!
//! Methods:
//! - UI commands: play, pause, seek, set_volume, set_playback_rate, apply_sources
//! - transport feedback: handle_event (echo disambiguation → intent → seek/volume/rate logic)
//! - observation: is_playing, time, volume, seek_phase, drain_events

use log::{debug, info, warn};

use crate::config::{Config, DEFAULT_DRIFT_TOLERANCE};
use crate::content::MediaContent;
use crate::outputs::{EngineEvent, TimeSnapshot};
use crate::seek::SeekPhase;
use crate::sources::SourceTriple;
use crate::suppression::{EchoKind, Suppression};
use crate::transport::{Role, TextTrackMode, Transport, TransportEvent};

/// Synchronization engine for one primary (video) and one secondary (audio) transport.
///
/// All state lives here: the playback intent, the per-role echo suppression flags, the
/// last-applied sources and the seek phase. Hosts call the command methods for user
/// actions and forward every transport notification to [`SyncEngine::handle_event`], one
/// at a time, in arrival order.
#[derive(Debug)]
pub struct SyncEngine<P: Transport, S: Transport> {
    cfg: Config,
    primary: P,
    secondary: S,

    wants_to_play: bool,
    suppression: Suppression,
    sources: SourceTriple,
    seek: SeekPhase,
    volume: f64,
    time: TimeSnapshot,

    events: Vec<EngineEvent>,
}

impl<P: Transport, S: Transport> SyncEngine<P, S> {
    pub fn new(cfg: Config, mut primary: P, mut secondary: S) -> Self {
        let volume = cfg.initial_volume.clamp(0.0, 1.0);
        if !primary.is_muted() {
            primary.set_volume(volume);
        }
        secondary.set_volume(volume);
        let time = TimeSnapshot::from_raw(primary.current_time(), primary.duration());

        Self {
            cfg,
            primary,
            secondary,
            wants_to_play: false,
            suppression: Suppression::new(),
            sources: SourceTriple::default(),
            seek: SeekPhase::Idle,
            volume,
            time,
            events: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Observation
    // ---------------------------------------------------------------------

    /// Whether the user wants playback running. Unlike either transport's `paused` flag,
    /// this does not flicker while buffering or seeking.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.wants_to_play
    }

    #[inline]
    pub fn time(&self) -> TimeSnapshot {
        self.time
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[inline]
    pub fn seek_phase(&self) -> SeekPhase {
        self.seek
    }

    #[inline]
    pub fn sources(&self) -> &SourceTriple {
        &self.sources
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn suppression(&self) -> &Suppression {
        &self.suppression
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut P {
        &mut self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    pub fn secondary_mut(&mut self) -> &mut S {
        &mut self.secondary
    }

    /// Events queued since the last drain.
    pub fn pending_events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------------
    // UI commands
    // ---------------------------------------------------------------------

    /// Request playback on both transports. Idempotent. A refused `play()` leaves the
    /// intent requested and queues [`EngineEvent::CommandRejected`].
    pub fn play(&mut self) {
        self.set_intent(true);
        self.command_play(Role::Primary);
        self.command_play(Role::Secondary);
    }

    /// Request both transports to pause. Idempotent.
    pub fn pause(&mut self) {
        self.set_intent(false);
        self.command_pause(Role::Primary);
        self.command_pause(Role::Secondary);
    }

    /// Seek the pair to `seconds`. The primary clamps the target; its `seeking` event
    /// carries the position over to the secondary. A seek issued while another is still
    /// settling replaces its target.
    pub fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            warn!("ignoring seek to non-finite time {seconds}");
            return;
        }

        debug!("seek to {seconds:.3}s (was {})", self.seek.name());
        self.primary.set_current_time(seconds);
        self.seek = if self.primary.is_seeking() {
            SeekPhase::PrimarySeeking { target: seconds }
        } else {
            // Nothing loaded: the primary completed the write without seeking.
            SeekPhase::Idle
        };
        self.publish_time();
    }

    /// Set the logical volume, clamped to `[0, 1]`. The secondary always follows; the
    /// primary only while it is not muted.
    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            warn!("ignoring non-finite volume {volume}");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);

        if !self.primary.is_muted() {
            self.primary.set_volume(volume);
        }
        self.secondary.set_volume(volume);

        if self.volume != volume {
            self.volume = volume;
            self.events.push(EngineEvent::VolumeChanged { volume });
        }
    }

    /// Change the primary's playback rate; the secondary follows on `ratechange`.
    pub fn set_playback_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            warn!("ignoring playback rate {rate}");
            return;
        }
        self.primary.set_playback_rate(rate);
    }

    /// Bind a new (video, audio, subtitles) selection.
    ///
    /// Only transports whose source identity changed are reloaded. Subtitle changes switch
    /// text track modes on the primary without reloading it. When a transport reloads, the
    /// position captured just before the reload is restored with a seek.
    pub fn apply_sources(
        &mut self,
        video: Option<&MediaContent>,
        audio: Option<&MediaContent>,
        subtitles: Option<&MediaContent>,
    ) {
        let reloaded = self.sources.diff(video, audio, subtitles);
        let resume_at = self.primary.current_time();
        self.sources.replace(video, audio, subtitles);

        if reloaded.video {
            info!("reloading primary: {}", label_of(video));
            self.suppression.clear_role(Role::Primary);
            self.primary.load(video);
        }
        if reloaded.audio {
            info!("reloading secondary: {}", label_of(audio));
            self.suppression.clear_role(Role::Secondary);
            self.secondary.load(audio);
        }

        if self.cfg.mute_primary_with_secondary {
            self.sync_primary_mute(audio.is_some());
        }

        if reloaded.subtitles || reloaded.video {
            self.show_subtitles(subtitles.map(|s| s.name.as_str()));
        }

        if reloaded.any_transport() {
            self.seek(resume_at);
        }

        if !reloaded.is_empty() {
            self.events.push(EngineEvent::SourcesApplied { reloaded });
        }
    }

    // ---------------------------------------------------------------------
    // Transport feedback
    // ---------------------------------------------------------------------

    /// Feed one transport notification into the engine.
    pub fn handle_event(&mut self, role: Role, event: TransportEvent) {
        match event {
            TransportEvent::Play => self.on_play(role),
            TransportEvent::Pause => self.on_pause(role),
            TransportEvent::Seeking => self.on_seeking(role),
            TransportEvent::Seeked => self.on_seeked(role),
            TransportEvent::RateChange => self.on_rate_change(role),
            TransportEvent::TimeUpdate => self.on_time_update(role),
            TransportEvent::DurationChange => {
                if role == Role::Primary {
                    self.publish_time();
                }
            }
            TransportEvent::PlayRejected { reason } => {
                self.suppression.disarm(role, EchoKind::Play);
                self.reject(role, reason);
            }
        }
    }

    fn on_play(&mut self, role: Role) {
        let other = role.other();

        if self.suppression.consume(role, EchoKind::Play) {
            debug!("play echo on {}", role.name());
        } else if self.transport(role).is_paused() {
            debug!("stale play on {} ignored", role.name());
            return;
        } else if !self.wants_to_play {
            info!("external play on {}", role.name());
            self.set_intent(true);
            self.command_play(other);
        }

        // Do not let one side run ahead while the other is still seeking.
        if self.transport(other).is_seeking() {
            self.command_pause(role);
        }
    }

    fn on_pause(&mut self, role: Role) {
        if self.suppression.consume(role, EchoKind::Pause) {
            debug!("pause echo on {}", role.name());
        } else if !self.transport(role).is_paused() {
            debug!("stale pause on {} ignored", role.name());
        } else if !self.transport(role).is_seeking() && self.wants_to_play {
            info!("external pause on {}", role.name());
            self.set_intent(false);
            self.command_pause(role.other());
        }
    }

    fn on_seeking(&mut self, role: Role) {
        match role {
            Role::Primary => {
                let target = self.primary.current_time();
                debug!("primary seeking to {target:.3}s; mirroring to secondary");
                self.secondary.set_current_time(target);
                self.seek = SeekPhase::Settling { target };
                self.publish_time();
            }
            Role::Secondary => {
                if !self.seek.is_idle() {
                    // Our own mirror write.
                    return;
                }
                let target = self.secondary.current_time();
                let drift = (target - self.primary.current_time()).abs();
                if drift > self.drift_threshold() {
                    info!("external seek on secondary to {target:.3}s");
                    self.seek(target);
                }
            }
        }
    }

    fn on_seeked(&mut self, role: Role) {
        let other = role.other();

        if !self.transport(role).is_paused() && self.transport(other).is_seeking() {
            debug!("{} finished seeking first; holding it", role.name());
            self.command_pause(role);
        }

        if role == Role::Primary {
            self.publish_time();
        }

        if self.transport(role).is_seeking() {
            // A newer seek superseded this one; wait for its completion.
            return;
        }

        if !self.transport(other).is_seeking() {
            debug!("seek settled");
            self.seek = SeekPhase::Idle;
            if self.wants_to_play {
                self.command_play(Role::Primary);
                self.command_play(Role::Secondary);
            }
        }
    }

    fn on_rate_change(&mut self, role: Role) {
        if role != Role::Primary {
            return;
        }
        let rate = self.primary.playback_rate();
        if self.cfg.mirror_playback_rate {
            self.secondary.set_playback_rate(rate);
        }
        self.events.push(EngineEvent::RateChanged { rate });
    }

    fn on_time_update(&mut self, role: Role) {
        if role != Role::Primary {
            return;
        }
        self.publish_time();
        self.correct_drift();
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn transport(&self, role: Role) -> &dyn Transport {
        match role {
            Role::Primary => &self.primary,
            Role::Secondary => &self.secondary,
        }
    }

    fn transport_mut(&mut self, role: Role) -> &mut dyn Transport {
        match role {
            Role::Primary => &mut self.primary,
            Role::Secondary => &mut self.secondary,
        }
    }

    /// Issue `play()` on `role` unless it already runs. A flag still armed by an earlier,
    /// unconfirmed play is left as is; that play's echo consumes it.
    fn command_play(&mut self, role: Role) {
        if !self.transport(role).is_paused() {
            return;
        }

        let armed_here = !self.suppression.is_armed(role, EchoKind::Play);
        if armed_here {
            self.suppression.arm(role, EchoKind::Play);
        } else {
            debug!("play on {} reissued before its echo", role.name());
        }
        if let Err(err) = self.transport_mut(role).play() {
            if armed_here {
                self.suppression.disarm(role, EchoKind::Play);
            }
            self.reject(role, err.to_string());
        }
    }

    /// Issue `pause()` on `role` unless it is already paused. Arms the pause flag only
    /// when it is not already armed.
    fn command_pause(&mut self, role: Role) {
        if self.transport(role).is_paused() {
            return;
        }

        if self.suppression.is_armed(role, EchoKind::Pause) {
            debug!("pause on {} reissued before its echo", role.name());
        } else {
            self.suppression.arm(role, EchoKind::Pause);
        }
        self.transport_mut(role).pause();
    }

    fn reject(&mut self, role: Role, reason: String) {
        warn!("play rejected on {}: {reason}", role.name());
        self.events.push(EngineEvent::CommandRejected { role, reason });
    }

    fn set_intent(&mut self, playing: bool) {
        if self.wants_to_play != playing {
            self.wants_to_play = playing;
            self.events.push(EngineEvent::PlayStateChanged { playing });
        }
    }

    fn publish_time(&mut self) {
        let snapshot = TimeSnapshot::from_raw(self.primary.current_time(), self.primary.duration());
        if snapshot != self.time {
            self.time = snapshot;
            self.events.push(EngineEvent::TimeChanged {
                current: snapshot.current,
                total: snapshot.total,
            });
        }
    }

    fn drift_threshold(&self) -> f64 {
        self.cfg.drift_tolerance.unwrap_or(DEFAULT_DRIFT_TOLERANCE)
    }

    /// Re-seat the secondary when its clock wandered too far from the primary's.
    fn correct_drift(&mut self) {
        let Some(tolerance) = self.cfg.drift_tolerance else {
            return;
        };
        let steady = self.seek.is_idle()
            && self.wants_to_play
            && self.sources.has_secondary_audio()
            && !self.primary.is_paused()
            && !self.secondary.is_paused()
            && !self.primary.is_seeking()
            && !self.secondary.is_seeking();
        if !steady {
            return;
        }

        let target = self.primary.current_time();
        let drift = (target - self.secondary.current_time()).abs();
        if drift > tolerance {
            debug!("secondary drifted {drift:.3}s; re-seating at {target:.3}s");
            self.secondary.set_current_time(target);
        }
    }

    fn sync_primary_mute(&mut self, secondary_bound: bool) {
        if self.primary.is_muted() == secondary_bound {
            return;
        }
        self.primary.set_muted(secondary_bound);
        if !secondary_bound {
            // Volume writes were skipped while muted.
            self.primary.set_volume(self.volume);
        }
    }

    /// Show the text track labelled `label` and hide any other showing track.
    fn show_subtitles(&mut self, label: Option<&str>) {
        for (index, track) in self.primary.text_tracks().into_iter().enumerate() {
            if label == Some(track.label.as_str()) {
                if track.mode != TextTrackMode::Showing {
                    self.primary.set_text_track_mode(index, TextTrackMode::Showing);
                }
            } else if track.mode == TextTrackMode::Showing {
                self.primary.set_text_track_mode(index, TextTrackMode::Hidden);
            }
        }
    }
}

fn label_of(content: Option<&MediaContent>) -> &str {
    content.map_or("<none>", |c| c.name.as_str())
}
