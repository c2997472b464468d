//! Playback state machine
//!
//! Tracks elapsed wall-clock time for one instance. Pausing freezes the
//! reported time and resuming shifts the playback origin forward by the
//! paused span, so elapsed time continues without a jump.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

/// Playback state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Elapsed-time tracker with play/pause/stop transitions
#[derive(Debug, Clone)]
pub struct PlaybackManager<C: Clock = SystemClock> {
    clock: C,
    state: PlaybackState,
    looped: bool,
    /// Clock reading, in seconds, that corresponds to elapsed time zero
    origin: f64,
    /// Clock reading frozen by the last pause
    paused_at: f64,
}

impl Default for PlaybackManager<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock::new())
    }
}

impl<C: Clock> PlaybackManager<C> {
    /// Create a stopped manager reading time from `clock`
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: PlaybackState::Stopped,
            looped: false,
            origin: 0.0,
            paused_at: 0.0,
        }
    }

    fn now(&self) -> f64 {
        self.clock.now().as_secs_f64()
    }

    /// Start or resume playback and return the state we came from.
    ///
    /// From `Stopped` the origin resets to now. From `Paused` it moves
    /// forward by the paused span. From `Playing` only the loop flag
    /// changes.
    pub fn play(&mut self, looped: bool) -> PlaybackState {
        let previous = self.state;
        let now = self.now();
        match previous {
            PlaybackState::Stopped => self.origin = now,
            PlaybackState::Paused => self.origin += now - self.paused_at,
            PlaybackState::Playing => {}
        }
        self.looped = looped;
        self.state = PlaybackState::Playing;
        if previous != PlaybackState::Playing {
            log::debug!("Playback {:?} -> Playing (loop: {})", previous, looped);
        }
        previous
    }

    /// Freeze playback. Only has an effect while playing.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.paused_at = self.now();
            self.state = PlaybackState::Paused;
            log::debug!("Playback paused at {:.3}s", self.paused_at - self.origin);
        }
    }

    /// Stop playback, clearing elapsed time and the loop flag
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Stopped {
            log::debug!("Playback {:?} -> Stopped", self.state);
        }
        self.state = PlaybackState::Stopped;
        self.looped = false;
        self.origin = 0.0;
        self.paused_at = 0.0;
    }

    /// Seconds of playback so far; frozen while paused, zero while stopped
    pub fn current_time(&self) -> f64 {
        match self.state {
            PlaybackState::Stopped => 0.0,
            PlaybackState::Playing => self.now() - self.origin,
            PlaybackState::Paused => self.paused_at - self.origin,
        }
    }

    /// Re-anchor the origin so that [`current_time`](Self::current_time)
    /// reports `elapsed`. Ignored while stopped.
    pub fn seek(&mut self, elapsed: f64) {
        match self.state {
            PlaybackState::Stopped => {}
            PlaybackState::Playing => self.origin = self.now() - elapsed,
            PlaybackState::Paused => self.origin = self.paused_at - elapsed,
        }
    }

    /// Enter `state` directly with `elapsed` seconds already played
    pub fn restore(&mut self, state: PlaybackState, looped: bool, elapsed: f64) {
        let now = self.now();
        self.state = state;
        match state {
            PlaybackState::Stopped => {
                self.stop();
                return;
            }
            PlaybackState::Playing => {}
            PlaybackState::Paused => self.paused_at = now,
        }
        self.origin = now - elapsed;
        self.looped = looped;
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Whether playback is frozen
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    /// Whether playback is stopped
    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    /// Whether the clip wraps around at its end
    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Time source
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
