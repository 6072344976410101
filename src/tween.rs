//! Tween - Modulus-aware interpolation of named numeric channels
//!
//! A [`ModularTween`] eases a set of named channels (e.g. `left`, `top`,
//! `rotation`) from their live values toward new targets. Every channel has
//! its own modulus and always travels the shorter way around it:
//!
//! ```text
//! modulus 360, current 350, requested 10
//!   d = (10 - 350) mod 360 = 20   < 180  → target 370   (+20°, not -340°)
//! modulus 13,  current 0,   requested 12
//!   d = (12 - 0)   mod 13  = 12  >= 6.5 → target -1    (one step back)
//! ```
//!
//! When an animation finishes, every channel is folded back into
//! `[0, modulus)`.
//!
//! ## Scheduling
//!
//! Tweens are owned by an [`AnimationScheduler`], which keeps the set of
//! in-flight handles. The external render loop calls
//! [`AnimationScheduler::frame`] once per frame with a monotonic timestamp;
//! each in-flight tween is advanced in handle order and its interpolated
//! values are handed to the caller's [`FrameSink`]. Finished tweens drop out
//! of the in-flight set until their next [`AnimationScheduler::update`].
//!
//! Re-targeting a tween that is still moving restarts it from its current
//! interpolated values, so there is never a visual jump.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use crate::error::{FungeError, Result};

/// A set of named channel values
pub type Snapshot = BTreeMap<String, f64>;

/// Identifies a tween bound to an [`AnimationScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(u32);

impl fmt::Display for TweenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tween#{}", self.0)
    }
}

/// One animated channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub start: f64,
    pub current: f64,
    pub target: f64,
    pub modulus: f64,
}

impl Channel {
    /// Point `target` at `requested` along the shorter arc from `start`
    fn aim(&mut self, requested: f64) {
        let m = self.modulus;
        let mut d = (requested - self.start).rem_euclid(m);
        if d >= m / 2.0 {
            d -= m;
        }
        self.target = self.start + d;
    }

    fn settle(&mut self) {
        self.target = self.target.rem_euclid(self.modulus);
        self.current = self.target;
    }
}

/// Result of advancing a tween by one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub values: Snapshot,
    pub finished: bool,
}

/// Interpolates named channels toward targets under per-channel moduli
#[derive(Debug, Clone)]
pub struct ModularTween {
    channels: BTreeMap<String, Channel>,
    started_at: Option<Duration>,
    duration: Duration,
    in_flight: bool,
}

impl ModularTween {
    /// Bind channels to initial values. Every channel needs a finite,
    /// positive modulus.
    pub fn new(initial: &Snapshot, moduli: &Snapshot) -> Result<Self> {
        let mut channels = BTreeMap::new();
        for (name, &value) in initial {
            let modulus = *moduli
                .get(name)
                .ok_or_else(|| FungeError::MissingChannel(name.clone()))?;
            if !modulus.is_finite() || modulus <= 0.0 {
                return Err(FungeError::InvalidModulus {
                    channel: name.clone(),
                    modulus,
                });
            }
            if !value.is_finite() {
                return Err(FungeError::InvalidValue {
                    channel: name.clone(),
                    value,
                });
            }
            channels.insert(
                name.clone(),
                Channel {
                    start: value,
                    current: value,
                    target: value,
                    modulus,
                },
            );
        }
        Ok(Self {
            channels,
            started_at: None,
            duration: Duration::ZERO,
            in_flight: false,
        })
    }

    /// Start a new animation toward `targets` lasting `duration`.
    ///
    /// Restarts from the live interpolated values. The clock starts at the
    /// next [`advance`](Self::advance). Nothing is modified on error.
    pub fn retarget(&mut self, duration: Duration, targets: &Snapshot) -> Result<()> {
        if duration.is_zero() {
            return Err(FungeError::NonPositiveDuration(duration));
        }
        if let Some(missing) = self.channels.keys().find(|n| !targets.contains_key(*n)) {
            return Err(FungeError::MissingChannel(missing.clone()));
        }
        for name in self.channels.keys() {
            let value = targets[name];
            if !value.is_finite() {
                return Err(FungeError::InvalidValue {
                    channel: name.clone(),
                    value,
                });
            }
        }

        for (name, channel) in self.channels.iter_mut() {
            channel.start = channel.current;
            channel.aim(targets[name]);
        }
        self.started_at = None;
        self.duration = duration;
        self.in_flight = true;
        Ok(())
    }

    /// Advance to timestamp `now`. Returns None when idle.
    pub fn advance(&mut self, now: Duration) -> Option<Advance> {
        if !self.in_flight {
            return None;
        }
        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(started_at);
        let frac = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);

        let mut values = Snapshot::new();
        for (name, channel) in self.channels.iter_mut() {
            channel.current = channel.start + frac * (channel.target - channel.start);
            values.insert(name.clone(), channel.current);
        }

        let finished = frac >= 1.0;
        if finished {
            for channel in self.channels.values_mut() {
                channel.settle();
            }
            self.in_flight = false;
        }
        Some(Advance { values, finished })
    }

    /// Lazily advance over a sequence of frame timestamps.
    ///
    /// Yields one snapshot per timestamp up to and including the frame that
    /// completes the animation, then stops.
    pub fn frames<I>(&mut self, times: I) -> Frames<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Duration>,
    {
        Frames {
            tween: self,
            times: times.into_iter(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Live values of every channel
    pub fn values(&self) -> Snapshot {
        self.channels
            .iter()
            .map(|(name, c)| (name.clone(), c.current))
            .collect()
    }
}

/// Iterator returned by [`ModularTween::frames`]
pub struct Frames<'a, I> {
    tween: &'a mut ModularTween,
    times: I,
}

impl<I: Iterator<Item = Duration>> Iterator for Frames<'_, I> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        let now = self.times.next()?;
        self.tween.advance(now).map(|a| a.values)
    }
}

/// Receives interpolated values each frame
pub trait FrameSink {
    fn render(&mut self, handle: TweenHandle, values: &Snapshot);
}

impl<F: FnMut(TweenHandle, &Snapshot)> FrameSink for F {
    fn render(&mut self, handle: TweenHandle, values: &Snapshot) {
        self(handle, values)
    }
}

/// Owns every bound tween and the set currently animating
#[derive(Debug, Default)]
pub struct AnimationScheduler {
    tweens: BTreeMap<TweenHandle, ModularTween>,
    in_flight: BTreeSet<TweenHandle>,
    next_handle: u32,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new tween with the given initial values and moduli
    pub fn bind(&mut self, initial: &Snapshot, moduli: &Snapshot) -> Result<TweenHandle> {
        let tween = ModularTween::new(initial, moduli)?;
        let handle = TweenHandle(self.next_handle);
        self.next_handle += 1;
        self.tweens.insert(handle, tween);
        Ok(handle)
    }

    /// Drop a tween entirely
    pub fn unbind(&mut self, handle: TweenHandle) -> Option<ModularTween> {
        self.in_flight.remove(&handle);
        self.tweens.remove(&handle)
    }

    /// Retarget `handle` and register it for frames. Registering an
    /// already in-flight handle supersedes its animation; it is never
    /// registered twice.
    pub fn update(
        &mut self,
        handle: TweenHandle,
        duration: Duration,
        targets: &Snapshot,
    ) -> Result<()> {
        let tween = self
            .tweens
            .get_mut(&handle)
            .ok_or(FungeError::UnknownTween(handle.0))?;
        tween.retarget(duration, targets)?;
        self.in_flight.insert(handle);
        Ok(())
    }

    /// Advance every in-flight tween to `now`, in handle order.
    ///
    /// Returns the number of tweens rendered this frame.
    pub fn frame(&mut self, now: Duration, sink: &mut dyn FrameSink) -> usize {
        let mut rendered = 0;
        let mut finished = Vec::new();

        for &handle in &self.in_flight {
            let Some(tween) = self.tweens.get_mut(&handle) else {
                finished.push(handle);
                continue;
            };
            match tween.advance(now) {
                Some(step) => {
                    sink.render(handle, &step.values);
                    rendered += 1;
                    if step.finished {
                        finished.push(handle);
                    }
                }
                None => finished.push(handle),
            }
        }

        for handle in finished {
            self.in_flight.remove(&handle);
        }
        rendered
    }

    pub fn is_in_flight(&self, handle: TweenHandle) -> bool {
        self.in_flight.contains(&handle)
    }

    /// True while any tween still needs frames
    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn tween(&self, handle: TweenHandle) -> Option<&ModularTween> {
        self.tweens.get(&handle)
    }

    pub fn values(&self, handle: TweenHandle) -> Option<Snapshot> {
        self.tweens.get(&handle).map(ModularTween::values)
    }
}
