//! Piecewise-constant rate schedules and the inhomogeneous next-event scheduler.
//!
//! The scheduler samples the next jump of a continuous-time Markov process by inversion: one
//! unit-exponential hazard target is drawn and then consumed segment by segment, each segment
//! contributing `Λ_k · Δt_k`. The event falls inside the segment that exhausts the target and the
//! channel is picked by roulette over the rates valid at that instant.
use rand::distributions::{
    Distribution,
    WeightedIndex,
};
use rand::Rng;
use rand_distr::Exp1;
use tn_core::{
    Result,
    TemporalNetworkError,
};
use tracing::{
    instrument,
    trace,
};

/// Piecewise-constant rate vectors. Segment `k` covers `[times[k], times[k + 1])`, the last one
/// ends at the horizon.
#[derive(Clone, Debug, PartialEq)]
pub struct RateSchedule {
    times: Vec<f64>,
    rates: Vec<Vec<f64>>,
    horizon: f64,
    repeat: bool,
}

impl RateSchedule {
    /// Schedule from breakpoints and the rate vector valid from each breakpoint on.
    ///
    /// Breakpoints must be strictly increasing and finite, the horizon must lie after the last
    /// breakpoint, every rate vector must have the same number of channels and every rate must be
    /// finite and non-negative.
    pub fn new(times: Vec<f64>, rates: Vec<Vec<f64>>, horizon: f64) -> Result<Self> {
        if times.is_empty() {
            return Err(TemporalNetworkError::configuration("rate schedule has no breakpoints"));
        }
        if times.len() != rates.len() {
            return Err(TemporalNetworkError::configuration(format!(
                "rate schedule has {} breakpoints but {} rate vectors",
                times.len(),
                rates.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) || times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TemporalNetworkError::configuration(
                "rate schedule breakpoints must be finite and strictly increasing",
            ));
        }
        let last = times[times.len() - 1];
        if horizon.is_nan() || horizon <= last {
            return Err(TemporalNetworkError::configuration(format!(
                "rate schedule horizon {horizon} must lie after the last breakpoint {last}"
            )));
        }
        let channels = rates[0].len();
        if let Some(k) = rates.iter().position(|r| r.len() != channels) {
            return Err(TemporalNetworkError::configuration(format!(
                "rate vector {k} has {} channels, expected {channels}",
                rates[k].len()
            )));
        }
        if rates.iter().flatten().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(TemporalNetworkError::configuration("rates must be finite and non-negative"));
        }
        Ok(Self { times, rates, horizon, repeat: false })
    }

    /// One rate vector valid on `[start, horizon)`.
    pub fn constant(rates: Vec<f64>, start: f64, horizon: f64) -> Result<Self> {
        Self::new(vec![start], vec![rates], horizon)
    }

    /// A schedule without channels that never ends. Used when all rates are state dependent.
    #[must_use]
    pub fn empty(start: f64) -> Self {
        Self { times: vec![start], rates: vec![vec![]], horizon: f64::INFINITY, repeat: false }
    }

    /// Replay the schedule with period `horizon - start` instead of ending at the horizon.
    pub fn repeating(mut self, repeat: bool) -> Result<Self> {
        if repeat && !self.horizon.is_finite() {
            return Err(TemporalNetworkError::configuration("an unbounded rate schedule cannot repeat"));
        }
        self.repeat = repeat;
        Ok(self)
    }

    /// Number of scheduled channels.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.rates[0].len()
    }

    /// First breakpoint.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.times[0]
    }

    /// End of the last segment.
    #[must_use]
    pub const fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Whether the schedule is replayed after the horizon.
    #[must_use]
    pub const fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// Breakpoints and their rate vectors.
    pub fn segments(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.times.iter().copied().zip(self.rates.iter().map(Vec::as_slice))
    }

    /// Rates valid at `t`, or `None` outside of the schedule.
    #[must_use]
    pub fn rates_at(&self, t: f64) -> Option<&[f64]> {
        let cursor = self.locate(t)?;
        Some(&self.rates[cursor.segment])
    }

    /// Whether every scheduled rate is zero.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.rates.iter().flatten().all(|r| *r == 0.0)
    }

    fn period(&self) -> f64 {
        self.horizon - self.start()
    }

    fn offset(&self, cycle: u64) -> f64 {
        // the period is infinite for unbounded schedules, which only ever see cycle 0
        if cycle == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let cycles = cycle as f64;
        cycles * self.period()
    }

    fn bounds(&self, cursor: Cursor) -> (f64, f64) {
        let offset = self.offset(cursor.cycle);
        let end = self.times.get(cursor.segment + 1).copied().unwrap_or(self.horizon);
        (offset + self.times[cursor.segment], offset + end)
    }

    fn advance(&self, cursor: Cursor) -> Option<Cursor> {
        if cursor.segment + 1 < self.times.len() {
            Some(Cursor { cycle: cursor.cycle, segment: cursor.segment + 1 })
        } else if self.repeat {
            Some(Cursor { cycle: cursor.cycle + 1, segment: 0 })
        } else {
            None
        }
    }

    fn locate(&self, t: f64) -> Option<Cursor> {
        if t < self.start() || t.is_nan() {
            return None;
        }
        let (cycle, local) = if self.repeat {
            let period = self.period();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cycle = ((t - self.start()) / period).floor() as u64;
            (cycle, t - self.offset(cycle))
        } else if t >= self.horizon {
            return None;
        } else {
            (0, t)
        };
        let segment = self.times.partition_point(|&b| b <= local).saturating_sub(1);
        Some(Cursor { cycle, segment })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cursor {
    cycle: u64,
    segment: usize,
}

/// Time and channel of a sampled event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    /// Event time.
    pub time: f64,
    /// Channel index into `state_rates ++ schedule_rates`.
    pub channel: usize,
}

/// Next-event sampler over a [`RateSchedule`] plus state-dependent rates.
#[derive(Clone, Debug)]
pub struct Scheduler {
    schedule: RateSchedule,
    cursor: Option<Cursor>,
}

impl Scheduler {
    /// Scheduler over a fixed rate schedule.
    #[must_use]
    pub const fn new(schedule: RateSchedule) -> Self {
        Self { schedule, cursor: None }
    }

    /// Scheduler whose channels are all state dependent, starting at `t0`.
    #[must_use]
    pub fn state_only(t0: f64) -> Self {
        Self::new(RateSchedule::empty(t0))
    }

    /// The schedule being sampled.
    #[must_use]
    pub const fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    /// Draw the next event after `t` and no later than `until`.
    ///
    /// `state_rates` are the process's own rates, constant until the next event; they are
    /// channels `0..state_rates.len()`, followed by the scheduled channels. Returns `Ok(None)`
    /// when no event happens before `until` or the end of a non-repeating schedule. Segments with
    /// zero total rate consume no randomness.
    #[instrument(level = "trace", skip(self, state_rates, rng))]
    pub fn next_event<R: Rng + ?Sized>(
        &mut self,
        t: f64,
        state_rates: &[f64],
        until: f64,
        rng: &mut R,
    ) -> Result<Option<ScheduledEvent>> {
        if state_rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(TemporalNetworkError::invariant(format!(
                "process supplied invalid rates {state_rates:?}"
            )));
        }
        let state_total: f64 = state_rates.iter().sum();
        if state_total == 0.0 && self.schedule.is_silent() {
            return Ok(None);
        }
        if t >= until {
            return Ok(None);
        }

        let Some(mut cursor) = self.seek(t) else {
            if t < self.schedule.start() {
                return Err(TemporalNetworkError::configuration(format!(
                    "time {t} precedes the rate schedule start {}",
                    self.schedule.start()
                )));
            }
            return Ok(None);
        };

        let mut now = t;
        let mut hazard: Option<f64> = None;
        loop {
            let (_, segment_end) = self.schedule.bounds(cursor);
            let end = segment_end.min(until);
            let rates = &self.schedule.rates[cursor.segment];
            let total = state_total + rates.iter().sum::<f64>();

            if total > 0.0 && end > now {
                let target = *hazard.get_or_insert_with(|| Exp1.sample(rng));
                let mass = total * (end - now);
                if mass >= target {
                    let time = (now + target / total).min(end);
                    let channel = select_channel(state_rates, rates, rng)?;
                    trace!(time, channel, "sampled event");
                    self.cursor = Some(cursor);
                    return Ok(Some(ScheduledEvent { time, channel }));
                }
                hazard = Some(target - mass);
            }

            if end >= until {
                self.cursor = Some(cursor);
                return Ok(None);
            }
            now = end;
            match self.schedule.advance(cursor) {
                Some(next) => cursor = next,
                None => {
                    self.cursor = None;
                    return Ok(None);
                },
            }
        }
    }

    /// Cursor of the segment containing `t`, moving forward from the last position when possible.
    fn seek(&mut self, t: f64) -> Option<Cursor> {
        let mut cursor = match self.cursor {
            Some(c) if self.schedule.bounds(c).0 <= t => c,
            _ => self.schedule.locate(t)?,
        };
        while self.schedule.bounds(cursor).1 <= t {
            cursor = self.schedule.advance(cursor)?;
        }
        self.cursor = Some(cursor);
        Some(cursor)
    }
}

fn select_channel<R: Rng + ?Sized>(state_rates: &[f64], schedule_rates: &[f64], rng: &mut R) -> Result<usize> {
    let weights = WeightedIndex::new(state_rates.iter().chain(schedule_rates))
        .map_err(|err| TemporalNetworkError::invariant(format!("channel selection failed: {err}")))?;
    Ok(weights.sample(rng))
}

#[cfg(test)]
mod tests;
