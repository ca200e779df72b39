use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use weighid_traits::clock::MonotonicClock;
use weighid_traits::{CalibrationStore, Scale};

use crate::calibration::SLOTS;
use crate::detector::ObjectDetector;
use crate::error::{DetectorError, Result};
use crate::hw_error::map_hw_error;
use crate::sampler::{Sample, Sampler};
use crate::status::Outcome;

/// How readings reach the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Read inside the classification loop using `Scale::read(timeout)`.
    Direct,
    /// Background thread blocking on the sensor's own data-ready timing.
    Event,
    /// Background thread sampling at the given rate in Hz.
    Paced(u32),
}

/// Parameters for a classification run.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub mode: SamplingMode,
    /// Max sensor wait per read.
    pub sensor_timeout: Duration,
    /// Stop after this many readings.
    pub max_samples: Option<u64>,
    /// Stop as soon as this flag is set.
    pub shutdown: Option<Arc<AtomicBool>>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            mode: SamplingMode::Direct,
            sensor_timeout: Duration::from_millis(150),
            max_samples: None,
            shutdown: None,
        }
    }
}

/// One reading and what the detector made of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Zero-based index of the reading within the run.
    pub sample: u64,
    pub value: f32,
    pub outcome: Outcome,
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub samples: u64,
    /// Confirmed detections per slot.
    pub confirmations: [u64; SLOTS],
    pub no_object: u64,
    pub no_match: u64,
}

impl MonitorSummary {
    pub fn total_confirmations(&self) -> u64 {
        self.confirmations.iter().sum()
    }
}

/// Stall watchdog threshold in milliseconds.
///
/// Starts from 4x the sensor timeout and never drops below two sampling
/// periods, so a single missed reading does not trip it.
#[inline]
fn compute_stall_threshold_ms(sensor_timeout_ms: u64, period_ms: u64) -> u64 {
    fast_threshold_ms(sensor_timeout_ms)
        .max(two_periods_ms(period_ms))
        .max(1)
}

#[inline]
fn fast_threshold_ms(sensor_timeout_ms: u64) -> u64 {
    sensor_timeout_ms.saturating_mul(4)
}

#[inline]
fn two_periods_ms(period_ms: u64) -> u64 {
    period_ms.saturating_mul(2)
}

fn should_stop(params: &RunParams, summary: &MonitorSummary) -> bool {
    if let Some(flag) = &params.shutdown
        && flag.load(Ordering::Relaxed)
    {
        tracing::info!(samples = summary.samples, "shutdown requested");
        return true;
    }
    params.max_samples.is_some_and(|max| summary.samples >= max)
}

fn feed<D, F>(
    detector: &mut ObjectDetector<D>,
    summary: &mut MonitorSummary,
    value: f32,
    on_event: &mut F,
) where
    D: CalibrationStore,
    F: FnMut(&Event),
{
    let outcome = detector.process(value);
    let sample = summary.samples;
    summary.samples += 1;
    match outcome {
        Outcome::Object(slot) => {
            if let Some(c) = summary.confirmations.get_mut(slot) {
                *c += 1;
            }
            tracing::info!(sample, slot, value, "object detected");
        }
        Outcome::NoObject => summary.no_object += 1,
        Outcome::NoMatch => summary.no_match += 1,
        Outcome::NoChange => {}
    }
    on_event(&Event {
        sample,
        value,
        outcome,
    });
}

/// Feed readings from `scale` into `detector` until the scale is exhausted,
/// `max_samples` is reached, or `shutdown` is set.
///
/// `on_event` sees every reading, including `NoChange` ones.
pub fn run<D, S, F>(
    detector: &mut ObjectDetector<D>,
    scale: S,
    params: &RunParams,
    mut on_event: F,
) -> Result<MonitorSummary>
where
    D: CalibrationStore,
    S: Scale + Send + 'static,
    F: FnMut(&Event),
{
    if !detector.is_calibrated() {
        tracing::warn!("detector is not calibrated; every reading will report no change");
    }
    tracing::info!(mode = ?params.mode, max_samples = ?params.max_samples, "classification run start");

    let summary = match params.mode {
        SamplingMode::Direct => run_direct(detector, scale, params, &mut on_event)?,
        SamplingMode::Event | SamplingMode::Paced(_) => {
            run_with_sampler(detector, scale, params, &mut on_event)?
        }
    };

    tracing::info!(
        samples = summary.samples,
        confirmations = summary.total_confirmations(),
        "classification run finished"
    );
    Ok(summary)
}

fn run_direct<D, S, F>(
    detector: &mut ObjectDetector<D>,
    mut scale: S,
    params: &RunParams,
    on_event: &mut F,
) -> Result<MonitorSummary>
where
    D: CalibrationStore,
    S: Scale,
    F: FnMut(&Event),
{
    let mut summary = MonitorSummary::default();
    while !should_stop(params, &summary) {
        match scale.read(params.sensor_timeout) {
            Ok(v) => feed(detector, &mut summary, v, on_event),
            Err(e) => match map_hw_error(&*e) {
                DetectorError::EndOfStream => break,
                other => {
                    tracing::error!(error = %other, samples = summary.samples, "scale read failed");
                    return Err(eyre::Report::new(other).wrap_err("reading scale"));
                }
            },
        }
    }
    Ok(summary)
}

fn run_with_sampler<D, S, F>(
    detector: &mut ObjectDetector<D>,
    scale: S,
    params: &RunParams,
    on_event: &mut F,
) -> Result<MonitorSummary>
where
    D: CalibrationStore,
    S: Scale + Send + 'static,
    F: FnMut(&Event),
{
    let clock = MonotonicClock::new();
    let sensor_ms = u64::try_from(params.sensor_timeout.as_millis())
        .unwrap_or(u64::MAX)
        .max(1);
    let (sampler, period_ms) = match params.mode {
        SamplingMode::Paced(hz) => (
            Sampler::spawn(scale, hz, params.sensor_timeout, clock),
            crate::util::period_ms(hz),
        ),
        _ => (
            Sampler::spawn_event(scale, params.sensor_timeout, clock),
            sensor_ms,
        ),
    };
    let threshold_ms = compute_stall_threshold_ms(sensor_ms, period_ms);
    let wait = Duration::from_millis(period_ms.min(threshold_ms));

    let mut summary = MonitorSummary::default();
    while !should_stop(params, &summary) {
        match sampler.next(wait) {
            Sample::Value(v) => feed(detector, &mut summary, v, on_event),
            Sample::Pending => {
                let stalled = sampler.stalled_for(&clock);
                if stalled > threshold_ms {
                    tracing::error!(stalled_ms = stalled, threshold_ms, "sensor stalled");
                    return Err(eyre::Report::new(DetectorError::Timeout)
                        .wrap_err(format!("no reading for {stalled} ms")));
                }
            }
            Sample::Closed => break,
        }
    }
    Ok(summary)
}
