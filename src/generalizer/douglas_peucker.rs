//! Douglas-Peucker line simplification.
//!
//! A range of samples is replaced by the straight "tendency line" between its
//! endpoints unless some interior sample lies at least `tolerance_value` away from
//! that line. In that case the farthest sample is kept and both halves are
//! simplified the same way.
//!
//! Distances are measured in the plane spanned by timestamp (milliseconds) and
//! value, so with typical sampling intervals the tolerance is effectively a cutoff
//! on vertical deviation.
//!
//! No-data samples have no position in that plane. They are never candidates for
//! the farthest sample; instead each one is kept as a split point and the runs of
//! valid samples between them are simplified independently. Gaps therefore
//! survive generalization.

use super::Generalizer;
use crate::config::DouglasPeuckerConfig;
use crate::error::GeneralizerError;
use crate::precision::Precision;
use crate::sample::Sample;
use crate::series::Series;

/// Douglas-Peucker generalizer.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeucker {
    config: DouglasPeuckerConfig,
}

impl DouglasPeucker {
    /// Creates a generalizer with the given configuration.
    pub fn new(config: DouglasPeuckerConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DouglasPeuckerConfig {
        &self.config
    }
}

impl Generalizer for DouglasPeucker {
    fn name(&self) -> &'static str {
        "Douglas-Peucker"
    }

    fn reduce<V: Precision>(&self, series: &Series<V>) -> Result<Series<V>, GeneralizerError> {
        let samples = series.samples();
        let tolerance = self.config.tolerance_value();
        if samples.len() < 3 || tolerance <= 0.0 {
            return Ok(series.clone());
        }

        if let Some(max_entries) = self.config.max_entries() {
            if samples.len() > max_entries {
                return Err(GeneralizerError::GeneralizationLimitExceeded {
                    entries: samples.len(),
                    max_entries,
                });
            }
        }

        let keep = retained(samples, tolerance);
        let reduced: Vec<Sample<V>> = samples
            .iter()
            .zip(keep)
            .filter_map(|(sample, keep)| keep.then_some(*sample))
            .collect();

        #[cfg(feature = "logging")]
        log::debug!(
            "Douglas-Peucker reduced series '{}' from {} to {} samples (expected reduction rate: {})",
            series.id(),
            samples.len(),
            reduced.len(),
            self.config.reduction_rate()
        );

        Ok(series.derive(reduced))
    }
}

/// Marks the samples that survive simplification.
///
/// The first and last sample and every no-data sample are always kept.
fn retained<V: Precision>(samples: &[Sample<V>], tolerance: f64) -> Vec<bool> {
    let mut keep = vec![false; samples.len()];
    let mut ranges = Vec::new();

    let mut run_start = None;
    for (index, sample) in samples.iter().enumerate() {
        if sample.is_no_data() {
            keep[index] = true;
            if let Some(start) = run_start.take() {
                push_run(&mut ranges, &mut keep, start, index - 1);
            }
        } else if run_start.is_none() {
            run_start = Some(index);
        }
    }
    if let Some(start) = run_start {
        push_run(&mut ranges, &mut keep, start, samples.len() - 1);
    }

    // Work stack instead of recursion: the split depth is linear in the input on
    // pathological series.
    while let Some((first, last)) = ranges.pop() {
        match farthest_sample(samples, first, last) {
            Some((index, distance)) if distance >= tolerance => {
                keep[index] = true;
                ranges.push((index, last));
                ranges.push((first, index));
            }
            _ => {}
        }
    }

    keep
}

fn push_run(ranges: &mut Vec<(usize, usize)>, keep: &mut [bool], first: usize, last: usize) {
    keep[first] = true;
    keep[last] = true;
    if last - first >= 2 {
        ranges.push((first, last));
    }
}

/// Finds the interior sample of `[first, last]` farthest from the tendency line.
///
/// Samples lying on the line are never selected.
fn farthest_sample<V: Precision>(
    samples: &[Sample<V>],
    first: usize,
    last: usize,
) -> Option<(usize, f64)> {
    let line = TendencyLine::through(&samples[first], &samples[last])?;
    let mut farthest: Option<(usize, f64)> = None;
    for (index, sample) in samples.iter().enumerate().take(last).skip(first + 1) {
        let Some(distance) = line.distance(sample) else {
            continue;
        };
        let best = farthest.map_or(0.0, |(_, d)| d);
        if distance > best {
            farthest = Some((index, distance));
        }
    }
    farthest
}

/// Straight line between two valid samples in (timestamp, value) space.
///
/// Coordinates are taken relative to the start sample so that epoch-sized
/// timestamps do not swamp the value differences.
#[derive(Debug, Clone, Copy)]
struct TendencyLine<V> {
    start_timestamp: i64,
    start_value: V,
    dx: f64,
    dy: f64,
    length: f64,
}

impl<V: Precision> TendencyLine<V> {
    fn through(start: &Sample<V>, end: &Sample<V>) -> Option<Self> {
        let start_value = start.value()?;
        let end_value = end.value()?;
        #[allow(clippy::cast_precision_loss)]
        let dx = (end.timestamp() - start.timestamp()) as f64;
        let dy = end_value.delta(start_value);
        Some(Self {
            start_timestamp: start.timestamp(),
            start_value,
            dx,
            dy,
            length: dx.hypot(dy),
        })
    }

    /// Perpendicular distance of `sample` to the infinite line, `None` for no-data.
    fn distance(&self, sample: &Sample<V>) -> Option<f64> {
        let value = sample.value()?;
        #[allow(clippy::cast_precision_loss)]
        let px = (sample.timestamp() - self.start_timestamp) as f64;
        let py = value.delta(self.start_value);
        if self.length == 0.0 {
            return Some(px.hypot(py));
        }
        Some((self.dx * py - self.dy * px).abs() / self.length)
    }
}
