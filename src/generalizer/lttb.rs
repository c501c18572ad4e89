//! Largest-Triangle-Three-Buckets downsampling.
//!
//! The samples between the first and the last are split into `threshold - 2`
//! buckets and each bucket contributes exactly one sample: the one spanning the
//! largest triangle with the sample chosen for the previous bucket and the average
//! of the next bucket. The first and last sample are always kept, so the output
//! holds exactly `threshold` samples.
//!
//! See <https://github.com/sveinn-steinarsson/flot-downsample/>.
//!
//! # No-data handling
//!
//! - A bucket holding more no-data samples than the gap threshold allows is a data
//!   gap. It contributes a no-data placeholder at its average timestamp. The next
//!   bucket is anchored at the best valid sample seen in the gap bucket before the
//!   limit was hit, or keeps the previous anchor if there was none.
//! - A bucket without any valid sample that is not a gap contributes a no-data
//!   placeholder at its average timestamp and keeps the previous anchor.
//! - Anchors are always valid samples, except a leading no-data sample. While the
//!   anchor is that sample, the first valid sample of the current bucket stands in
//!   for it, so valid buckets are never hidden behind a gap.
//!
//! Placeholders never repeat or precede an earlier output timestamp.

use super::Generalizer;
use crate::config::LttbConfig;
use crate::error::GeneralizerError;
use crate::precision::Precision;
use crate::sample::Sample;
use crate::series::Series;
use std::ops::Range;

/// Largest-Triangle-Three-Buckets generalizer.
#[derive(Debug, Clone, Default)]
pub struct LargestTriangleThreeBuckets {
    config: LttbConfig,
}

impl LargestTriangleThreeBuckets {
    /// Creates a generalizer with the given configuration.
    pub fn new(config: LttbConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &LttbConfig {
        &self.config
    }

    fn downsample<V: Precision>(&self, data: &[Sample<V>]) -> Vec<Sample<V>> {
        let threshold = self.config.threshold();
        let gap_threshold = self.config.no_data_gap_threshold();
        let buckets = Buckets::new(data.len(), threshold);

        let mut sampled = Vec::with_capacity(threshold);
        sampled.push(data[0]);
        let mut anchor = 0;

        for bucket in 0..threshold - 2 {
            let range = buckets.range(bucket);
            let current = bucket_average(data, range.clone(), gap_threshold);

            let left = anchor_point(&data[anchor]).or_else(|| {
                data[range.clone()].iter().find_map(anchor_point)
            });
            let right = bucket_average(data, buckets.range(bucket + 1), gap_threshold);

            let mut selected = None;
            let mut max_area = -1.0;
            let mut no_data = 0;
            let mut is_gap = false;
            for index in range.clone() {
                let middle = data[index];
                match middle.value() {
                    None => {
                        no_data += 1;
                        if self.exceeds_gap_threshold(no_data, buckets.bucket_size) {
                            is_gap = true;
                            break;
                        }
                    }
                    Some(middle_value) => {
                        // A valid sample in range means `left` is set.
                        let Some(left) = left else { continue };
                        let area = triangle_area(left, &right, (middle.timestamp(), middle_value));
                        if area > max_area {
                            max_area = area;
                            selected = Some(index);
                        }
                    }
                }
            }

            match selected {
                _ if is_gap => {
                    #[cfg(feature = "logging")]
                    log::debug!("No data value for bucket {bucket}.");
                    push_placeholder(&mut sampled, current.timestamp_millis());
                    if let Some(index) = selected {
                        anchor = index;
                    }
                }
                Some(index) => {
                    sampled.push(data[index]);
                    anchor = index;
                }
                None => push_placeholder(&mut sampled, current.timestamp_millis()),
            }
        }

        sampled.push(data[data.len() - 1]);
        sampled
    }

    /// Whether `no_data` missing samples turn a bucket into a data gap.
    #[allow(clippy::cast_precision_loss)]
    fn exceeds_gap_threshold(&self, no_data: usize, bucket_size: f64) -> bool {
        let gap_threshold = self.config.no_data_gap_threshold();
        if gap_threshold <= 1.0 {
            // share of the bucket
            no_data as f64 > gap_threshold * bucket_size
        } else {
            // absolute count
            no_data as f64 > gap_threshold
        }
    }
}

impl Generalizer for LargestTriangleThreeBuckets {
    fn name(&self) -> &'static str {
        "LargestTriangleThreeBuckets"
    }

    fn reduce<V: Precision>(&self, series: &Series<V>) -> Result<Series<V>, GeneralizerError> {
        let threshold = self.config.threshold();
        if threshold == 0 || threshold >= series.len() {
            return Ok(series.clone());
        }
        Ok(series.derive(self.downsample(series.samples())))
    }
}

/// Bucket layout over a series of `len` samples.
///
/// Bucket boundaries are `floor(bucket * bucket_size) + 1`, so neighbouring
/// buckets may differ in size by one sample.
#[derive(Debug, Clone, Copy)]
struct Buckets {
    len: usize,
    bucket_size: f64,
}

impl Buckets {
    #[allow(clippy::cast_precision_loss)]
    fn new(len: usize, threshold: usize) -> Self {
        // Leave room for the first and last sample.
        Self {
            len,
            bucket_size: (len as f64 - 2.0) / (threshold as f64 - 2.0),
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn range(&self, bucket: usize) -> Range<usize> {
        let start = (bucket as f64 * self.bucket_size).floor() as usize + 1;
        let end = ((bucket + 1) as f64 * self.bucket_size).floor() as usize + 1;
        start.min(self.len)..end.min(self.len)
    }
}

/// Mean position of the samples of one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BucketAverage<V> {
    timestamp: f64,
    value: V,
}

impl<V> BucketAverage<V> {
    #[allow(clippy::cast_possible_truncation)]
    fn timestamp_millis(&self) -> i64 {
        self.timestamp as i64
    }
}

/// Averages the samples in `range`.
///
/// Every sample contributes its timestamp. Values are summed over valid samples
/// only until the count of no-data samples equals `gap_threshold`; the sum is
/// then divided by the full range length. A sum that overflows the value type is
/// replaced by the sum of individually divided values.
#[allow(clippy::cast_precision_loss)]
fn bucket_average<V: Precision>(
    data: &[Sample<V>],
    range: Range<usize>,
    gap_threshold: f64,
) -> BucketAverage<V> {
    // Never empty: bucket_size exceeds one whenever threshold < len.
    let samples = &data[range];
    let len = samples.len();
    let timestamp_sum: f64 = samples.iter().map(|s| s.timestamp() as f64).sum();

    let value = match averaged_values(samples, gap_threshold)
        .try_fold(V::ZERO, |sum, value| sum.checked_add(value))
    {
        Some(sum) => V::mean(sum, len),
        None => {
            #[cfg(feature = "logging")]
            log::warn!("Bucket value sum overflows, averaging {len} scaled values instead.");
            averaged_values(samples, gap_threshold).fold(V::ZERO, |sum, value| {
                let scaled = V::mean(value, len);
                sum.checked_add(scaled).unwrap_or(sum)
            })
        }
    };

    BucketAverage {
        timestamp: timestamp_sum / len as f64,
        value,
    }
}

/// Valid values that count towards a bucket average.
///
/// Stops at the no-data sample whose count equals `gap_threshold`.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn averaged_values<V: Precision>(
    samples: &[Sample<V>],
    gap_threshold: f64,
) -> impl Iterator<Item = V> + '_ {
    let mut no_data = 0usize;
    samples
        .iter()
        .map_while(move |sample| match sample.value() {
            Some(value) => Some(Some(value)),
            None => {
                no_data += 1;
                (no_data as f64 != gap_threshold).then_some(None)
            }
        })
        .flatten()
}

/// Position of a valid sample, `None` for no-data.
fn anchor_point<V: Precision>(sample: &Sample<V>) -> Option<(i64, V)> {
    sample.value().map(|value| (sample.timestamp(), value))
}

/// Area of the triangle spanned by `left`, `right` and `middle`.
#[allow(clippy::cast_precision_loss)]
fn triangle_area<V: Precision>(
    (left_timestamp, left_value): (i64, V),
    right: &BucketAverage<V>,
    (middle_timestamp, middle_value): (i64, V),
) -> f64 {
    let dt_right = left_timestamp as f64 - right.timestamp;
    let dt_middle = (left_timestamp - middle_timestamp) as f64;
    let dv_middle = middle_value.delta(left_value);
    let dv_right = right.value.delta(left_value);
    (dt_right * dv_middle - dt_middle * dv_right).abs() * 0.5
}

/// Appends a no-data placeholder, moved just past the last emitted sample if
/// `timestamp` would not advance.
fn push_placeholder<V: Precision>(sampled: &mut Vec<Sample<V>>, timestamp: i64) {
    let timestamp = match sampled.last() {
        Some(last) if timestamp <= last.timestamp() => last.timestamp().saturating_add(1),
        _ => timestamp,
    };
    sampled.push(Sample::no_data(timestamp));
}
