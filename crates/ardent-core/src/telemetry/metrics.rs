// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Abstract definitions for engine metrics.

use std::fmt::{self, Display};

/// A structured identifier for a metric, `namespace:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// The broad category of the metric (e.g., "assets", "ecs").
    pub namespace: String,
    /// The specific name of the metric (e.g., "loaded_total").
    pub name: String,
}

impl MetricId {
    /// Creates a new `MetricId` with a namespace and a name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// The fundamental type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// A value that only ever increases (e.g., assets loaded).
    Counter,
    /// A value that tracks the distribution of a set of measurements.
    Histogram,
}

/// An enumeration of possible metric values.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A 64-bit unsigned integer for counters.
    Counter(u64),
    /// Samples and their distribution across predefined buckets.
    Histogram {
        /// The upper bounds of the buckets, ascending.
        bucket_bounds: Vec<f64>,
        /// The count of samples per bucket. One extra trailing bucket
        /// counts samples above the last bound.
        bucket_counts: Vec<u64>,
        /// Number of recorded samples.
        count: u64,
        /// Sum of all recorded samples.
        sum: f64,
    },
}

impl MetricValue {
    /// Creates an empty histogram value for the given bucket bounds.
    pub fn empty_histogram(mut bucket_bounds: Vec<f64>) -> Self {
        bucket_bounds.sort_by(|a, b| a.total_cmp(b));
        let bucket_counts = vec![0; bucket_bounds.len() + 1];
        MetricValue::Histogram {
            bucket_bounds,
            bucket_counts,
            count: 0,
            sum: 0.0,
        }
    }

    /// Returns the [`MetricType`] corresponding to this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Histogram { .. } => MetricType::Histogram,
        }
    }

    /// Returns the value as a `u64` if it is a `Counter`.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number of samples if it is a `Histogram`.
    pub fn sample_count(&self) -> Option<u64> {
        match self {
            MetricValue::Histogram { count, .. } => Some(*count),
            _ => None,
        }
    }
}

/// A specialized `Result` type for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// The error type for metrics operations.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// The requested metric was not found in the registry.
    MetricNotFound(MetricId),
    /// An operation was attempted on a metric of the wrong type.
    TypeMismatch {
        /// The expected metric type for the operation.
        expected: MetricType,
        /// The actual metric type that was found.
        found: MetricType,
    },
    /// The registry lock was poisoned by a panicking writer.
    StorageError(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::MetricNotFound(id) => write!(f, "Metric not found: {id}"),
            MetricsError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {expected:?}, found {found:?}")
            }
            MetricsError::StorageError(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for MetricsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_id_display() {
        assert_eq!(MetricId::new("assets", "loaded_total").to_string(), "assets:loaded_total");
    }

    #[test]
    fn test_empty_histogram_has_overflow_bucket() {
        let value = MetricValue::empty_histogram(vec![10.0, 1.0]);
        match value {
            MetricValue::Histogram {
                bucket_bounds,
                bucket_counts,
                ..
            } => {
                assert_eq!(bucket_bounds, vec![1.0, 10.0]);
                assert_eq!(bucket_counts.len(), 3);
            }
            _ => panic!("Expected histogram"),
        }
    }
}
