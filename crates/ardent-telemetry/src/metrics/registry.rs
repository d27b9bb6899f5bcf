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

//! Registry for managing metrics.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ardent_core::telemetry::metrics::{MetricId, MetricType, MetricValue, MetricsError, MetricsResult};

/// A registered metric: its identity, description and current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Unique identifier.
    pub id: MetricId,
    /// Human readable description.
    pub description: String,
    /// Unit of the recorded values (empty for counters).
    pub unit: String,
    /// Current value.
    pub value: MetricValue,
}

type MetricStore = RwLock<HashMap<MetricId, Metric>>;

fn poisoned<T>(_: T) -> MetricsError {
    MetricsError::StorageError("metrics lock poisoned".to_string())
}

fn update<R>(
    store: &MetricStore,
    id: &MetricId,
    f: impl FnOnce(&mut MetricValue) -> MetricsResult<R>,
) -> MetricsResult<R> {
    let mut metrics = store.write().map_err(poisoned)?;
    let metric = metrics
        .get_mut(id)
        .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))?;
    f(&mut metric.value)
}

fn read(store: &MetricStore, id: &MetricId) -> MetricsResult<Metric> {
    store
        .read()
        .map_err(poisoned)?
        .get(id)
        .cloned()
        .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
}

/// Central registry for metrics in the engine.
///
/// This registry provides a high-level API for metrics management and
/// serves as the main entry point for the metrics system. Handles returned by
/// the `register_*` methods share the registry's storage and can be moved to
/// other threads.
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    store: Arc<MetricStore>,
}

impl MetricsRegistry {
    /// Create a new, empty metrics registry
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&self, metric: Metric) -> MetricsResult<()> {
        let mut metrics = self.store.write().map_err(poisoned)?;
        metrics.insert(metric.id.clone(), metric);
        Ok(())
    }

    /// Register a new counter metric, starting at zero.
    ///
    /// Registering an existing id resets it.
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> MetricsResult<CounterHandle> {
        let id = MetricId::new(namespace, name);
        self.put(Metric {
            id: id.clone(),
            description: description.into(),
            unit: String::new(),
            value: MetricValue::Counter(0),
        })?;
        Ok(CounterHandle {
            id,
            store: self.store.clone(),
        })
    }

    /// Register a new histogram metric with the given bucket upper bounds
    pub fn register_histogram(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        buckets: Vec<f64>,
    ) -> MetricsResult<HistogramHandle> {
        let id = MetricId::new(namespace, name);
        self.put(Metric {
            id: id.clone(),
            description: description.into(),
            unit: unit.into(),
            value: MetricValue::empty_histogram(buckets),
        })?;
        Ok(HistogramHandle {
            id,
            store: self.store.clone(),
        })
    }

    /// Get a metric by ID
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        read(&self.store, id)
    }

    /// Check if a metric exists
    pub fn contains_metric(&self, id: &MetricId) -> bool {
        self.store
            .read()
            .map(|metrics| metrics.contains_key(id))
            .unwrap_or(false)
    }

    /// Get all metrics in a namespace
    pub fn get_namespace_metrics(&self, namespace: &str) -> Vec<Metric> {
        self.store
            .read()
            .map(|metrics| {
                metrics
                    .values()
                    .filter(|m| m.id.namespace == namespace)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the total number of metrics
    pub fn metric_count(&self) -> usize {
        self.store.read().map(|metrics| metrics.len()).unwrap_or(0)
    }
}

/// Handle for efficient counter operations
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    store: Arc<MetricStore>,
}

impl CounterHandle {
    /// Increment the counter by 1
    pub fn increment(&self) -> MetricsResult<u64> {
        self.increment_by(1)
    }

    /// Increment the counter by a specific amount
    pub fn increment_by(&self, amount: u64) -> MetricsResult<u64> {
        update(&self.store, &self.id, |value| match value {
            MetricValue::Counter(count) => {
                *count += amount;
                Ok(*count)
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: other.metric_type(),
            }),
        })
    }

    /// Get the current counter value
    pub fn get(&self) -> MetricsResult<u64> {
        let metric = read(&self.store, &self.id)?;
        metric
            .value
            .as_counter()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            })
    }

    /// Get the metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for efficient histogram operations
#[derive(Debug, Clone)]
pub struct HistogramHandle {
    id: MetricId,
    store: Arc<MetricStore>,
}

impl HistogramHandle {
    /// Record a sample in the histogram
    pub fn observe(&self, sample: f64) -> MetricsResult<()> {
        update(&self.store, &self.id, |value| match value {
            MetricValue::Histogram {
                bucket_bounds,
                bucket_counts,
                count,
                sum,
            } => {
                let bucket = bucket_bounds.partition_point(|&bound| bound < sample);
                bucket_counts[bucket] += 1;
                *count += 1;
                *sum += sample;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Histogram,
                found: other.metric_type(),
            }),
        })
    }

    /// Get the metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }

    /// Get the full histogram metric (for analysis)
    pub fn get_metric(&self) -> MetricsResult<Metric> {
        read(&self.store, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.metric_count(), 0);
    }

    #[test]
    fn test_counter_registration_and_operations() {
        let registry = MetricsRegistry::new();

        let counter = registry
            .register_counter("assets", "loaded_total", "Assets successfully loaded")
            .unwrap();

        assert_eq!(counter.increment().unwrap(), 1);
        assert_eq!(counter.increment_by(5).unwrap(), 6);
        assert_eq!(counter.get().unwrap(), 6);

        assert!(registry.contains_metric(counter.id()));
        assert_eq!(registry.metric_count(), 1);
    }

    #[test]
    fn test_histogram_buckets() {
        let registry = MetricsRegistry::new();

        let histogram = registry
            .register_histogram(
                "assets",
                "read_time",
                "Asset read duration",
                "ms",
                vec![1.0, 10.0, 100.0],
            )
            .unwrap();

        histogram.observe(0.5).unwrap();
        histogram.observe(10.0).unwrap();
        histogram.observe(500.0).unwrap();

        match histogram.get_metric().unwrap().value {
            MetricValue::Histogram {
                bucket_counts,
                count,
                sum,
                ..
            } => {
                assert_eq!(bucket_counts, vec![1, 1, 0, 1]);
                assert_eq!(count, 3);
                assert_eq!(sum, 510.5);
            }
            _ => panic!("Expected histogram metric"),
        }
    }

    #[test]
    fn test_handles_share_storage_across_threads() {
        let registry = MetricsRegistry::new();
        let counter = registry.register_counter("test", "hits", "Hits").unwrap();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        counter.increment().unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(counter.get().unwrap(), 400);
    }

    #[test]
    fn test_namespace_filtering() {
        let registry = MetricsRegistry::new();
        registry.register_counter("assets", "loaded_total", "").unwrap();
        registry.register_counter("assets", "failed_total", "").unwrap();
        registry.register_counter("ecs", "entities", "").unwrap();

        assert_eq!(registry.get_namespace_metrics("assets").len(), 2);
        assert_eq!(registry.get_namespace_metrics("ecs").len(), 1);
    }

    #[test]
    fn test_unknown_metric() {
        let registry = MetricsRegistry::new();
        let id = MetricId::new("missing", "metric");
        assert_eq!(
            registry.get_metric(&id),
            Err(MetricsError::MetricNotFound(id.clone()))
        );
    }
}
