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

//! Provides RAII-based timers for automatically recording metrics. (RAII = Resource Acquisition Is Initialization)

use std::time::Instant;

use crate::metrics::registry::HistogramHandle;

/// A utility for timing the duration of a scope and automatically recording
/// the result in a `Histogram` when it is dropped.
///
/// The measurement is recorded on every exit path, early returns and panics
/// included.
pub struct ScopedMetricTimer<'a> {
    start: Instant,
    histogram: &'a HistogramHandle,
}

impl<'a> ScopedMetricTimer<'a> {
    /// Creates a new timer for the given histogram and starts it immediately.
    pub fn new(histogram: &'a HistogramHandle) -> Self {
        Self {
            start: Instant::now(),
            histogram,
        }
    }
}

/// When the timer goes out of scope, it records the elapsed time in milliseconds.
impl Drop for ScopedMetricTimer<'_> {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        if let Err(e) = self.histogram.observe(elapsed_ms) {
            log::warn!("[ScopedMetricTimer] Failed to record metric: {:?}", e);
        }
    }
}
