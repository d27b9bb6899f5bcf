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

//! The pool that reads assets in the background.
//!
//! Jobs flow through two lists guarded by one mutex: the read queue, drained
//! by the worker threads, and the finalize list, drained by
//! [`AssetLoadingThreadPool::process_pending`] on the device thread. Every
//! change that can settle an asset is followed by a notification on the
//! pool's condition variable.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use ardent_core::asset::AssetLoadingError;
use ardent_core::config::AssetLoaderConfig;
use ardent_core::device::DevicePtr;

use crate::job::LoadingJob;

#[derive(Default)]
struct Queues {
    jobs: VecDeque<Box<dyn LoadingJob>>,
    finalize: Vec<Box<dyn LoadingJob>>,
    run: bool,
}

struct Shared {
    queues: Mutex<Queues>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queues> {
        // Jobs never panic while the lock is held; recover the data if one did.
        self.queues.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Queues>) -> MutexGuard<'a, Queues> {
        self.changed.wait(guard).unwrap_or_else(|e| e.into_inner())
    }

    fn run_read(&self, mut job: Box<dyn LoadingJob>) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| job.read())).unwrap_or_else(|_| {
            log::error!("Unable to load {}: reader panicked", job.name());
            Err(AssetLoadingError::InvalidData)
        });
        match result {
            Ok(()) => self.lock().finalize.push(job),
            Err(error) => {
                job.set_failed(error);
                // Synchronize with waiters that checked the state under the lock.
                drop(self.lock());
            }
        }
        self.changed.notify_all();
    }
}

/// Background readers plus the bookkeeping for device-thread finalization.
pub struct AssetLoadingThreadPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    finalizing: Mutex<()>,
}

impl AssetLoadingThreadPool {
    /// Starts `config.worker_threads` named reader threads.
    pub fn new(config: &AssetLoaderConfig) -> Result<Self> {
        let shared = Arc::new(Shared {
            queues: Mutex::new(Queues {
                run: true,
                ..Default::default()
            }),
            changed: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(config.worker_threads);
        for index in 0..config.worker_threads {
            let shared = shared.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index))
                .spawn(move || worker_loop(&shared))
                .with_context(|| format!("Failed to spawn asset loading thread {index}"))?;
            workers.push(handle);
        }
        log::debug!("Asset loading pool started with {} worker(s)", workers.len());

        Ok(Self {
            shared,
            worker_count: workers.len(),
            workers: Mutex::new(workers),
            finalizing: Mutex::new(()),
        })
    }

    /// Number of background reader threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of jobs waiting to be read or finalized.
    pub fn pending_jobs(&self) -> usize {
        let queues = self.shared.lock();
        queues.jobs.len() + queues.finalize.len()
    }

    pub(crate) fn enqueue(&self, job: Box<dyn LoadingJob>) {
        self.shared.lock().jobs.push_back(job);
        self.shared.changed.notify_all();
    }

    /// Reads queued jobs on the calling thread. Returns how many ran.
    fn read_queued(&self) -> usize {
        let mut count = 0;
        loop {
            let job = self.shared.lock().jobs.pop_front();
            let Some(job) = job else {
                return count;
            };
            self.shared.run_read(job);
            count += 1;
        }
    }

    /// Finalizes every job whose dependencies have settled.
    ///
    /// Must be called on the thread owning `device`. Without worker threads
    /// this also performs the queued reads. Returns the number of jobs that
    /// left the pool.
    pub fn process_pending(&self, device: &DevicePtr) -> usize {
        let _finalizing = self.finalizing.lock().unwrap_or_else(|e| e.into_inner());
        let mut settled = 0;

        loop {
            if self.worker_count == 0 {
                self.read_queued();
            }

            let pending = std::mem::take(&mut self.shared.lock().finalize);
            if pending.is_empty() {
                break;
            }

            let mut waiting = Vec::new();
            let mut progressed = false;
            for job in pending {
                if job.dependencies().has_failed() {
                    job.set_dependencies_failed();
                } else if job.dependencies().is_ready() {
                    job.finalize(device);
                } else {
                    waiting.push(job);
                    continue;
                }
                progressed = true;
                settled += 1;
            }

            {
                let mut queues = self.shared.lock();
                // Keep waiting jobs ahead of anything pushed meanwhile.
                waiting.append(&mut queues.finalize);
                queues.finalize = waiting;
            }
            self.shared.changed.notify_all();

            if !progressed {
                break;
            }
        }
        settled
    }

    /// Blocks until `done` returns true.
    ///
    /// The calling thread helps with queued reads. When `can_finalize` is
    /// set it also finalizes, otherwise it relies on the device thread
    /// calling [`process_pending`](Self::process_pending).
    pub(crate) fn wait_until(
        &self,
        done: impl Fn() -> bool,
        device: &DevicePtr,
        can_finalize: bool,
    ) {
        loop {
            if done() {
                return;
            }
            if can_finalize && self.process_pending(device) > 0 {
                continue;
            }

            let queues = self.shared.lock();
            if done() {
                return;
            }
            if !queues.jobs.is_empty() {
                drop(queues);
                self.read_queued();
                continue;
            }
            if can_finalize && queues.finalize.iter().any(|job| job.dependencies().is_settled()) {
                continue;
            }
            drop(self.shared.wait(queues));
        }
    }

    /// Stops the workers after they drain the read queue.
    ///
    /// Jobs still waiting for finalization stay in the pool.
    pub fn shutdown(&self) {
        self.shared.lock().run = false;
        self.shared.changed.notify_all();

        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));
        for worker in workers {
            if worker.join().is_err() {
                log::error!("An asset loading thread panicked");
            }
        }
    }
}

impl Drop for AssetLoadingThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut queues = shared.lock();
            loop {
                if let Some(job) = queues.jobs.pop_front() {
                    break job;
                }
                if !queues.run {
                    return;
                }
                queues = shared.wait(queues);
            }
        };
        shared.run_read(job);
    }
}
