//! Execution context for per-pixel, per-cell and per-frame work
//!
//! Every parallelizable stage takes an [`ExecutionContext`] instead of
//! consulting process-wide state. The default is sequential and in-process;
//! [`ExecutionContext::init`] selects the parallel CPU backend, a dedicated
//! `rayon` thread pool owned by the context. Dropping the last clone of the
//! context releases the pool.
//!
//! Backends never change results: work is split into independent items and
//! the outputs are collected in item order.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Which backend [`ExecutionContext::init`] should bring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSelector {
    /// A device id as listed by [`available_devices`].
    Id(usize),
    /// The device with the most compute throughput.
    BestThroughput,
    /// The device with the most memory.
    BestMemory,
}

impl FromStr for DeviceSelector {
    type Err = EngineError;

    /// Parses `best_flops`, `best_memory` or a device id.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "best_flops" => Ok(DeviceSelector::BestThroughput),
            "best_memory" => Ok(DeviceSelector::BestMemory),
            other => other
                .parse::<usize>()
                .map(DeviceSelector::Id)
                .map_err(|_| EngineError::unsupported("device", other)),
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelector::Id(id) => write!(f, "{id}"),
            DeviceSelector::BestThroughput => f.write_str("best_flops"),
            DeviceSelector::BestMemory => f.write_str("best_memory"),
        }
    }
}

/// A selectable backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub id: usize,
    pub name: String,
    /// Worker threads the backend runs.
    pub threads: usize,
}

/// Outcome of accelerator initialization.
///
/// Initialization never fails the caller: problems downgrade to the
/// sequential path and are reported here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceleratorStatus {
    /// The requested backend is running.
    Active(DeviceInfo),
    /// The backend could not be brought up; work runs sequentially.
    Fallback { reason: String },
}

impl AcceleratorStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AcceleratorStatus::Active(_))
    }
}

const CPU_POOL_ID: usize = 0;

fn cpu_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Backends that [`ExecutionContext::init`] can select.
pub fn available_devices() -> Vec<DeviceInfo> {
    vec![DeviceInfo {
        id: CPU_POOL_ID,
        name: "cpu thread pool".to_string(),
        threads: cpu_threads(),
    }]
}

/// Where engine work runs. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pool: Option<Arc<ThreadPool>>,
}

impl ExecutionContext {
    /// Run everything on the calling thread.
    pub fn sequential() -> Self {
        Self { pool: None }
    }

    /// Bring up the backend named by `selector`.
    ///
    /// On failure the sequential context is returned together with
    /// [`AcceleratorStatus::Fallback`]; a warning is logged.
    pub fn init(selector: DeviceSelector) -> (Self, AcceleratorStatus) {
        let devices = available_devices();
        let device = match selector {
            DeviceSelector::Id(id) => devices.into_iter().find(|d| d.id == id),
            DeviceSelector::BestThroughput | DeviceSelector::BestMemory => {
                devices.into_iter().max_by_key(|d| d.threads)
            }
        };

        let Some(device) = device else {
            return Self::fallback(format!("no device matches selector {selector}"));
        };

        Self::with_threads(device.threads)
            .map(|ctx| {
                tracing::debug!(device = %device.name, threads = device.threads, "Accelerator ready");
                (ctx, AcceleratorStatus::Active(device))
            })
            .unwrap_or_else(|e| Self::fallback(e.to_string()))
    }

    /// A parallel context with exactly `threads` workers. Zero is treated
    /// as one.
    pub fn with_threads(threads: usize) -> Result<Self> {
        ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("blit-worker-{i}"))
            .build()
            .map(|pool| Self {
                pool: Some(Arc::new(pool)),
            })
            .map_err(|e| EngineError::unsupported("thread pool", e.to_string()))
    }

    fn fallback(reason: String) -> (Self, AcceleratorStatus) {
        tracing::warn!(reason = %reason, "Accelerator unavailable, falling back to sequential execution");
        (Self::sequential(), AcceleratorStatus::Fallback { reason })
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Worker count; 1 for the sequential context.
    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// Compute `f(0..n)` and collect the results in index order.
    pub fn map_range<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        match &self.pool {
            None => (0..n).map(f).collect(),
            Some(pool) => pool.install(|| (0..n).into_par_iter().map(f).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert_eq!(
            "best_flops".parse::<DeviceSelector>().unwrap(),
            DeviceSelector::BestThroughput
        );
        assert_eq!(
            "best_memory".parse::<DeviceSelector>().unwrap(),
            DeviceSelector::BestMemory
        );
        assert_eq!("3".parse::<DeviceSelector>().unwrap(), DeviceSelector::Id(3));
        assert!("gpu".parse::<DeviceSelector>().is_err());
    }

    #[test]
    fn test_unknown_device_falls_back() {
        let (ctx, status) = ExecutionContext::init(DeviceSelector::Id(99));
        assert!(!ctx.is_parallel());
        assert!(
            matches!(status, AcceleratorStatus::Fallback { ref reason } if reason.contains("99")),
            "unexpected status {status:?}"
        );
    }

    #[test]
    fn test_cpu_pool_is_selectable() {
        let (ctx, status) = ExecutionContext::init(DeviceSelector::Id(0));
        assert!(status.is_active());
        assert!(ctx.is_parallel());
        assert!(ctx.threads() >= 1);
    }

    #[test]
    fn test_map_range_preserves_order() {
        let expected: Vec<usize> = (0..500).map(|i| i * i).collect();
        assert_eq!(ExecutionContext::sequential().map_range(500, |i| i * i), expected);
        let parallel = ExecutionContext::with_threads(4).unwrap();
        assert_eq!(parallel.map_range(500, |i| i * i), expected);
        assert!(parallel.map_range(0, |i| i).is_empty());
    }

    #[test]
    fn test_with_threads_sizes_the_pool() {
        let ctx = ExecutionContext::with_threads(3).unwrap();
        assert!(ctx.is_parallel());
        assert_eq!(ctx.threads(), 3);
        assert_eq!(ExecutionContext::with_threads(0).unwrap().threads(), 1);
    }

    #[test]
    fn test_available_devices_lists_cpu_pool() {
        let devices = available_devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, 0);
        assert!(devices[0].threads >= 1);
    }
}
