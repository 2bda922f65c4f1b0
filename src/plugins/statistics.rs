// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution statistics

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Service-wide distribution and download counters
///
/// Shared by every reception handler; all updates are lock-free.
#[derive(Debug, Default)]
pub struct DistributionStatistics {
    total_distribution_count: AtomicU64,
    distribution_success_count: AtomicU64,
    distribution_failure_count: AtomicU64,
    total_download_count: AtomicU64,
    download_success_count: AtomicU64,
    download_failure_count: AtomicU64,
}

/// Point-in-time snapshot of [`DistributionStatistics`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub total_distribution_count: u64,
    pub distribution_success_count: u64,
    pub distribution_failure_count: u64,
    pub total_download_count: u64,
    pub download_success_count: u64,
    pub download_failure_count: u64,
    pub timestamp: DateTime<Utc>,
}

impl DistributionStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_total_distribution_count(&self) {
        self.total_distribution_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_distribution_success_count(&self) {
        self.distribution_success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_distribution_failure_count(&self) {
        self.distribution_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_total_download_count(&self) {
        self.total_download_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_download_success_count(&self) {
        self.download_success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_download_failure_count(&self) {
        self.download_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> StatisticsReport {
        StatisticsReport {
            total_distribution_count: self.total_distribution_count.load(Ordering::Relaxed),
            distribution_success_count: self.distribution_success_count.load(Ordering::Relaxed),
            distribution_failure_count: self.distribution_failure_count.load(Ordering::Relaxed),
            total_download_count: self.total_download_count.load(Ordering::Relaxed),
            download_success_count: self.download_success_count.load(Ordering::Relaxed),
            download_failure_count: self.download_failure_count.load(Ordering::Relaxed),
            timestamp: Utc::now(),
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in [
            &self.total_distribution_count,
            &self.distribution_success_count,
            &self.distribution_failure_count,
            &self.total_download_count,
            &self.download_success_count,
            &self.download_failure_count,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
