//! System resource detection
//!
//! Detects the host's core counts and memory and matches them against the
//! known deployment profiles. The launch itself never depends on this: a
//! profile pins every value. This exists so `analyze` can tell an operator
//! which profile fits the machine they are standing on.

use crate::config::DeploymentProfile;
use humansize::{format_size, BINARY};
use sysinfo::System;

/// Host resource summary
#[derive(Debug, Clone)]
pub struct SystemInfo {
    /// Logical CPU count
    pub logical_cpus: usize,
    /// Physical core count
    pub physical_cores: usize,
    /// Total memory in bytes
    pub total_memory: u64,
    /// Available memory in bytes
    pub available_memory: u64,
    /// CPU brand string, if the platform reports one
    pub cpu_brand: String,
}

impl SystemInfo {
    /// Collect resource information from the host
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        let cpus = sys.cpus();
        let cpu_brand = cpus
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            logical_cpus: cpus.len(),
            physical_cores: num_cpus::get_physical(),
            total_memory: sys.total_memory(),
            available_memory: sys.available_memory(),
            cpu_brand,
        }
    }

    /// Thread count to use when a profile asks for automatic sizing
    pub fn auto_omp_threads(&self) -> u32 {
        self.physical_cores.max(1) as u32
    }

    /// Pick the profile whose core budget best fits this host.
    ///
    /// Prefers the largest total core budget that does not exceed the
    /// physical core count; falls back to the smallest profile when the
    /// host is smaller than everything on offer.
    pub fn recommend_profile<'a>(
        &self,
        profiles: &'a [DeploymentProfile],
    ) -> Option<&'a DeploymentProfile> {
        let fitting = profiles
            .iter()
            .filter(|p| p.total_executor_cores as usize <= self.physical_cores)
            .max_by_key(|p| p.total_executor_cores);

        fitting.or_else(|| profiles.iter().min_by_key(|p| p.total_executor_cores))
    }

    /// Print a human-readable summary
    pub fn print_summary(&self, detailed: bool) {
        println!("=== System Resources ===");
        println!("CPU:            {}", self.cpu_brand);
        println!("Logical CPUs:   {}", self.logical_cpus);
        println!("Physical cores: {}", self.physical_cores);
        println!("Total memory:   {}", format_size(self.total_memory, BINARY));

        if detailed {
            println!(
                "Available:      {}",
                format_size(self.available_memory, BINARY)
            );
            println!("Auto OMP size:  {}", self.auto_omp_threads());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileSet;

    #[test]
    fn test_collect_reports_cores() {
        let info = SystemInfo::collect();
        assert!(info.logical_cpus >= 1);
        assert!(info.physical_cores >= 1);
        assert!(info.auto_omp_threads() >= 1);
    }

    #[test]
    fn test_recommendation_prefers_largest_fitting() {
        let info = SystemInfo {
            logical_cpus: 88,
            physical_cores: 44,
            total_memory: 0,
            available_memory: 0,
            cpu_brand: "test".into(),
        };
        let set = ProfileSet::builtin();
        let pick = info.recommend_profile(set.profiles()).unwrap();
        assert_eq!(pick.total_executor_cores, 44);
    }

    #[test]
    fn test_recommendation_falls_back_to_smallest() {
        let info = SystemInfo {
            logical_cpus: 8,
            physical_cores: 4,
            total_memory: 0,
            available_memory: 0,
            cpu_brand: "test".into(),
        };
        let set = ProfileSet::builtin();
        let pick = info.recommend_profile(set.profiles()).unwrap();
        assert_eq!(pick.total_executor_cores, 44);
    }
}
