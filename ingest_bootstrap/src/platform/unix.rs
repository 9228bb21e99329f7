// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Unix Platform Implementation
//!
//! POSIX implementation backed by `libc` for page size, CPU count, and
//! privilege checks. Memory totals are read from `/proc/meminfo` since
//! POSIX has no portable sysconf for free memory.

use super::{Platform, PlatformError};
use async_trait::async_trait;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Unix platform implementation (Linux, macOS, and other POSIX systems).
pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }

    fn get_page_size_impl() -> usize {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    }

    fn get_cpu_count_impl() -> usize {
        let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if count > 0 {
            count as usize
        } else {
            1
        }
    }

    fn is_elevated_impl() -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    /// Parse `/proc/meminfo` for `MemTotal` and `MemAvailable`, in bytes.
    ///
    /// Falls back to `NotSupported` on platforms without `/proc` (e.g. macOS),
    /// where the caller should treat memory reporting as best-effort.
    fn get_memory_info_impl() -> Result<(u64, u64), PlatformError> {
        let contents = fs::read_to_string("/proc/meminfo").map_err(|_| {
            PlatformError::NotSupported("/proc/meminfo not available on this platform".to_string())
        })?;

        let mut total_kb: Option<u64> = None;
        let mut available_kb: Option<u64> = None;

        for line in contents.lines() {
            if let Some(rest) = line.strip_prefix("MemTotal:") {
                total_kb = parse_meminfo_kb(rest);
            } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
                available_kb = parse_meminfo_kb(rest);
            }
            if total_kb.is_some() && available_kb.is_some() {
                break;
            }
        }

        let total_kb = total_kb
            .ok_or_else(|| PlatformError::Other("MemTotal not found in /proc/meminfo".to_string()))?;
        let available_kb = available_kb.unwrap_or(0);

        Ok((total_kb * 1024, available_kb * 1024))
    }
}

fn parse_meminfo_kb(field: &str) -> Option<u64> {
    field.trim().trim_end_matches(" kB").trim().parse().ok()
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for UnixPlatform {
    fn page_size(&self) -> usize {
        Self::get_page_size_impl()
    }

    fn cpu_count(&self) -> usize {
        Self::get_cpu_count_impl()
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        Self::get_memory_info_impl().map(|(total, _)| total)
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        Self::get_memory_info_impl().map(|(_, available)| available)
    }

    fn line_separator(&self) -> &'static str {
        "\n"
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn platform_name(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macos"
        } else {
            "linux"
        }
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn is_elevated(&self) -> bool {
        Self::is_elevated_impl()
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<(), PlatformError> {
        let perms = std::fs::Permissions::from_mode(mode);
        fs::set_permissions(path, perms)?;
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) => meta.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    async fn sync_file(&self, file: &tokio::fs::File) -> Result<(), PlatformError> {
        file.sync_all().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_platform_basics() {
        let platform = UnixPlatform::new();
        assert!(platform.cpu_count() >= 1);

        let page_size = platform.page_size();
        assert!(page_size >= 512);
        assert!(page_size <= 65536);
    }

    #[test]
    fn test_unix_platform_constants() {
        let platform = UnixPlatform::new();
        assert_eq!(platform.line_separator(), "\n");
        assert_eq!(platform.path_separator(), ':');
    }

    #[test]
    fn test_not_root_by_default() {
        // Test runners are not expected to run as root.
        let platform = UnixPlatform::new();
        let _ = platform.is_elevated();
    }

    #[test]
    fn test_temp_dir() {
        let platform = UnixPlatform::new();
        assert!(!platform.temp_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_parse_meminfo_kb() {
        assert_eq!(parse_meminfo_kb("  16384000 kB"), Some(16384000));
        assert_eq!(parse_meminfo_kb("0 kB"), Some(0));
    }
}
