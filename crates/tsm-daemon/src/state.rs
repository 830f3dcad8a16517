//! Shared runtime state for tsm-daemon.
//!
//! Everything here is read-only after boot. Handlers receive
//! `State<Arc<AppState>>` from Axum and build a fresh [`GridEngine`] per
//! request, so no locking is needed.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;
use tsm_calendar::CalendarRegistry;
use tsm_config::{Defaults, Settings, UnusedKeyPolicy};
use tsm_core::{GridEngine, SessionClock};

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Static build metadata.
    pub build: BuildInfo,
    /// Built-in markets plus those added by config.
    pub registry: Arc<CalendarRegistry>,
    pub clock: SessionClock,
    /// Market and interval used when a query omits them.
    pub defaults: Defaults,
    /// Hash of the effective layered config; `None` on built-in defaults.
    pub config_hash: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Built-in markets and the default session clock.
    pub fn new() -> Self {
        // Pin the uptime clock at boot.
        let _ = uptime_secs();
        Self {
            build: build_info(),
            registry: Arc::new(CalendarRegistry::with_builtin()),
            clock: SessionClock::default(),
            defaults: Defaults::default(),
            config_hash: None,
        }
    }

    pub fn from_settings(settings: &Settings, config_hash: Option<String>) -> Result<Self> {
        let _ = uptime_secs();
        Ok(Self {
            build: build_info(),
            registry: Arc::new(settings.build_registry()?),
            clock: settings.session_clock()?,
            defaults: settings.defaults.clone(),
            config_hash,
        })
    }

    /// Load layered YAML from `paths`; no paths means built-in defaults.
    /// Unused keys are logged, not fatal.
    pub fn load(paths: &[String]) -> Result<Self> {
        if paths.is_empty() {
            return Ok(Self::new());
        }
        let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
        let loaded = tsm_config::load_layered_yaml(&path_refs)?;
        let report = tsm_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
        for ptr in &report.unused_leaf_pointers {
            warn!(pointer = %ptr, "unused config key");
        }
        Self::from_settings(&loaded.settings()?, Some(loaded.config_hash))
    }

    pub fn engine(&self) -> GridEngine<'_> {
        GridEngine::new(self.registry.as_ref()).with_clock(self.clock)
    }
}

fn build_info() -> BuildInfo {
    BuildInfo {
        service: "tsm-daemon",
        version: env!("CARGO_PKG_VERSION"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seconds since the clock was pinned by the first [`AppState`] built in
/// this process.
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}
