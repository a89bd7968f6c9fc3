//! # Device Profiling
//!
//! Classifies the host as constrained ("mobile-class") or unconstrained and
//! exposes the raster limits the rest of the pipeline must respect.
//!
//! | Limit | Constrained | Unconstrained |
//! |-------|-------------|---------------|
//! | max capture scale | 2.0 | 3.0 |
//! | max raster side | 2048 px | none |
//! | max encode quality | 0.8 | 1.0 (the request's own) |
//!
//! Classification is a pure function of an [`Environment`] value. The
//! [`DeviceProfiler`] trait wraps where that value comes from, so tests can
//! pin a profile instead of depending on the process environment. Profiles
//! are recomputed on every export and never cached.

use log::debug;

use crate::config::ExportRequest;

/// Environment variable holding the platform identification string.
pub const USER_AGENT_ENV: &str = "BADGE_EXPORT_USER_AGENT";

pub const CONSTRAINED_MAX_DIMENSION: u32 = 2048;
pub const CONSTRAINED_MAX_SCALE: f64 = 2.0;
pub const UNCONSTRAINED_MAX_SCALE: f64 = 3.0;
pub const CONSTRAINED_MAX_QUALITY: f32 = 0.8;
pub const UNCONSTRAINED_MAX_QUALITY: f32 = 1.0;

/// Platform identification markers of mobile-class hosts, matched
/// case-insensitively as substrings.
const CONSTRAINED_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Opaque description of the execution environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Platform identification string, if the host exposes one
    pub user_agent: Option<String>,
}

impl Environment {
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
        }
    }

    /// Read the environment of the current process.
    pub fn from_process() -> Self {
        Self {
            user_agent: std::env::var(USER_AGENT_ENV).ok().filter(|ua| !ua.trim().is_empty()),
        }
    }
}

/// Capability limits derived from the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub is_constrained: bool,
    /// Maximum raster side in pixels; `None` means unbounded
    pub max_dimension: Option<u32>,
    pub max_scale: f64,
    pub max_quality: f32,
}

impl DeviceProfile {
    pub const fn constrained() -> Self {
        Self {
            is_constrained: true,
            max_dimension: Some(CONSTRAINED_MAX_DIMENSION),
            max_scale: CONSTRAINED_MAX_SCALE,
            max_quality: CONSTRAINED_MAX_QUALITY,
        }
    }

    pub const fn unconstrained() -> Self {
        Self {
            is_constrained: false,
            max_dimension: None,
            max_scale: UNCONSTRAINED_MAX_SCALE,
            max_quality: UNCONSTRAINED_MAX_QUALITY,
        }
    }

    /// Clamp a request to this profile's limits.
    ///
    /// Scale and quality are capped. Oversized outputs are shrunk
    /// proportionally (both sides by the same ratio, rounded down) so the
    /// longest side fits `max_dimension`.
    pub fn clamp(&self, request: &ExportRequest) -> ExportRequest {
        let mut clamped = *request;
        clamped.scale = request.scale.min(self.max_scale);
        clamped.quality = request.quality.min(self.max_quality);

        if let Some(max) = self.max_dimension {
            if request.width > max || request.height > max {
                let ratio = (max as f64 / request.width as f64).min(max as f64 / request.height as f64);
                clamped.width = ((request.width as f64 * ratio).floor() as u32).max(1);
                clamped.height = ((request.height as f64 * ratio).floor() as u32).max(1);
            }
        }

        if clamped != *request {
            debug!(
                "Clamped request {}x{} scale {:.2} quality {:.2} -> {}x{} scale {:.2} quality {:.2}",
                request.width,
                request.height,
                request.scale,
                request.quality,
                clamped.width,
                clamped.height,
                clamped.scale,
                clamped.quality
            );
        }
        clamped
    }
}

/// Classify an environment. Inconclusive environments are unconstrained.
pub fn classify(env: &Environment) -> DeviceProfile {
    let constrained = env
        .user_agent
        .as_deref()
        .map(|ua| {
            let ua = ua.to_ascii_lowercase();
            CONSTRAINED_MARKERS.iter().any(|marker| ua.contains(marker))
        })
        .unwrap_or(false);

    if constrained {
        DeviceProfile::constrained()
    } else {
        DeviceProfile::unconstrained()
    }
}

/// Source of the device profile for one export call.
pub trait DeviceProfiler: Send + Sync {
    /// Best-effort profile; never fails.
    fn profile(&self) -> DeviceProfile;
}

/// Reads the process environment on every call so changes between exports
/// are picked up.
#[derive(Debug, Default, Clone, Copy)]
pub struct AmbientProfiler;

impl DeviceProfiler for AmbientProfiler {
    fn profile(&self) -> DeviceProfile {
        classify(&Environment::from_process())
    }
}

/// Classifies a fixed environment description.
#[derive(Debug, Clone)]
pub struct EnvironmentProfiler {
    env: Environment,
}

impl EnvironmentProfiler {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }
}

impl DeviceProfiler for EnvironmentProfiler {
    fn profile(&self) -> DeviceProfile {
        classify(&self.env)
    }
}

/// Always returns the same profile.
#[derive(Debug, Clone, Copy)]
pub struct FixedProfiler(pub DeviceProfile);

impl DeviceProfiler for FixedProfiler {
    fn profile(&self) -> DeviceProfile {
        self.0
    }
}
