//! # Capture Resources
//!
//! Fonts and images a surface paints with must be available to the capture
//! context before pixels are sampled, or the export comes out with blank
//! (tainted) images and fallback glyphs.
//!
//! Resolution is a single bounded suspension point:
//! - no resources: nothing to wait for, the loader is never called
//! - all loads finish in time: failures are recorded as missing
//! - the wait bound expires: [`WaitMode::BestEffort`] proceeds with
//!   fallbacks, [`WaitMode::Strict`] fails the capture

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, warn};

use crate::error::{ExportError, ExportResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Font,
    Image,
}

/// Reference to an external resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub url: String,
    pub kind: ResourceKind,
    /// Served from another origin; must be fetched with cross-origin access
    /// so it doesn't taint the capture
    pub cross_origin: bool,
}

impl ResourceRef {
    pub fn font(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: ResourceKind::Font,
            cross_origin: false,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: ResourceKind::Image,
            cross_origin: false,
        }
    }

    pub fn cross_origin(mut self) -> Self {
        self.cross_origin = true;
        self
    }
}

/// A resource whose bytes are available to the capture context.
#[derive(Debug, Clone)]
pub struct LoadedResource {
    pub reference: ResourceRef,
    pub bytes: Vec<u8>,
}

/// Outcome of resource resolution for one capture.
#[derive(Debug, Clone, Default)]
pub struct ResolvedResources {
    loaded: Vec<LoadedResource>,
    missing: Vec<ResourceRef>,
}

impl ResolvedResources {
    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.loaded
            .iter()
            .find(|r| r.reference.url == url)
            .map(|r| r.bytes.as_slice())
    }

    pub fn loaded(&self) -> &[LoadedResource] {
        &self.loaded
    }

    pub fn fonts(&self) -> impl Iterator<Item = &LoadedResource> {
        self.loaded.iter().filter(|r| r.reference.kind == ResourceKind::Font)
    }

    pub fn missing(&self) -> &[ResourceRef] {
        &self.missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Fetches resource bytes for the capture context.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>>;
}

/// Loads `file://` URLs and plain paths, relative paths resolved against a
/// base directory.
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
    base: PathBuf,
}

impl FsResourceLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(anyhow!("network resources are not available offline: {}", url));
        }
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        })
    }
}

#[async_trait]
impl ResourceLoader for FsResourceLoader {
    async fn load(&self, resource: &ResourceRef) -> Result<Vec<u8>> {
        let path = self.resolve(&resource.url)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow!("reading {}: {}", path.display(), e))?;
        Ok(bytes)
    }
}

/// What to do when resources are not ready within the wait bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Proceed with whatever loaded; fallbacks fill the rest
    BestEffort,
    /// Fail the capture
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePolicy {
    pub timeout: Duration,
    pub mode: WaitMode,
}

impl Default for ResourcePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            mode: WaitMode::BestEffort,
        }
    }
}

/// Load every distinct resource concurrently, bounded by `policy.timeout`.
pub async fn resolve_resources(
    loader: &dyn ResourceLoader,
    refs: Vec<ResourceRef>,
    policy: &ResourcePolicy,
) -> ExportResult<ResolvedResources> {
    let mut seen = HashSet::new();
    let refs: Vec<ResourceRef> = refs.into_iter().filter(|r| seen.insert(r.url.clone())).collect();

    if refs.is_empty() {
        debug!("No capture resources declared, skipping resource wait");
        return Ok(ResolvedResources::default());
    }

    let loads = join_all(refs.iter().map(|r| loader.load(r)));
    let results = match tokio::time::timeout(policy.timeout, loads).await {
        Ok(results) => results,
        Err(_) => {
            let waited = policy.timeout.as_millis();
            return match policy.mode {
                WaitMode::BestEffort => {
                    warn!(
                        "{} capture resource(s) not ready after {}ms, continuing with fallbacks",
                        refs.len(),
                        waited
                    );
                    Ok(ResolvedResources {
                        loaded: Vec::new(),
                        missing: refs,
                    })
                }
                WaitMode::Strict => Err(ExportError::capture(
                    "resource_wait",
                    format!("{} resource(s) not ready after {}ms", refs.len(), waited),
                )
                .with_recovery_suggestion("Check your connection and try again")),
            };
        }
    };

    let mut resolved = ResolvedResources::default();
    for (reference, result) in refs.into_iter().zip(results) {
        match result {
            Ok(bytes) if !bytes.is_empty() => {
                debug!("Loaded capture resource {} ({} bytes)", reference.url, bytes.len());
                resolved.loaded.push(LoadedResource { reference, bytes });
            }
            Ok(_) => {
                warn!("Capture resource {} is empty", reference.url);
                resolved.missing.push(reference);
            }
            Err(e) => {
                warn!("Capture resource {} failed to load: {}", reference.url, e);
                resolved.missing.push(reference);
            }
        }
    }

    if policy.mode == WaitMode::Strict && !resolved.is_complete() {
        let urls: Vec<&str> = resolved.missing.iter().map(|r| r.url.as_str()).collect();
        return Err(ExportError::capture(
            "resource_wait",
            format!("unresolved resources: {}", urls.join(", ")),
        ));
    }

    Ok(resolved)
}
