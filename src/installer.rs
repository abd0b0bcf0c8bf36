//! Locating yt-dlp, and installing it on first run.
//!
//! Resolution order: an explicit path, `yt-dlp` on `PATH`, a copy cached by
//! an earlier install, and finally a fresh download of the latest release.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Release download URL prefix.
const RELEASE_URL: &str = "https://github.com/yt-dlp/yt-dlp/releases/latest/download/";

/// Name of the binary on `PATH`.
const BINARY_NAME: &str = "yt-dlp";

/// Directory under the user cache dir holding installed tools.
const CACHE_SUBDIR: &str = "ytm-dl";

/// Release asset for the current platform.
pub fn release_asset() -> &'static str {
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("linux", "x86_64") => "yt-dlp_linux",
        ("linux", "aarch64") => "yt-dlp_linux_aarch64",
        ("macos", _) => "yt-dlp_macos",
        ("windows", _) => "yt-dlp.exe",
        // Portable zipapp, needs a python3 interpreter.
        _ => "yt-dlp",
    }
}

/// File name of an installed copy.
fn installed_name() -> &'static str {
    if cfg!(windows) {
        "yt-dlp.exe"
    } else {
        BINARY_NAME
    }
}

/// Default install location: `<cache>/ytm-dl/bin/yt-dlp`.
pub fn default_install_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(CACHE_SUBDIR).join("bin"))
}

/// Finds yt-dlp, installing it if allowed.
#[derive(Debug, Clone)]
pub struct Installer {
    explicit: Option<PathBuf>,
    search_path: Option<OsString>,
    install_dir: Option<PathBuf>,
    allow_install: bool,
    release_url: String,
}

impl Default for Installer {
    fn default() -> Self {
        Self {
            explicit: None,
            search_path: None,
            install_dir: default_install_dir(),
            allow_install: true,
            release_url: format!("{}{}", RELEASE_URL, release_asset()),
        }
    }
}

impl Installer {
    /// Create an installer with default locations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this binary and nothing else.
    pub fn with_binary<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.explicit = path.map(Into::into);
        self
    }

    /// Search these directories instead of `PATH`.
    pub fn with_search_path<S: Into<OsString>>(mut self, paths: S) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Directory to look in for, and install, a cached copy.
    pub fn with_install_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Allow or forbid downloading a release.
    pub fn with_install(mut self, allow: bool) -> Self {
        self.allow_install = allow;
        self
    }

    /// Download from another URL (a mirror or a mock server).
    pub fn with_release_url<S: Into<String>>(mut self, url: S) -> Self {
        self.release_url = url.into();
        self
    }

    /// Where a cached copy lives.
    pub fn installed_path(&self) -> Option<PathBuf> {
        self.install_dir.as_ref().map(|dir| dir.join(installed_name()))
    }

    /// Resolve the yt-dlp binary, installing it if needed.
    pub async fn resolve(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            if path.is_file() {
                return Ok(path.clone());
            }
            return Err(Error::ToolNotFound(format!(
                "{} does not exist",
                path.display()
            )));
        }

        if let Some(path) = self.find_on_path() {
            debug!("Using yt-dlp from PATH: {}", path.display());
            return Ok(path);
        }

        let target = self.installed_path().ok_or_else(|| {
            Error::ToolNotFound("not on PATH and no cache directory available".to_string())
        })?;

        if target.is_file() {
            debug!("Using cached yt-dlp: {}", target.display());
            return Ok(target);
        }

        if !self.allow_install {
            return Err(Error::ToolNotFound(
                "not on PATH and installing is disabled".to_string(),
            ));
        }

        self.install(&target).await?;
        Ok(target)
    }

    /// Look up `yt-dlp` on the configured search path, or `PATH`.
    fn find_on_path(&self) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_default();
                which::which_in(BINARY_NAME, Some(paths), cwd)
            }
            None => which::which(BINARY_NAME),
        };
        found.ok()
    }

    /// Download the release asset to `target`.
    async fn install(&self, target: &Path) -> Result<()> {
        info!("Installing yt-dlp from {} to {}", self.release_url, target.display());

        let fail = |reason: String| Error::InstallFailed {
            path: target.to_path_buf(),
            reason,
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let response = Client::new().get(&self.release_url).send().await?;
        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        // Stream into a sibling file so an interrupted download never
        // leaves a truncated binary at the final path.
        let partial = target.with_extension("part");
        let mut file = fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        if written == 0 {
            let _ = fs::remove_file(&partial).await;
            return Err(fail("empty download".to_string()));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&partial, std::fs::Permissions::from_mode(0o755)).await?;
        }

        fs::rename(&partial, target).await?;
        info!("Installed yt-dlp ({} bytes)", written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_explicit_binary_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = Installer::new().with_binary(Some(&missing)).resolve().await;
        assert!(matches!(result, Err(Error::ToolNotFound(_))));

        let present = dir.path().join("yt-dlp");
        std::fs::write(&present, b"#!/bin/sh\n").unwrap();
        let resolved = Installer::new()
            .with_binary(Some(&present))
            .resolve()
            .await
            .unwrap();
        assert_eq!(resolved, present);
    }

    #[tokio::test]
    async fn test_cached_copy_skips_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let empty_path = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::new()
            .with_search_path(empty_path.path())
            .with_install_dir(dir.path())
            .with_release_url(format!("{}/yt-dlp", server.uri()));
        let cached = installer.installed_path().unwrap();
        std::fs::write(&cached, b"cached").unwrap();

        let resolved = installer.resolve().await.unwrap();
        assert_eq!(resolved, cached);
        assert_eq!(std::fs::read(&resolved).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn test_no_install_without_cache_is_not_found() {
        let empty_path = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::new()
            .with_search_path(empty_path.path())
            .with_install_dir(dir.path())
            .with_install(false);

        let result = installer.resolve().await;
        assert!(matches!(result, Err(Error::ToolNotFound(_))));
        assert!(!installer.installed_path().unwrap().exists());
    }

    #[tokio::test]
    async fn test_install_downloads_release() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/yt-dlp"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"binary".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::new()
            .with_install_dir(dir.path())
            .with_release_url(format!("{}/yt-dlp", server.uri()));
        let target = installer.installed_path().unwrap();

        installer.install(&target).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"binary");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&target).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[tokio::test]
    async fn test_install_rejects_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::new()
            .with_install_dir(dir.path())
            .with_release_url(format!("{}/yt-dlp", server.uri()));
        let target = installer.installed_path().unwrap();

        let result = installer.install(&target).await;
        assert!(matches!(result, Err(Error::InstallFailed { .. })));
        assert!(!target.exists());
    }

    #[test]
    fn test_release_asset_is_known() {
        assert!(release_asset().starts_with("yt-dlp"));
    }
}
