//! File-backed [`Backend`] used by the terminal panel.
//!
//! Usage snapshots are read from a JSON file on a poll interval, the chosen
//! browser profile is kept in a one-line file, and links open in Chrome
//! under that profile.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time;
use tracing::{debug, info, warn};

use panel_core::error::{PanelError, Result};
use panel_core::models::{Profile, UsageSnapshot};
use panel_core::profiles::{effective_selection, DEFAULT_PROFILE_ID};
use panel_core::settings::app_dir;

use crate::bridge::{Backend, BackendEvent, PanelHeight};

/// File name of the stored profile id inside the app directory.
pub const PROFILE_FILE_NAME: &str = "profile";

#[derive(Debug, Default)]
struct CachedUsage {
    usage: Option<UsageSnapshot>,
    last_error: Option<String>,
}

pub struct LocalBackend {
    usage_file: PathBuf,
    profile_file: PathBuf,
    chrome_dir: Option<PathBuf>,
    browser: PathBuf,
    cache: Mutex<CachedUsage>,
    events: mpsc::Sender<BackendEvent>,
    height: PanelHeight,
}

impl LocalBackend {
    pub fn new(
        usage_file: PathBuf,
        events: mpsc::Sender<BackendEvent>,
        height: PanelHeight,
    ) -> Self {
        Self {
            usage_file,
            profile_file: app_dir().join(PROFILE_FILE_NAME),
            chrome_dir: default_chrome_dir(),
            browser: default_browser(),
            cache: Mutex::new(CachedUsage::default()),
            events,
            height,
        }
    }

    pub fn with_profile_file(mut self, path: PathBuf) -> Self {
        self.profile_file = path;
        self
    }

    pub fn with_chrome_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.chrome_dir = dir;
        self
    }

    pub fn with_browser(mut self, browser: PathBuf) -> Self {
        self.browser = browser;
        self
    }

    pub fn usage_file(&self) -> &Path {
        &self.usage_file
    }

    /// Read and parse the usage file.
    pub fn load_usage(&self) -> Result<UsageSnapshot> {
        let content = fs::read_to_string(&self.usage_file).map_err(|source| {
            PanelError::FileRead {
                path: self.usage_file.clone(),
                source,
            }
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reload usage, update the cache and push the matching event.
    pub fn poll_once(&self) -> Result<()> {
        match self.load_usage() {
            Ok(snapshot) => {
                self.update_cache(|cache| {
                    cache.usage = Some(snapshot.clone());
                    cache.last_error = None;
                });
                self.emit(BackendEvent::UsageUpdated(snapshot));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.update_cache(|cache| cache.last_error = Some(message.clone()));
                self.emit(BackendEvent::UsageError(message));
                Err(e)
            }
        }
    }

    /// Poll every `interval`, starting immediately.
    pub fn spawn_polling(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        info!(
            file = %self.usage_file.display(),
            secs = interval.as_secs(),
            "starting usage polling"
        );
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            loop {
                ticker.tick().await;
                if self.events.is_closed() {
                    debug!("event channel closed; stopping polling");
                    break;
                }
                let backend = Arc::clone(&self);
                match tokio::task::spawn_blocking(move || backend.poll_once()).await {
                    Ok(Ok(())) => debug!("usage poll succeeded"),
                    Ok(Err(e)) => debug!(error = %e, "usage poll failed"),
                    Err(e) => warn!(error = %e, "usage poll task panicked"),
                }
            }
        })
    }

    fn update_cache(&self, f: impl FnOnce(&mut CachedUsage)) {
        match self.cache.lock() {
            Ok(mut cache) => f(&mut cache),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn read_cache<T>(&self, f: impl FnOnce(&CachedUsage) -> T) -> T {
        match self.cache.lock() {
            Ok(cache) => f(&cache),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn emit(&self, event: BackendEvent) {
        let name = event.name();
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!(event = name, "event channel full; dropping"),
            Err(TrySendError::Closed(_)) => debug!(event = name, "event channel closed"),
        }
    }
}

impl Backend for LocalBackend {
    fn get_usage(&self) -> Result<Option<UsageSnapshot>> {
        Ok(self.read_cache(|c| c.usage.clone()))
    }

    fn get_last_error(&self) -> Result<Option<String>> {
        Ok(self.read_cache(|c| c.last_error.clone()))
    }

    fn refresh_usage(&self) -> Result<()> {
        self.poll_once()
    }

    fn get_chrome_profiles(&self) -> Result<Vec<Profile>> {
        match &self.chrome_dir {
            Some(dir) => Ok(scan_chrome_profiles(dir)),
            None => Ok(Vec::new()),
        }
    }

    fn get_selected_profile(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.profile_file) {
            Ok(content) => {
                let id = content.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PanelError::FileRead {
                path: self.profile_file.clone(),
                source,
            }),
        }
    }

    fn set_selected_profile(&self, profile_id: &str) -> Result<()> {
        let write = || -> io::Result<()> {
            if let Some(parent) = self.profile_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.profile_file, profile_id)
        };
        write().map_err(|source| PanelError::FileWrite {
            path: self.profile_file.clone(),
            source,
        })?;
        info!(%profile_id, "selected profile saved");
        Ok(())
    }

    fn set_window_height(&self, height: u32) -> Result<()> {
        self.height.set(height);
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        let stored = self.get_selected_profile().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default profile");
            None
        });
        let profile = effective_selection(stored.as_deref());
        let child = Command::new(&self.browser)
            .arg(format!("--profile-directory={profile}"))
            .arg(url)
            .spawn()
            .map_err(|e| {
                PanelError::Backend(format!(
                    "failed to launch {}: {e}",
                    self.browser.display()
                ))
            })?;
        reap_in_background(child);
        debug!(%url, %profile, "opened url");
        Ok(())
    }
}

/// Wait for a launched browser process off the calling thread so it does not
/// linger as a zombie.
fn reap_in_background(mut child: Child) -> thread::JoinHandle<Option<ExitStatus>> {
    thread::spawn(move || match child.wait() {
        Ok(status) => {
            debug!(%status, "browser launcher exited");
            Some(status)
        }
        Err(e) => {
            warn!(error = %e, "could not wait for browser launcher");
            None
        }
    })
}

// ── Chrome profile discovery ──────────────────────────────────────────────────

/// List `Default` and `Profile *` directories under `chrome_dir` that carry a
/// readable `Preferences` file. `Default` comes first, then by id.
pub fn scan_chrome_profiles(chrome_dir: &Path) -> Vec<Profile> {
    let entries = match fs::read_dir(chrome_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %chrome_dir.display(), error = %e, "no chrome profile directory");
            return Vec::new();
        }
    };

    let mut profiles: Vec<Profile> = entries
        .flatten()
        .filter_map(|entry| {
            let id = entry.file_name().to_string_lossy().to_string();
            if id != DEFAULT_PROFILE_ID && !id.starts_with("Profile ") {
                return None;
            }
            read_profile(&entry.path().join("Preferences"), &id)
        })
        .collect();

    profiles.sort_by(|a, b| {
        (a.id != DEFAULT_PROFILE_ID, &a.id).cmp(&(b.id != DEFAULT_PROFILE_ID, &b.id))
    });
    profiles
}

fn read_profile(prefs_path: &Path, id: &str) -> Option<Profile> {
    let content = fs::read_to_string(prefs_path).ok()?;
    let json: serde_json::Value = match serde_json::from_str(&content) {
        Ok(json) => json,
        Err(e) => {
            debug!(path = %prefs_path.display(), error = %e, "skipping unreadable preferences");
            return None;
        }
    };
    let name = json["profile"]["name"].as_str().unwrap_or(id);
    let email = json["account_info"]
        .as_array()
        .and_then(|accounts| accounts.first())
        .and_then(|account| account["email"].as_str());
    Some(Profile::new(id, name, email))
}

fn default_chrome_dir() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::config_dir().map(|d| d.join("Google").join("Chrome"))
    } else if cfg!(windows) {
        dirs::data_local_dir().map(|d| d.join("Google").join("Chrome").join("User Data"))
    } else {
        dirs::config_dir().map(|d| d.join("google-chrome"))
    }
}

fn default_browser() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome")
    } else if cfg!(windows) {
        PathBuf::from("chrome")
    } else {
        PathBuf::from("google-chrome")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> (LocalBackend, mpsc::Receiver<BackendEvent>, PanelHeight) {
        let (tx, rx) = mpsc::channel(8);
        let height = PanelHeight::new(109);
        let backend = LocalBackend::new(dir.path().join("usage.json"), tx, height.clone())
            .with_profile_file(dir.path().join("state").join("profile"))
            .with_chrome_dir(Some(dir.path().join("chrome")));
        (backend, rx, height)
    }

    fn write_prefs(chrome: &Path, id: &str, json: &str) {
        let dir = chrome.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Preferences"), json).unwrap();
    }

    // ── usage ─────────────────────────────────────────────────────────────

    #[test]
    fn test_poll_reads_snapshot_and_emits() {
        let dir = TempDir::new().unwrap();
        let (backend, mut rx, _) = backend(&dir);
        fs::write(
            backend.usage_file(),
            r#"{"five_hour":{"utilization":37.5,"resets_at":"2025-03-10T14:00:00Z"},
                "seven_day":{"utilization":12.0,"resets_at":null}}"#,
        )
        .unwrap();

        backend.poll_once().unwrap();

        let cached = backend.get_usage().unwrap().unwrap();
        assert_eq!(cached.five_hour.unwrap().utilization, Some(37.5));
        assert!(backend.get_last_error().unwrap().is_none());
        match rx.try_recv().unwrap() {
            BackendEvent::UsageUpdated(s) => {
                assert_eq!(s.seven_day.unwrap().utilization, Some(12.0))
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_poll_failure_caches_error_and_keeps_usage() {
        let dir = TempDir::new().unwrap();
        let (backend, mut rx, _) = backend(&dir);
        fs::write(backend.usage_file(), r#"{"five_hour":{"utilization":5.0}}"#).unwrap();
        backend.poll_once().unwrap();
        let _ = rx.try_recv();

        fs::write(backend.usage_file(), "not json").unwrap();
        let err = backend.poll_once().unwrap_err();
        assert!(matches!(err, PanelError::JsonParse(_)));

        let last_error = backend.get_last_error().unwrap().unwrap();
        assert!(last_error.starts_with("Failed to parse JSON"), "{last_error}");
        assert!(backend.get_usage().unwrap().is_some());
        assert_eq!(rx.try_recv().unwrap(), BackendEvent::UsageError(last_error));
    }

    #[test]
    fn test_refresh_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let (backend, _rx, _) = backend(&dir);
        let err = backend.refresh_usage().unwrap_err();
        assert!(matches!(err, PanelError::FileRead { .. }));
    }

    #[test]
    fn test_emit_with_closed_channel_does_not_fail() {
        let dir = TempDir::new().unwrap();
        let (backend, rx, _) = backend(&dir);
        drop(rx);
        fs::write(backend.usage_file(), "{}").unwrap();
        assert!(backend.poll_once().is_ok());
    }

    // ── profiles ──────────────────────────────────────────────────────────

    #[test]
    fn test_selected_profile_round_trip() {
        let dir = TempDir::new().unwrap();
        let (backend, _rx, _) = backend(&dir);
        assert_eq!(backend.get_selected_profile().unwrap(), None);

        backend.set_selected_profile("Profile 2").unwrap();
        assert_eq!(
            backend.get_selected_profile().unwrap().as_deref(),
            Some("Profile 2")
        );
    }

    #[test]
    fn test_blank_profile_file_is_unselected() {
        let dir = TempDir::new().unwrap();
        let (backend, _rx, _) = backend(&dir);
        fs::create_dir_all(dir.path().join("state")).unwrap();
        fs::write(dir.path().join("state").join("profile"), "  \n").unwrap();
        assert_eq!(backend.get_selected_profile().unwrap(), None);
    }

    #[test]
    fn test_scan_chrome_profiles() {
        let dir = TempDir::new().unwrap();
        let chrome = dir.path().join("chrome");
        write_prefs(
            &chrome,
            "Profile 1",
            r#"{"profile":{"name":"Work"},"account_info":[{"email":"me@work.example"}]}"#,
        );
        write_prefs(&chrome, "Default", r#"{"profile":{"name":"Personal"}}"#);
        write_prefs(&chrome, "Profile 2", r#"{}"#);
        write_prefs(&chrome, "System Profile", r#"{"profile":{"name":"System"}}"#);
        write_prefs(&chrome, "Profile 3", "{ broken");
        fs::create_dir_all(chrome.join("Profile 4")).unwrap();

        let profiles = scan_chrome_profiles(&chrome);
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["Default", "Profile 1", "Profile 2"]);
        assert_eq!(profiles[0].name, "Personal");
        assert_eq!(profiles[0].email, None);
        assert_eq!(profiles[1].email.as_deref(), Some("me@work.example"));
        assert_eq!(profiles[2].name, "Profile 2");
    }

    #[test]
    fn test_missing_chrome_dir_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        let (backend, _rx, _) = backend(&dir);
        assert!(backend.get_chrome_profiles().unwrap().is_empty());
        let backend = backend.with_chrome_dir(None);
        assert!(backend.get_chrome_profiles().unwrap().is_empty());
    }

    // ── host ──────────────────────────────────────────────────────────────

    #[test]
    fn test_set_window_height_updates_shared_height() {
        let dir = TempDir::new().unwrap();
        let (backend, _rx, height) = backend(&dir);
        backend.set_window_height(205).unwrap();
        assert_eq!(height.get(), 205);
    }

    #[test]
    fn test_open_url_with_missing_browser_fails() {
        let dir = TempDir::new().unwrap();
        let (backend, _rx, _) = backend(&dir);
        let backend = backend.with_browser(dir.path().join("no-such-browser"));
        let err = backend.open_url("https://claude.ai/").unwrap_err();
        assert!(matches!(err, PanelError::Backend(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_launched_process_is_reaped() {
        let child = Command::new("sh").args(["-c", "exit 3"]).spawn().unwrap();
        let status = reap_in_background(child).join().unwrap();
        assert_eq!(status.and_then(|s| s.code()), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_url_launches_browser() {
        let dir = TempDir::new().unwrap();
        let (backend, _rx, _) = backend(&dir);
        backend.set_selected_profile("Profile 2").unwrap();
        backend
            .with_browser(PathBuf::from("true"))
            .open_url("https://claude.ai/settings/usage")
            .unwrap();
    }

    // ── async: polling ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_spawn_polling_emits_immediately() {
        let dir = TempDir::new().unwrap();
        let (backend, mut rx, _) = backend(&dir);
        fs::write(backend.usage_file(), r#"{"seven_day":{"utilization":64.0}}"#).unwrap();

        let handle = Arc::new(backend).spawn_polling(Duration::from_secs(60));
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for poll")
            .expect("channel closed");
        assert!(matches!(event, BackendEvent::UsageUpdated(_)));
        handle.abort();
    }
}
