use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormpilotConfig {
    #[serde(default)]
    pub timings: Timings,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Pauses and deadlines used by an automation run, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "default_keystroke_delay_ms")]
    pub keystroke_delay_ms: u64,
    #[serde(default = "default_search_settle_ms")]
    pub search_settle_ms: u64,
    #[serde(default = "default_selection_settle_ms")]
    pub selection_settle_ms: u64,
    #[serde(default = "default_fill_settle_ms")]
    pub fill_settle_ms: u64,
    #[serde(default = "default_form_timeout_ms")]
    pub form_timeout_ms: u64,
    #[serde(default = "default_option_timeout_ms")]
    pub option_timeout_ms: u64,
    #[serde(default = "default_page_ready_delay_ms")]
    pub page_ready_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            keystroke_delay_ms: default_keystroke_delay_ms(),
            search_settle_ms: default_search_settle_ms(),
            selection_settle_ms: default_selection_settle_ms(),
            fill_settle_ms: default_fill_settle_ms(),
            form_timeout_ms: default_form_timeout_ms(),
            option_timeout_ms: default_option_timeout_ms(),
            page_ready_delay_ms: default_page_ready_delay_ms(),
        }
    }
}

impl Timings {
    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }

    pub fn search_settle(&self) -> Duration {
        Duration::from_millis(self.search_settle_ms)
    }

    pub fn selection_settle(&self) -> Duration {
        Duration::from_millis(self.selection_settle_ms)
    }

    pub fn fill_settle(&self) -> Duration {
        Duration::from_millis(self.fill_settle_ms)
    }

    pub fn form_timeout(&self) -> Duration {
        Duration::from_millis(self.form_timeout_ms)
    }

    pub fn option_timeout(&self) -> Duration {
        Duration::from_millis(self.option_timeout_ms)
    }

    pub fn page_ready_delay(&self) -> Duration {
        Duration::from_millis(self.page_ready_delay_ms)
    }
}

fn default_keystroke_delay_ms() -> u64 {
    150
}

fn default_search_settle_ms() -> u64 {
    1500
}

fn default_selection_settle_ms() -> u64 {
    500
}

fn default_fill_settle_ms() -> u64 {
    300
}

fn default_form_timeout_ms() -> u64 {
    3000
}

fn default_option_timeout_ms() -> u64 {
    5000
}

fn default_page_ready_delay_ms() -> u64 {
    2000
}

/// Per-profile adjustments layered over the configured [`Timings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keystroke_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_ready_delay_ms: Option<u64>,
}

impl TimingOverrides {
    pub fn apply(&self, base: &Timings) -> Timings {
        Timings {
            keystroke_delay_ms: self.keystroke_delay_ms.unwrap_or(base.keystroke_delay_ms),
            search_settle_ms: self.search_settle_ms.unwrap_or(base.search_settle_ms),
            selection_settle_ms: self
                .selection_settle_ms
                .unwrap_or(base.selection_settle_ms),
            fill_settle_ms: self.fill_settle_ms.unwrap_or(base.fill_settle_ms),
            form_timeout_ms: self.form_timeout_ms.unwrap_or(base.form_timeout_ms),
            option_timeout_ms: self.option_timeout_ms.unwrap_or(base.option_timeout_ms),
            page_ready_delay_ms: self
                .page_ready_delay_ms
                .unwrap_or(base.page_ready_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Show the browser window instead of running headless.
    #[serde(default)]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesConfig {
    #[serde(default = "default_auto_load")]
    pub auto_load: bool,
    #[serde(default = "default_profile_paths")]
    pub profile_paths: Vec<PathBuf>,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            auto_load: default_auto_load(),
            profile_paths: default_profile_paths(),
        }
    }
}

fn default_auto_load() -> bool {
    true
}

fn default_profile_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".formpilot").join("profiles"));
    }
    paths.push(PathBuf::from("./profiles"));
    paths
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_overlay")]
    pub overlay: bool,
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            overlay: default_overlay(),
            dismiss_after_ms: default_dismiss_after_ms(),
        }
    }
}

fn default_overlay() -> bool {
    true
}

fn default_dismiss_after_ms() -> u64 {
    5000
}
