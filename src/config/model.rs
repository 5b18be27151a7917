// src/config/model.rs

use serde::Deserialize;

use crate::types::OverlapPolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [hotdlv]
/// program = "./cmd/http"
/// output = "./.tmp/app"
/// port = 40000
/// poll = "500ms"
/// watch_dirs = ["./cmd", "./internal"]
/// ```
///
/// Every key is optional. A file with no `[hotdlv]` section yields the
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub hotdlv: RawSettings,
}

/// `[hotdlv]` section before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSettings {
    /// Entry point passed to `<toolchain> build`.
    #[serde(default = "default_program")]
    pub program: String,

    /// Output binary path template, relative to the workspace. The platform
    /// executable suffix is appended.
    #[serde(default = "default_output")]
    pub output: String,

    /// Port the headless debug server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Watch poll interval, e.g. `"500ms"` or `"2s"`. Malformed values fall
    /// back to 500ms instead of failing.
    #[serde(default = "default_poll")]
    pub poll: String,

    /// Directories to watch, relative to the workspace.
    #[serde(default = "default_watch_dirs", alias = "watchDirs")]
    pub watch_dirs: Vec<String>,

    /// Build toolchain executable.
    #[serde(default = "default_toolchain")]
    pub toolchain: String,

    /// Headless debug server executable.
    #[serde(default = "default_debug_server")]
    pub debug_server: String,

    /// Directory (relative to the workspace) holding retained binaries.
    #[serde(default = "default_bin_dir")]
    pub bin_dir: String,

    /// Filename prefix of retained binaries; all but the newest are removed
    /// after each successful build.
    #[serde(default = "default_binary_prefix")]
    pub binary_prefix: String,

    /// Glob patterns (relative to the workspace) whose changes never trigger
    /// a restart.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Use a polling watcher (interval = `poll`) instead of native events.
    #[serde(default = "default_use_polling")]
    pub use_polling: bool,

    #[serde(default)]
    pub overlap: OverlapPolicy,

    /// Command that attaches a debugger client, as an argv list. `{host}` and
    /// `{port}` are substituted. When absent the endpoint is only announced.
    #[serde(default)]
    pub attach_command: Option<Vec<String>>,
}

pub(crate) fn default_program() -> String {
    "./cmd/http".to_string()
}

pub(crate) fn default_output() -> String {
    "./.tmp/app".to_string()
}

pub(crate) fn default_port() -> u16 {
    40000
}

pub(crate) fn default_poll() -> String {
    "500ms".to_string()
}

pub(crate) fn default_watch_dirs() -> Vec<String> {
    vec!["./cmd".to_string(), "./internal".to_string()]
}

fn default_toolchain() -> String {
    "go".to_string()
}

fn default_debug_server() -> String {
    "dlv".to_string()
}

fn default_bin_dir() -> String {
    "bin".to_string()
}

fn default_binary_prefix() -> String {
    "app-".to_string()
}

fn default_ignore() -> Vec<String> {
    vec![
        "**/bin/**".to_string(),
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
    ]
}

fn default_use_polling() -> bool {
    true
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            output: default_output(),
            port: default_port(),
            poll: default_poll(),
            watch_dirs: default_watch_dirs(),
            toolchain: default_toolchain(),
            debug_server: default_debug_server(),
            bin_dir: default_bin_dir(),
            binary_prefix: default_binary_prefix(),
            ignore: default_ignore(),
            use_polling: default_use_polling(),
            overlap: OverlapPolicy::default(),
            attach_command: None,
        }
    }
}

/// Validated `[hotdlv]` settings.
///
/// Only obtainable through `TryFrom<RawSettings>` (see `validate.rs`) or
/// [`Settings::default`], so holders can rely on the invariants checked
/// there.
#[derive(Debug, Clone)]
pub struct Settings {
    raw: RawSettings,
}

impl Settings {
    pub(crate) fn new_unchecked(raw: RawSettings) -> Self {
        Self { raw }
    }

    pub fn program(&self) -> &str {
        &self.raw.program
    }

    pub fn output(&self) -> &str {
        &self.raw.output
    }

    pub fn port(&self) -> u16 {
        self.raw.port
    }

    pub fn poll(&self) -> &str {
        &self.raw.poll
    }

    pub fn watch_dirs(&self) -> &[String] {
        &self.raw.watch_dirs
    }

    pub fn toolchain(&self) -> &str {
        &self.raw.toolchain
    }

    pub fn debug_server(&self) -> &str {
        &self.raw.debug_server
    }

    pub fn bin_dir(&self) -> &str {
        &self.raw.bin_dir
    }

    pub fn binary_prefix(&self) -> &str {
        &self.raw.binary_prefix
    }

    pub fn ignore(&self) -> &[String] {
        &self.raw.ignore
    }

    pub fn use_polling(&self) -> bool {
        self.raw.use_polling
    }

    pub fn overlap(&self) -> OverlapPolicy {
        self.raw.overlap
    }

    pub fn attach_command(&self) -> Option<&[String]> {
        self.raw.attach_command.as_deref()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new_unchecked(RawSettings::default())
    }
}
