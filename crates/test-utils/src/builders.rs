#![allow(dead_code)]

use std::sync::Arc;

use hotdlv::config::{LaunchOverrides, RunConfiguration, Settings, resolve_debug_configuration};
use hotdlv::types::OverlapPolicy;

/// Builder for `RunConfiguration`, starting from the built-in defaults.
pub struct RunConfigBuilder {
    config: RunConfiguration,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        let settings = Settings::default();
        let launch = resolve_debug_configuration(&settings, &LaunchOverrides::default());
        Self {
            config: RunConfiguration::new(&launch, &settings),
        }
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.program = program.to_string();
        self
    }

    pub fn output(mut self, output: &str) -> Self {
        self.config.output = output.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn poll_ms(mut self, ms: u64) -> Self {
        self.config.poll_raw = format!("{ms}ms");
        self.config.poll_ms = ms;
        self
    }

    pub fn watch_dir(mut self, dir: &str) -> Self {
        self.config.watch_dirs.push(dir.to_string());
        self
    }

    /// Replace the watched directories.
    pub fn watch_dirs(mut self, dirs: &[&str]) -> Self {
        self.config.watch_dirs = dirs.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn toolchain(mut self, toolchain: &str) -> Self {
        self.config.toolchain = toolchain.to_string();
        self
    }

    pub fn debug_server(mut self, server: &str) -> Self {
        self.config.debug_server = server.to_string();
        self
    }

    pub fn overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.config.overlap = overlap;
        self
    }

    pub fn use_polling(mut self, polling: bool) -> Self {
        self.config.use_polling = polling;
        self
    }

    pub fn attach_command(mut self, argv: &[&str]) -> Self {
        self.config.attach_command = Some(argv.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn build(self) -> RunConfiguration {
        self.config
    }

    pub fn shared(self) -> Arc<RunConfiguration> {
        Arc::new(self.config)
    }
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
