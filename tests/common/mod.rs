use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use nodu::config::Config;
use nodu::session::{Presenter, RenderCommand};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("nodu.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Configuration pointing at a mock server with no settle delay
#[allow(dead_code)]
pub fn config_for(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.server.base_url = server_uri.to_string();
    config.server.timeout_seconds = 5;
    config.chat.settle_delay_ms = 0;
    config
}

/// Presenter recording every instruction; clones share the log
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<RenderCommand>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.log.lock().unwrap().clone()
    }
}

impl Presenter for Recorder {
    fn apply(&mut self, command: RenderCommand) {
        self.log.lock().unwrap().push(command);
    }
}
