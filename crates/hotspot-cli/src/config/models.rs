use hotspot::engine::config::DesignConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub structure: PathBuf,
    pub relaxed: PathBuf,
    pub core_config: DesignConfig,
}
