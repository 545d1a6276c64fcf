use directories_next::ProjectDirs;
use std::fs;
use std::io::{self, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "sinq";
const APPLICATION: &str = "sinq";
const CONFIG_FILE: &str = "app_settings.json";

pub fn default_config_path() -> io::Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION) {
        Ok(proj_dirs.config_dir().join(CONFIG_FILE))
    } else {
        Err(io::Error::new(ErrorKind::NotFound, "Could not determine project directories for app settings."))
    }
}

fn resolve(path: Option<&Path>) -> io::Result<PathBuf> {
    path.map_or_else(default_config_path, |p| Ok(p.to_path_buf()))
}

/// Load settings from `path`, or from the per-user config file when `None`.
/// A missing file yields the defaults.
pub fn load_settings_from_file<T: for<'de> serde::de::Deserialize<'de> + Default>(path: Option<&Path>) -> io::Result<T> {
    let config_file = resolve(path)?;
    debug!("settings: Attempting to load settings from {:?}", config_file);
    match fs::File::open(&config_file) {
        Ok(file) => {
            let reader = BufReader::new(file);
            match serde_json::from_reader(reader) {
                Ok(settings) => {
                    info!("settings: Loaded settings from {:?}", config_file);
                    Ok(settings)
                }
                Err(e) => {
                    error!("settings: Failed to parse settings file {:?}: {}", &config_file, e);
                    Err(io::Error::new(ErrorKind::InvalidData, format!("Failed to parse settings file: {}", e)))
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("settings: Settings file not found at {:?}. Returning default.", config_file);
            Ok(Default::default())
        }
        Err(e) => {
            error!("settings: Failed to open settings file {:?}: {}", &config_file, e);
            Err(e)
        }
    }
}
