use crate::consts::APP_NAME;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathsError {
  #[error("{0} is not set, cannot locate the store or build cache")]
  MissingEnv(&'static str),
}

fn env_dir(name: &'static str) -> Result<PathBuf, PathsError> {
  match std::env::var_os(name) {
    Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
    _ => Err(PathsError::MissingEnv(name)),
  }
}

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Result<PathBuf, PathsError> {
  env_dir("USERPROFILE")
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Result<PathBuf, PathsError> {
  env_dir("HOME")
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> Result<PathBuf, PathsError> {
  Ok(env_dir("APPDATA")?.join(APP_NAME))
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> Result<PathBuf, PathsError> {
  let data_home = match env_dir("XDG_DATA_HOME") {
    Ok(dir) => dir,
    Err(_) => home_dir()?.join(".local").join("share"),
  };
  Ok(data_home.join(APP_NAME))
}

/// Returns the directory for cache files for the application
#[cfg(windows)]
pub fn cache_dir() -> Result<PathBuf, PathsError> {
  Ok(env_dir("LOCALAPPDATA")?.join(APP_NAME).join("Cache"))
}

/// Returns the directory for cache files for the application
#[cfg(not(windows))]
pub fn cache_dir() -> Result<PathBuf, PathsError> {
  let cache_home = match env_dir("XDG_CACHE_HOME") {
    Ok(dir) => dir,
    Err(_) => home_dir()?.join(".cache"),
  };
  Ok(cache_home.join(APP_NAME))
}

/// Root of the package store. `CRADLE_STORE` wins over the data directory.
pub fn store_dir() -> Result<PathBuf, PathsError> {
  if let Ok(path) = env_dir("CRADLE_STORE") {
    return Ok(path);
  }
  Ok(data_dir()?.join("store"))
}

/// Root for exported sources and build trees of `create`. `CRADLE_CACHE`
/// wins over the cache directory.
pub fn builds_dir() -> Result<PathBuf, PathsError> {
  let base = match env_dir("CRADLE_CACHE") {
    Ok(dir) => dir,
    Err(_) => cache_dir()?,
  };
  Ok(base.join("builds"))
}
