/// Application name used for data, cache and store directories.
pub const APP_NAME: &str = "cradle";

/// Length of the truncated SHA-256 prefix used for package ids.
pub const PACKAGE_ID_LEN: usize = 20;

/// Recipe override file looked up in a source directory.
pub const RECIPE_FILENAME: &str = "cradle.toml";

/// Toolchain file written into the generators folder.
pub const TOOLCHAIN_FILENAME: &str = "cradle_toolchain.cmake";

/// Serialized build configuration written next to the toolchain file.
pub const BUILD_CONFIG_FILENAME: &str = "build-config.json";

/// Package metadata file written into every package root.
pub const PACKAGE_MANIFEST_FILENAME: &str = "cradle-package.json";
