// ABOUTME: Crate-wide constants: version string, module search configuration

/// The interpreter's own version, surfaced by the CLI's `--version` flag.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding `;`-separated extra module search directories,
/// consulted after the executing file's directory and the current directory.
pub const MODULESPATH_VAR: &str = "MODULESPATH";

/// Extension appended to an import path when the literal path doesn't resolve
/// to an existing file on its own.
pub const SOURCE_EXTENSION: &str = "ms";

/// Separator used to split `MODULESPATH` into individual directories.
pub const MODULESPATH_SEPARATOR: char = ';';
