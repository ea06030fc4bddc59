use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::render::RenderOptions;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".ccmark.toml";

/// Extensions treated as C/C++ sources when walking directories.
const DEFAULT_EXTENSIONS: &[&str] =
    &["c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "inl", "ipp"];

/// Stylesheet linked from generated documents unless overridden.
const DEFAULT_CSS: &str = "style.css";

/// Columns per tab stop unless overridden.
const DEFAULT_TAB_SIZE: usize = 4;

/// Project configuration loaded from `.ccmark.toml`, then overridden by
/// command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Stylesheet linked from each generated document.
    pub css: String,
    /// Source extensions picked up when an input is a directory.
    pub extensions: Vec<String>,
    /// Width of zero-padded line numbers; `0` disables them.
    pub line_number_width: usize,
    /// Names always classified as macros, e.g. export attributes defined in
    /// a header that is never parsed.
    pub macros: Vec<String>,
    /// Emit bare HTML bodies.
    pub no_header: bool,
    /// Directory for generated files; next to each source when absent.
    pub output_dir: Option<PathBuf>,
    /// Columns per tab stop.
    pub tab_size: usize,
}

/// Raw TOML structure for `.ccmark.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct CcmarkTomlConfig {
    /// Stylesheet linked from each document.
    #[serde(default)]
    css: Option<String>,
    /// Source extensions used when walking directories.
    #[serde(default)]
    extensions: Option<Vec<String>>,
    /// Zero-padded line number width; 0 disables them.
    #[serde(default)]
    line_number_width: Option<usize>,
    /// Names always classified as macros.
    #[serde(default)]
    macros: Vec<String>,
    /// Emit bare markup without the document header.
    #[serde(default)]
    no_header: bool,
    /// Directory collecting every rendered file.
    #[serde(default)]
    output_dir: Option<PathBuf>,
    /// Columns per tab stop.
    #[serde(default)]
    tab_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            css: DEFAULT_CSS.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            line_number_width: 0,
            macros: Vec::new(),
            no_header: false,
            output_dir: None,
            tab_size: DEFAULT_TAB_SIZE,
        };
    }
}

impl Config {
    /// Whether `path` has one of the configured source extensions.
    pub fn is_source(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| return e.to_str()) else {
            return false;
        };
        return self.extensions.iter().any(|known| return known.eq_ignore_ascii_case(ext));
    }

    /// Configured macro names as a lookup set.
    pub fn known_macros(&self) -> HashSet<String> {
        return self.macros.iter().cloned().collect();
    }

    /// Load `.ccmark.toml` from `root`. Returns defaults if the file doesn't
    /// exist; a file that exists but is malformed is an error, never
    /// silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Load an explicitly named config file, which must exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if `path` does not exist, `Error::Io`
    /// if it cannot be read, or `Error::TomlDe` if the TOML is malformed.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Where the HTML for `source` goes: `<output_dir>/<file name>.html`, or
    /// `<source>.html` next to it.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let mut name = source.file_name().map(|n| return n.to_os_string()).unwrap_or_default();
        name.push(".html");
        return match &self.output_dir {
            Some(dir) => dir.join(name),
            None => source.with_file_name(name),
        };
    }

    /// Parse config text, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: CcmarkTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        return Ok(Self {
            css: raw.css.unwrap_or(defaults.css),
            extensions: raw.extensions.unwrap_or(defaults.extensions),
            line_number_width: raw.line_number_width.unwrap_or(defaults.line_number_width),
            macros: raw.macros,
            no_header: raw.no_header,
            output_dir: raw.output_dir,
            tab_size: raw.tab_size.filter(|n| return *n > 0).unwrap_or(defaults.tab_size),
        });
    }

    /// Layout options for one rendered file.
    pub fn render_options(&self, title: &str) -> RenderOptions {
        return RenderOptions {
            line_number_width: self.line_number_width,
            no_header: self.no_header,
            stylesheet: self.css.clone(),
            tab_size: self.tab_size,
            title: title.to_string(),
        };
    }
}
