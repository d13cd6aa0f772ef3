use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

#[derive(Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub offline: bool,
    pub api_base: Option<String>,
    pub author: Option<String>,
    pub history_limit: Option<usize>,
    pub log_file: Option<PathBuf>,
    pub token: Option<String>,
}

impl std::fmt::Debug for ConfigFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFlags")
            .field("offline", &self.offline)
            .field("api_base", &self.api_base)
            .field("author", &self.author)
            .field("history_limit", &self.history_limit)
            .field("log_file", &self.log_file)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConfigFlags {
    /// Merge `other` over `self`: booleans are OR-ed, valued options from
    /// `other` win when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            offline: self.offline || other.offline,
            api_base: other.api_base.clone().or_else(|| self.api_base.clone()),
            author: other.author.clone().or_else(|| self.author.clone()),
            history_limit: other.history_limit.or(self.history_limit),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
            token: other.token.clone().or_else(|| self.token.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("ripple").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("ripple")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("ripple").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("ripple").join("config");
        }
    }

    PathBuf::from(".ripplerc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".ripplerc")
}

/// Load a flag file. Each non-comment line holds one flag and an optional
/// value; the value runs to the end of the line.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| match line.split_once(char::is_whitespace) {
            Some((flag, value)) => vec![flag.to_owned(), value.trim().to_owned()],
            None => vec![line.to_owned()],
        })
        .collect::<Vec<_>>();
    let flags = parse_flag_tokens(&tokens);
    debug!(path = %path.display(), ?flags, "loaded config flags");
    Ok(flags)
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# ripple defaults (saved with --save)".to_string());
    if let Some(api_base) = &flags.api_base {
        lines.push(format!("--api-base {api_base}"));
    }
    if let Some(author) = &flags.author {
        lines.push(format!("--author {author}"));
    }
    if let Some(limit) = flags.history_limit {
        lines.push(format!("--history-limit {limit}"));
    }
    if flags.offline {
        lines.push("--offline".to_string());
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(token) = &flags.token {
        lines.push(format!("--token {token}"));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list, ignoring everything else.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--offline" {
            flags.offline = true;
            i += 1;
            continue;
        }
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_string())),
            _ => (token, None),
        };
        if !matches!(
            name,
            "--api-base" | "--author" | "--history-limit" | "--log-file" | "--token"
        ) {
            i += 1;
            continue;
        }
        let value = match inline_value {
            Some(value) => Some(value),
            None => {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            }
        };
        if let Some(value) = value {
            match name {
                "--api-base" => flags.api_base = Some(value),
                "--author" => flags.author = Some(value),
                "--history-limit" => {
                    flags.history_limit = value.parse().ok().filter(|limit| *limit > 0);
                }
                "--log-file" => flags.log_file = Some(PathBuf::from(value)),
                _ => flags.token = Some(value),
            }
        }
        i += 1;
    }
    flags
}
