use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Resolve the server home directory to an absolute path.
///
/// - `None` → `<user home>/<default_subdir>`
/// - `~` or `~/rest` → expanded against the user home
/// - relative paths → joined onto the current working directory
///
/// With `create`, the directory is created if missing.
pub fn resolve_home_dir(raw: Option<String>, default_subdir: &str, create: bool) -> Result<PathBuf> {
    let resolved = match raw {
        None => user_home()?.join(default_subdir),
        Some(raw) => expand(&raw)?,
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("cannot create home dir {}", resolved.display()))?;
    }
    Ok(resolved)
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("cannot determine the user home directory"))
}

fn expand(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }

    let p = Path::new(raw);
    if p.is_absolute() {
        Ok(p.to_path_buf())
    } else {
        let cwd = std::env::current_dir().context("cannot read current dir")?;
        Ok(cwd.join(p))
    }
}
