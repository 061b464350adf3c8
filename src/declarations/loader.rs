use super::types::Declarations;

use anyhow::Context;
use std::fs;
use std::path::Path;

/// Load declarations from a TOML file
pub fn load_declarations<P: AsRef<Path>>(path: P) -> anyhow::Result<Declarations> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading declarations from '{}'", path.display()))?;
    load_declarations_from_string(&content)
        .with_context(|| format!("parsing declarations in '{}'", path.display()))
}

/// Load declarations from a string
pub fn load_declarations_from_string(content: &str) -> anyhow::Result<Declarations> {
    let declarations: Declarations = toml::from_str(content)?;
    Ok(declarations)
}
