//! `${VAR}` references in asset locations.
//!
//! Only fields that point at assets are expanded: `emoji.root_path`,
//! stylesheet `href` and script `src`. Inline CSS and script code are never
//! touched, and a bare `$` (common in CDN paths) is kept as written.

use std::env::VarError;

use shellexpand::LookupError;

use crate::{Config, ConfigError};

impl Config {
    /// Expand environment references in every asset location, in place.
    pub(crate) fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand_in_place(&mut self.emoji.root_path, || "emoji.root_path".to_owned())?;
        for (i, style_sheet) in self.style_sheets.iter_mut().enumerate() {
            if let Some(href) = style_sheet.href.as_mut() {
                expand_in_place(href, || format!("style_sheets[{i}].href"))?;
            }
        }
        for (i, script) in self.scripts.iter_mut().enumerate() {
            if let Some(src) = script.src.as_mut() {
                expand_in_place(src, || format!("scripts[{i}].src"))?;
            }
        }
        Ok(())
    }
}

/// Replace `value` with its expansion. `field` is only built for errors.
fn expand_in_place(value: &mut String, field: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }
    let expanded = shellexpand::env_with_context(value.as_str(), |var| std::env::var(var).map(Some))
        .map_err(|err| unset(field(), &err))?
        .into_owned();
    *value = expanded;
    Ok(())
}

fn unset(field: String, err: &LookupError<VarError>) -> ConfigError {
    let message = match err.cause {
        VarError::NotPresent => format!("${{{}}} not set", err.var_name),
        VarError::NotUnicode(_) => format!("${{{}}} is not valid unicode", err.var_name),
    };
    ConfigError::EnvVar { field, message }
}
