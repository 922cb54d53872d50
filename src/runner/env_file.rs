use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append `KEY=value` lines to a CI environment file (`$GITHUB_ENV`), making
/// the values visible to later workflow steps.
pub fn export(path: &Path, vars: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    for (key, value) in vars {
        // Multi-line values need the heredoc form
        if value.contains('\n') {
            writeln!(file, "{}<<PYRELEASE_EOF\n{}\nPYRELEASE_EOF", key, value)?;
        } else {
            writeln!(file, "{}={}", key, value)?;
        }
    }

    log::debug!("Exported {} variable(s) to {}", vars.len(), path.display());
    Ok(())
}
