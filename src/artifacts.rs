//! Build output discovery

use crate::domain::Version;
use crate::error::{ReleaseError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The artifact pair a release publishes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distributions {
    pub sdist: PathBuf,
    pub wheel: PathBuf,
}

impl Distributions {
    pub fn paths(&self) -> [&Path; 2] {
        [self.sdist.as_path(), self.wheel.as_path()]
    }
}

/// Remove stale artifacts so only this build can be published
pub fn clean_dist_dir(dist_dir: &Path) -> Result<()> {
    if dist_dir.exists() {
        fs::remove_dir_all(dist_dir)?;
    }
    Ok(())
}

/// Find exactly one sdist (`*-<version>.tar.gz`) and one wheel
/// (`*-<version>-*.whl`) in `dist_dir`.
pub fn collect_distributions(dist_dir: &Path, version: &Version) -> Result<Distributions> {
    let entries = fs::read_dir(dist_dir).map_err(|e| {
        ReleaseError::artifact(format!(
            "Cannot read build output {}: {}",
            dist_dir.display(),
            e
        ))
    })?;

    let sdist_suffix = format!("-{}.tar.gz", version);
    let wheel_marker = format!("-{}-", version);

    let mut sdists = Vec::new();
    let mut wheels = Vec::new();

    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if name.ends_with(&sdist_suffix) {
            sdists.push(path.clone());
        } else if name.ends_with(".whl") && name.contains(&wheel_marker) {
            wheels.push(path.clone());
        }
    }

    let sdist = exactly_one(sdists, "source distribution", version)?;
    let wheel = exactly_one(wheels, "wheel", version)?;

    Ok(Distributions { sdist, wheel })
}

fn exactly_one(mut found: Vec<PathBuf>, what: &str, version: &Version) -> Result<PathBuf> {
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(ReleaseError::artifact(format!(
            "No {} for version {} was built",
            what, version
        ))),
        n => {
            found.sort();
            Err(ReleaseError::artifact(format!(
                "Expected one {} for version {}, found {}: {:?}",
                what, version, n, found
            )))
        }
    }
}
