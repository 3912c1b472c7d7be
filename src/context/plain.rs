use super::validate_globals;
use crate::authoring::*;
use std::path::PathBuf;

// ----- T H E   P L A I N   C O N T E X T ---------------------------------------------

/// A context provider, reading grids from files in a set of resource
/// directories. A grid named `name.ext` is looked for as `<dir>/<ext>/name.ext`,
/// so e.g. `egm96_15.gtx` is found as `./geodesy/gtx/egm96_15.gtx`.
///
/// The directories are searched in order: By default the local
/// `./geodesy`, followed by `geodesy` in the user's local data
/// directory (`~/.local/share/geodesy` on Linux).
#[derive(Debug)]
pub struct Plain {
    paths: Vec<PathBuf>,
    globals: BTreeMap<String, String>,
}

impl GeodeticContext for Plain {
    fn acquire() -> Result<Plain, Error> {
        Plain::acquire_with(&Plain::default_paths(), &[])
    }

    fn release(self) {
        debug!("Plain: released context for {:?}", self.paths);
    }

    fn globals(&self) -> BTreeMap<String, String> {
        self.globals.clone()
    }

    fn get_blob(&self, name: &str) -> Result<Vec<u8>, Error> {
        let n = PathBuf::from(name);
        let ext = n
            .extension()
            .unwrap_or_default()
            .to_str()
            .unwrap_or_default();
        for path in &self.paths {
            let mut path = path.clone();
            path.push(ext);
            path.push(name);
            if let Ok(result) = std::fs::read(&path) {
                trace!("Plain: read {} bytes from {path:?}", result.len());
                return Ok(result);
            }
        }
        Err(Error::NotFound(name.to_string(), ": Blob".to_string()))
    }
}

impl Plain {
    /// The conventional resource directories: `./geodesy` and,
    /// if it can be determined, `<local data dir>/geodesy`
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        let localpath: PathBuf = [".", "geodesy"].iter().collect();
        paths.push(localpath);

        if let Some(mut userpath) = dirs::data_local_dir() {
            userpath.push("geodesy");
            paths.push(userpath);
        }
        paths
    }

    /// Set up a context reading resources from `paths`, with the settings
    /// `globals` (cf. [GeodeticContext::globals]).
    ///
    /// Non-existing directories are skipped, but at least one must exist.
    pub fn acquire_with(paths: &[PathBuf], globals: &[(&str, &str)]) -> Result<Plain, Error> {
        let existing: Vec<PathBuf> = paths.iter().filter(|p| p.is_dir()).cloned().collect();
        if existing.is_empty() {
            return Err(Error::ContextCreation(format!(
                "No resource directory found among {paths:?}"
            )));
        }

        let globals: BTreeMap<String, String> = globals
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        validate_globals(&globals)?;

        debug!("Plain: acquired context for {existing:?}");
        Ok(Plain {
            paths: existing,
            globals,
        })
    }

    /// The resource directories actually in use
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

// ----- T E S T S ------------------------------------------------------------------
