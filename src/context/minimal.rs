use super::validate_globals;
use crate::authoring::*;

// ----- T H E   M I N I M A L   P R O V I D E R ---------------------------------------

/// A minimalistic, purely in-memory context provider.
/// Grids (parsed, or as raw blobs) are registered at run time.
/// Usually sufficient for embedded use, where the geoid model
/// is compiled into, or downloaded by, the application, and for
/// internal test authoring.
#[derive(Debug, Default)]
pub struct Minimal {
    /// Settings, cf. [GeodeticContext::globals]
    globals: BTreeMap<String, String>,
    /// Parsed grids
    grids: BTreeMap<String, Arc<Grid>>,
    /// Raw grid files, parsed on demand
    blobs: BTreeMap<String, Vec<u8>>,
}

impl GeodeticContext for Minimal {
    /// The minimal context has no environment to fail on
    fn acquire() -> Result<Minimal, Error> {
        Ok(Minimal::default())
    }

    fn release(self) {
        trace!(
            "Minimal: releasing {} grid(s) and {} blob(s)",
            self.grids.len(),
            self.blobs.len()
        );
    }

    fn globals(&self) -> BTreeMap<String, String> {
        self.globals.clone()
    }

    fn get_blob(&self, name: &str) -> Result<Vec<u8>, Error> {
        if let Some(blob) = self.blobs.get(name) {
            return Ok(blob.clone());
        }
        Err(Error::NotFound(name.to_string(), ": Blob".to_string()))
    }

    fn get_grid(&self, name: &str) -> Result<Arc<Grid>, Error> {
        if let Some(grid) = self.grids.get(name) {
            return Ok(grid.clone());
        }
        let Some(blob) = self.blobs.get(name) else {
            return Err(Error::NotFound(name.to_string(), ": Grid".to_string()));
        };
        Ok(Arc::new(Grid::from_blob(name, blob)?))
    }
}

impl Minimal {
    /// Register a parsed grid under its own name
    pub fn register_grid(&mut self, grid: Grid) {
        self.grids.insert(grid.name.clone(), Arc::new(grid));
    }

    /// Register a raw grid file (Gravsoft or GTX, cf. [Grid::from_blob])
    pub fn register_blob(&mut self, name: &str, blob: Vec<u8>) {
        self.blobs.insert(name.to_string(), blob);
    }

    /// Modify one of the settings given by [GeodeticContext::globals]
    pub fn set_global(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let mut globals = self.globals.clone();
        globals.insert(key.to_string(), value.to_string());
        validate_globals(&globals)
            .map_err(|_| Error::BadParam(key.to_string(), value.to_string()))?;
        self.globals = globals;
        Ok(())
    }
}

// ----- T E S T S ------------------------------------------------------------------
