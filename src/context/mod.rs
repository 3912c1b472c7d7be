use crate::authoring::*;
mod minimal;
#[cfg(feature = "with_plain")]
mod plain;
pub use minimal::Minimal;
#[cfg(feature = "with_plain")]
pub use plain::Plain;

// ----- T H E   C O N T E X T   T R A I T ---------------------------------------------

/// The `GeodeticContext` trait defines the mode of communication between the
/// vertical transformation machinery and the external context (i.e. typically
/// resources like geoid grids).
///
/// A context is acquired once, lent to any number of
/// [VerticalTransformation](crate::vertical::VerticalTransformation)s,
/// and released when they are all gone. Since `release` consumes the context,
/// and transformations borrow it, the borrow checker rules out resolving or
/// applying anything against a released context.
///
/// The resources are read-only once acquired, so a context may be shared
/// between threads by reference.
pub trait GeodeticContext: std::fmt::Debug + Send + Sync {
    /// Set up the context from its conventional environment.
    /// Fails with `Error::ContextCreation`, and is never retried internally.
    fn acquire() -> Result<Self, Error>
    where
        Self: Sized;

    /// Release all resources owned by the context
    fn release(self)
    where
        Self: Sized,
    {
        trace!("Releasing {}", std::any::type_name::<Self>());
    }

    /// Globally defined settings. Currently only `geoid`: the (comma
    /// separated list of) geoid model grid(s) to use for all transformations,
    /// overriding the defaults of the source system
    fn globals(&self) -> BTreeMap<String, String>;

    /// Access `blob`-like resources by identifier
    fn get_blob(&self, name: &str) -> Result<Vec<u8>, Error>;

    /// Access grid resources by identifier. The format is
    /// given by the extension of the identifier
    fn get_grid(&self, name: &str) -> Result<Arc<Grid>, Error> {
        let buf = self.get_blob(name)?;
        let grid = Grid::from_blob(name, &buf)?;
        debug!(
            "Loaded grid {name}: {} rows, {} columns, {} band(s)",
            grid.rows, grid.cols, grid.bands
        );
        Ok(Arc::new(grid))
    }
}

// The settings a context understands
const KNOWN_GLOBALS: [&str; 1] = ["geoid"];

// Sanity check a set of globals
fn validate_globals(globals: &BTreeMap<String, String>) -> Result<(), Error> {
    if let Some(key) = globals.keys().find(|k| !KNOWN_GLOBALS.contains(&k.as_str())) {
        return Err(Error::ContextCreation(format!("Unknown setting: {key}")));
    }
    if let Some(geoid) = globals.get("geoid") {
        if geoid.split(',').all(|name| name.trim().is_empty()) {
            return Err(Error::ContextCreation("Empty geoid grid name".to_string()));
        }
    }
    Ok(())
}

// ----- T E S T S ------------------------------------------------------------------
