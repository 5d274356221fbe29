//! Endpoint registry
//!
//! The registry is loaded once at startup and never changes afterwards. The position of an
//! endpoint in the registry is its index and every other component refers to it by that index.

use std::{fmt, fs, ops::Index, path::Path};

use log::info;

use crate::error::PulseError;

/// Identifier of a single endpoint to probe, usually a url
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Endpoint(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable ordered list of endpoints. Indices are dense and start at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    endpoints: Vec<Endpoint>,
}

impl Registry {
    pub fn new<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Registry {
            endpoints: endpoints.into_iter().map(Endpoint::new).collect(),
        }
    }

    /// Parse a newline delimited list. Surrounding whitespace and blank lines are dropped.
    pub fn parse(text: &str) -> Self {
        Registry::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Read and parse the endpoint list at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PulseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PulseError::Source {
            path: path.to_path_buf(),
            source,
        })?;

        let registry = Registry::parse(&text);
        info!("Loaded {} endpoints from {:?}", registry.len(), path);
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Endpoint> {
        self.endpoints.get(index)
    }

    /// Iterate endpoints together with their stable index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Endpoint)> {
        self.endpoints.iter().enumerate()
    }
}

impl Index<usize> for Registry {
    type Output = Endpoint;

    fn index(&self, index: usize) -> &Endpoint {
        &self.endpoints[index]
    }
}
