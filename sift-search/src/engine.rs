//! Connector contract and the registered engine descriptor.
//!
//! A [`Connector`] talks to one external provider. Once registered it is
//! wrapped in an [`Engine`], which pins its name and weight for the life of
//! the process.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, SearchError};
use crate::types::{EngineResponse, RequestOptions};

/// Weight used when a connector does not declare one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// What a connector can do. The dispatcher only calls the operations a
/// connector advertises here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Answers full search queries.
    pub search: bool,
    /// Completes partial queries.
    pub autocomplete: bool,
}

impl Capabilities {
    /// Search only.
    pub const SEARCH: Self = Self {
        search: true,
        autocomplete: false,
    };

    /// Autocomplete only.
    pub const AUTOCOMPLETE: Self = Self {
        search: false,
        autocomplete: true,
    };

    /// Both search and autocomplete.
    pub const ALL: Self = Self {
        search: true,
        autocomplete: true,
    };
}

/// A pluggable search provider backend.
///
/// Implementors build requests for one provider, call it and normalise its
/// reply into an [`EngineResponse`]. Calls may fail freely: the dispatcher
/// isolates every connector so a failure only removes that engine's
/// contribution.
///
/// All implementations must be `Send + Sync` for concurrent engine queries.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Operations this connector supports.
    fn capabilities(&self) -> Capabilities;

    /// Trust/priority multiplier used in every arbitration step.
    fn weight(&self) -> f64 {
        DEFAULT_WEIGHT
    }

    /// Run a full search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the reply cannot be
    /// parsed.
    async fn search(&self, query: &str, options: RequestOptions) -> Result<EngineResponse> {
        let _ = (query, options);
        Err(SearchError::Unsupported("search".into()))
    }

    /// Complete a partial query; the returned order is the provider's ranking.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the reply cannot be
    /// parsed.
    async fn autocomplete(&self, partial_query: &str) -> Result<Vec<String>> {
        let _ = partial_query;
        Err(SearchError::Unsupported("autocomplete".into()))
    }
}

/// A registered connector. Immutable once created.
#[derive(Clone)]
pub struct Engine {
    name: String,
    weight: f64,
    capabilities: Capabilities,
    connector: Arc<dyn Connector>,
}

impl Engine {
    /// Wrap `connector` under `name` with an explicit `weight`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the name is blank or the weight is
    /// not a positive finite number.
    pub fn new(name: impl Into<String>, weight: f64, connector: Arc<dyn Connector>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SearchError::Config("engine name must not be empty".into()));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(SearchError::Config(format!(
                "weight for {name} must be a positive number, got {weight}"
            )));
        }
        Ok(Self {
            name,
            weight,
            capabilities: connector.capabilities(),
            connector,
        })
    }

    /// Wrap `connector` under `name` using the weight it declares.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::new`].
    pub fn from_connector(name: impl Into<String>, connector: Arc<dyn Connector>) -> Result<Self> {
        let weight = connector.weight();
        Self::new(name, weight, connector)
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weight used for scoring and arbitration.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Capabilities captured at registration.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The underlying connector.
    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
