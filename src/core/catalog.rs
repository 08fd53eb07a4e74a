//! Synthetic query definitions and the immutable catalog built from them.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::cost::{generate_cost, ResourceCost};

/// Identifier of a catalog query.
pub type QueryId = Uuid;

/// Which resource a query is bound by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// CPU-bound.
    Cpu,
    /// IO-bound.
    Io,
    /// Memory-bound.
    Memory,
}

impl Profile {
    /// Profiles in catalog rotation order.
    pub const ROTATION: [Self; 3] = [Self::Cpu, Self::Io, Self::Memory];

    /// Profile assigned to catalog slot `index`.
    #[must_use]
    pub const fn for_index(index: usize) -> Self {
        Self::ROTATION[index % Self::ROTATION.len()]
    }
}

/// A synthetic query with a fixed cost profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    id: QueryId,
    profile: Profile,
    cost: ResourceCost,
}

impl Query {
    /// Build a query with explicit costs.
    #[must_use]
    pub fn new(profile: Profile, cost: ResourceCost) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile,
            cost,
        }
    }

    /// Build a query with costs drawn for `profile`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, profile: Profile) -> Self {
        Self::new(profile, generate_cost(rng, profile))
    }

    /// Query identifier.
    #[must_use]
    pub const fn id(&self) -> QueryId {
        self.id
    }

    /// Profile the costs were generated from.
    #[must_use]
    pub const fn profile(&self) -> Profile {
        self.profile
    }

    /// Resource cost of one execution.
    #[must_use]
    pub const fn cost(&self) -> ResourceCost {
        self.cost
    }
}

/// Ordered, immutable set of queries.
#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    queries: Vec<Arc<Query>>,
}

impl QueryCatalog {
    /// Generate `n` queries, cycling profiles CPU, IO, Memory.
    pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let queries = (0..n)
            .map(|i| Arc::new(Query::generate(rng, Profile::for_index(i))))
            .collect();
        Self { queries }
    }

    /// Wrap pre-built queries.
    #[must_use]
    pub fn from_queries(queries: Vec<Query>) -> Self {
        Self {
            queries: queries.into_iter().map(Arc::new).collect(),
        }
    }

    /// Number of queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// True when the catalog holds no queries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Query at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<Query>> {
        self.queries.get(index)
    }

    /// All queries in catalog order.
    #[must_use]
    pub fn queries(&self) -> &[Arc<Query>] {
        &self.queries
    }

    /// Iterate queries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Query>> {
        self.queries.iter()
    }
}
