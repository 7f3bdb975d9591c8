//! Cluster property aggregation.
//!
//! An [`Aggregator`] folds the properties of the points inside a cluster into
//! a single value as clusters merge. Raw points are first projected with
//! [`Aggregator::map`]; clusters contribute the value they already carry.
//!
//! Merge order follows the spatial index, which is unspecified. `reduce`
//! must therefore be associative and commutative for the output to be
//! deterministic; the engine does not impose a canonical order.
//!
//! # Example
//!
//! ```rust
//! use geojson::JsonObject;
//! use spatio_cluster::{ClusterBuilder, MapReduce};
//!
//! // Sum the "population" property over every cluster
//! let sum = MapReduce::new(
//!     || 0.0,
//!     |props: Option<&JsonObject>| {
//!         props
//!             .and_then(|p| p.get("population"))
//!             .and_then(|v| v.as_f64())
//!             .unwrap_or(0.0)
//!     },
//!     |acc: &mut f64, value: &f64| *acc += value,
//! )
//! .with_name("population");
//!
//! let index = ClusterBuilder::new().aggregator(sum).build().unwrap();
//! # let _ = index;
//! ```

use geojson::JsonObject;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Map/reduce pair producing cluster-level properties.
pub trait Aggregator {
    /// Accumulated value carried by each cluster.
    type Value: Clone + Serialize;

    /// Value a cluster starts from before any participant is folded in.
    fn initial(&self) -> Self::Value;

    /// Project the properties of a single input point.
    fn map(&self, properties: Option<&JsonObject>) -> Self::Value;

    /// Fold `value` into `accumulated`.
    fn reduce(&self, accumulated: &mut Self::Value, value: &Self::Value);

    /// Render an accumulated value as feature properties.
    ///
    /// Objects are merged key by key; any other value lands under `key()`.
    fn properties(&self, value: &Self::Value) -> JsonObject {
        match serde_json::to_value(value) {
            Ok(JsonValue::Object(map)) => map,
            Ok(JsonValue::Null) => JsonObject::new(),
            Ok(other) => {
                let mut map = JsonObject::new();
                map.insert(self.key().to_string(), other);
                map
            }
            Err(e) => {
                log::warn!("failed to serialize aggregate properties: {}", e);
                JsonObject::new()
            }
        }
    }

    /// Property name used for non-object values.
    fn key(&self) -> &str {
        "aggregate"
    }
}

/// Placeholder for an engine without aggregation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAggregation;

impl Aggregator for NoAggregation {
    type Value = ();

    fn initial(&self) {}

    fn map(&self, _properties: Option<&JsonObject>) {}

    fn reduce(&self, _accumulated: &mut (), _value: &()) {}
}

/// Aggregator assembled from closures.
pub struct MapReduce<V, I, M, R> {
    initial: I,
    map: M,
    reduce: R,
    name: String,
    _value: std::marker::PhantomData<fn() -> V>,
}

impl<V, I, M, R> MapReduce<V, I, M, R>
where
    V: Clone + Serialize,
    I: Fn() -> V,
    M: Fn(Option<&JsonObject>) -> V,
    R: Fn(&mut V, &V),
{
    pub fn new(initial: I, map: M, reduce: R) -> Self {
        Self {
            initial,
            map,
            reduce,
            name: "aggregate".to_string(),
            _value: std::marker::PhantomData,
        }
    }

    /// Property name for scalar accumulators.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Identity projection used by [`MapReduce::from_reducer`].
fn clone_properties(properties: Option<&JsonObject>) -> JsonObject {
    properties.cloned().unwrap_or_default()
}

impl<R> MapReduce<JsonObject, fn() -> JsonObject, fn(Option<&JsonObject>) -> JsonObject, R>
where
    R: Fn(&mut JsonObject, &JsonObject),
{
    /// Fold raw point properties with `reduce`, starting from an empty object.
    ///
    /// Points contribute their properties unchanged, so `reduce` sees the
    /// input properties of a point or the accumulated object of a cluster.
    pub fn from_reducer(reduce: R) -> Self {
        Self::new(JsonObject::new, clone_properties, reduce)
    }
}

impl<V, I, M, R> Aggregator for MapReduce<V, I, M, R>
where
    V: Clone + Serialize,
    I: Fn() -> V,
    M: Fn(Option<&JsonObject>) -> V,
    R: Fn(&mut V, &V),
{
    type Value = V;

    fn initial(&self) -> V {
        (self.initial)()
    }

    fn map(&self, properties: Option<&JsonObject>) -> V {
        (self.map)(properties)
    }

    fn reduce(&self, accumulated: &mut V, value: &V) {
        (self.reduce)(accumulated, value)
    }

    fn key(&self) -> &str {
        &self.name
    }
}

impl<V, I, M, R> std::fmt::Debug for MapReduce<V, I, M, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapReduce").field("name", &self.name).finish()
    }
}
