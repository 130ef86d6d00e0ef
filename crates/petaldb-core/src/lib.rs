//! petaldb runtime: value/record model, store contract, entity models, and
//! the executors that keep cross-document denormalizations consistent.
//!
//! ## Module layout
//! - `types`: the `Value`/`Record` document model and record field readers.
//! - `store`: the `DocumentStore` contract, write batches, subscriptions, and
//!   the in-memory reference store.
//! - `model`: entity types for the shop and film domains, plus the `Entity`
//!   trait the executors are generic over.
//! - `db`: the `Db` handle, `DbSession`, and the add/load/update/delete
//!   executors (including snapshot propagation and delete-side cleanup).
//! - `watch`: the change-notification bridge over store subscriptions.

pub mod db;
pub mod error;
pub mod model;
pub mod store;
pub mod types;
pub mod watch;

pub use error::Error;
