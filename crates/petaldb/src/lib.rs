//! ## Crate layout
//! - `base`: constraint-violation taxonomy, enumerations, and pure field
//!   validators.
//! - `core`: runtime value model, store contract, entity models, executors,
//!   and the change-notification bridge.
//!
//! The `prelude` module mirrors the surface an embedding admin backend uses.

pub use petaldb_base as base;
pub use petaldb_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use petaldb_core::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::base::{ConstraintViolation, Enumeration};
    pub use crate::core::{
        db::{Db, DbSession, Mutable as _, Retract as _, UpdateOutcome},
        error::Error,
        model::{
            Entity as _, RecordId,
            film::{
                Actor, Director, Movie, MoviePatch, MovieSlots, PersonLike as _, PersonPatch,
                PersonSlots,
            },
            shop::{
                LineEntry, Order, OrderLine, OrderLineSlots, OrderPatch, OrderSlots, Product,
                ProductPatch, ProductSlots,
            },
        },
        store::{DocumentStore as _, MemoryStore, Subscription, WriteBatch},
        watch::{ChangeEvent, ChangeKind, ChangeSink},
    };
}
