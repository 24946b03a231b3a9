//! Card system: definitions, abilities and the catalog seam.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardDefinition`: Static card data (cost, power, optional ability)
//! - `AbilityKind`: Closed set of ability kinds, matched exhaustively
//! - `CardCatalog`: Lookup trait the engine depends on
//! - `CardRegistry`: In-memory catalog

pub mod catalog;
pub mod definition;

pub use catalog::{CardCatalog, CardRegistry};
pub use definition::{Ability, AbilityKind, CardDefinition, CardId};
