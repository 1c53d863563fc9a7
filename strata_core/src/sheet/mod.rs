// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style sheet data model.
//!
//! A *style sheet* is a forest of layers. Each layer has:
//!
//! - An identity ([`LayerId`]): an index handle tagged with the issuing
//!   sheet, so handles from another sheet are rejected.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Depth is fixed at creation: roots are 0, sublayers one deeper than
//!   their parent.
//! - A [`Filter`] deciding which features the layer (and its subtree) applies
//!   to, and a visibility flag that disables the subtree outright.
//! - Rule definitions ([`RuleData`], addressed by [`DefinitionId`]): named
//!   blocks of style parameters. Definitions that share a name share a
//!   [`RuleId`] and cascade into one resolved rule.
//!
//! Layers and definitions are stored in struct-of-arrays layout. The sheet is
//! built once, then shared read-only (it is `Send + Sync`).

mod filter;
mod id;
mod store;
mod traverse;

pub use filter::{Filter, KEY_GEOMETRY, KEY_ZOOM};
pub use id::{DefinitionId, INVALID, LayerId, ParamRef, RuleId};
pub use store::{RuleData, StyleSheet};
pub use traverse::Sublayers;
