// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-batch planning for strata-styled tiles.
//!
//! This crate sits between [`strata_core`]'s dispatch and backend-specific
//! tessellation. It defines:
//!
//! - [`BatchKey`]: which rule configuration and pass a batch belongs to
//! - [`DrawBatch`]: features sharing one key, with their resolved attributes
//! - [`BatchPlan`]: every batch of a tile, in draw order on demand
//! - [`BatchBuilder`]: a [`StyleBuilder`](strata_core::builder::StyleBuilder)
//!   that fills a plan

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod batch;
mod plan;

pub use batch::BatchBuilder;
pub use plan::{BatchItem, BatchKey, BatchPlan, DrawBatch};
