// core/src/allocator.rs

//! Free-identifier suggestions for new products.

use crate::models::Product;
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Ids the allocator searches for free slots.
pub const ID_RANGE: RangeInclusive<u32> = 1..=100;

/// Upper bound on how many free ids are suggested at once.
pub const MAX_SUGGESTED_IDS: usize = 20;

/// Snapshot of identifier usage, serialized with the wire names the front end reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdAllocation {
  #[serde(rename = "idsOcupados")]
  pub occupied: Vec<u32>,
  #[serde(rename = "idsDisponibles")]
  pub available: Vec<u32>,
  #[serde(rename = "totalProductos")]
  pub total: usize,
}

/// Computes occupied and free ids for the given record set.
///
/// `occupied` lists every stored id, including ids outside `ID_RANGE`, sorted
/// ascending. `available` is empty when the whole range is taken.
pub fn allocate(products: &[Product]) -> IdAllocation {
  let mut occupied: Vec<u32> = products.iter().map(|p| p.id).collect();
  occupied.sort_unstable();

  let taken: BTreeSet<u32> = occupied.iter().copied().collect();
  let available = ID_RANGE
    .filter(|id| !taken.contains(id))
    .take(MAX_SUGGESTED_IDS)
    .collect();

  IdAllocation {
    occupied,
    available,
    total: products.len(),
  }
}
