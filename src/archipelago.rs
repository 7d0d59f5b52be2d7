//! Archipelago surface
//!
//! The archipelago — the object that owns a set of islands, wires them
//! into a migration topology, and moves individuals between them — is
//! an external collaborator. This module defines only the surface an
//! island expects from it: a start barrier and the two migration hooks
//! invoked around every generation round.

use crate::island::IslandView;

/// Operations an island invokes on its archipelago while evolving.
///
/// A non-blocking island's worker waits on
/// [`sync_island_start`](Archipelago::sync_island_start) once before
/// its first round, then brackets every `Algorithm::evolve` call with
/// [`pre_evolution`](Archipelago::pre_evolution) (deliver queued
/// immigrants) and [`post_evolution`](Archipelago::post_evolution)
/// (collect emigrants). The hooks run on the island's worker thread,
/// between rounds, so the view they receive is never concurrently
/// mutated.
pub trait Archipelago: Send + Sync {
    /// Block until every sibling island has reached the barrier for
    /// the current round.
    fn sync_island_start(&self);

    /// Deliver queued immigrants to the island at the start of a round.
    fn pre_evolution(&self, island: &mut IslandView<'_>);

    /// Collect emigrants from the island at the end of a round.
    fn post_evolution(&self, island: &mut IslandView<'_>);
}
