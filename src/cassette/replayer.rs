//! Replays recorded interactions from a cassette.

use std::collections::VecDeque;

use super::format::{Cassette, Interaction};

/// Serves a cassette's interactions in recording order.
pub struct CassetteReplayer {
    queue: VecDeque<Interaction>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        Self { queue: cassette.interactions.iter().cloned().collect() }
    }

    /// Return the next interaction, asserting it was recorded for the
    /// given port and method.
    ///
    /// # Panics
    ///
    /// Panics if the cassette is exhausted or the next interaction was
    /// recorded for a different port/method.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let interaction = self.queue.pop_front().unwrap_or_else(|| {
            panic!(
                "Cassette exhausted: no interaction left for port={port:?} method={method:?}."
            )
        });
        assert!(
            interaction.port == port && interaction.method == method,
            "Cassette mismatch: expected port={port:?} method={method:?}, \
             recorded port={:?} method={:?} (seq {}).",
            interaction.port,
            interaction.method,
            interaction.seq,
        );
        interaction
    }
}
