use super::{Pattern, PatternDatabase};
use std::rc::Rc;

/// A pattern collection bundled with the pattern databases of its patterns.
///
/// This is the result of a pattern collection generator. The patterns of
/// a collection are disjoint, which makes the sum of their database
/// values an admissible heuristic; [heuristic_value](Self::heuristic_value)
/// computes it. Databases are shared: cloning the [Rc]s is cheap and the
/// tables are dropped with their last owner.
pub struct PatternCollectionInformation {
    patterns: Vec<Pattern>,
    pdbs: Vec<Rc<PatternDatabase>>,
}

impl PatternCollectionInformation {
    /// Bundles a set of pattern databases into a collection.
    pub fn new(pdbs: Vec<Rc<PatternDatabase>>) -> Self {
        let patterns = pdbs
            .iter()
            .map(|pdb| pdb.pattern().clone())
            .collect::<Vec<Pattern>>();
        PatternCollectionInformation { patterns, pdbs }
    }

    /// Returns the patterns of the collection.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Returns the pattern databases of the collection, in pattern order.
    pub fn pdbs(&self) -> &[Rc<PatternDatabase>] {
        &self.pdbs
    }

    /// Returns the additive heuristic value of a concrete state: the sum
    /// of the database values of its projections.
    ///
    /// [Option::None] is returned when some database rates the state
    /// unsolvable.
    pub fn heuristic_value(&self, state: &[usize]) -> Option<u64> {
        self.pdbs.iter().try_fold(0u64, |sum, pdb| {
            pdb.value_in_concrete_state(state).map(|value| sum + value)
        })
    }
}
