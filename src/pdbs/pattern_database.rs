use super::Pattern;
use crate::planning::ProjectedTask;
use std::{cmp::Reverse, collections::BinaryHeap};

/// A pattern database: the table of perfect goal distances of a projection.
///
/// An abstract state is an assignment to the pattern variables. The
/// database maps every abstract state to the cost of a cheapest abstract
/// plan reaching an abstract goal state from it, or to no value at all
/// when no such plan exists. Distances are computed at construction time
/// by a backward uniform-cost search seeded with all abstract goal
/// states.
///
/// # Example
///
/// ```
/// # use rupaco::pdbs::{Pattern, PatternDatabase};
/// # use rupaco::planning::{Effect, FactPair, Operator, ProjectedTask, Task};
/// let task = Task::new(
///     vec![2],
///     vec![0],
///     vec![FactPair::new(0, 1)],
///     vec![Operator::new(
///         vec![],
///         vec![Effect::unconditional(FactPair::new(0, 1))],
///         1,
///     )],
/// )
/// .unwrap();
/// let projection = ProjectedTask::new(&task, &Pattern::singleton(0));
/// let pdb = PatternDatabase::new(&projection);
/// assert_eq!(2, pdb.size());
/// assert_eq!(Some(1), pdb.value(&[0]));
/// assert_eq!(Some(0), pdb.value(&[1]));
/// ```
pub struct PatternDatabase {
    pattern: Pattern,
    multipliers: Vec<usize>,
    distances: Vec<Option<u64>>,
}

impl PatternDatabase {
    /// Builds the pattern database of a projection.
    pub fn new(projection: &ProjectedTask) -> Self {
        let projected = projection.task();
        let n_vars = projected.n_variables();
        let mut multipliers = Vec::with_capacity(n_vars);
        let mut num_states = 1usize;
        for var in 0..n_vars {
            multipliers.push(num_states);
            num_states = num_states
                .checked_mul(projected.domain_size(var))
                .expect("the abstract state space does not fit in memory");
        }
        let decode = |rank: usize, values: &mut Vec<usize>| {
            values.clear();
            for var in 0..n_vars {
                values.push((rank / multipliers[var]) % projected.domain_size(var));
            }
        };
        let rank = |values: &[usize]| {
            values
                .iter()
                .zip(multipliers.iter())
                .map(|(&value, &multiplier)| value * multiplier)
                .sum::<usize>()
        };

        // Transposed transition relation: backward[t] holds the sources of
        // the abstract transitions leading to t, with their costs.
        let mut backward: Vec<Vec<(usize, u64)>> = (0..num_states).map(|_| vec![]).collect();
        let mut distances: Vec<Option<u64>> = vec![None; num_states];
        let mut heap = BinaryHeap::new();
        let mut values = Vec::with_capacity(n_vars);
        for state in 0..num_states {
            decode(state, &mut values);
            for op in projected.operators() {
                if op.is_applicable_in(&values) {
                    let successor = rank(&op.successor(&values));
                    if successor != state {
                        backward[successor].push((state, op.cost()));
                    }
                }
            }
            if projected.is_goal_state(&values) {
                distances[state] = Some(0);
                heap.push(Reverse((0u64, state)));
            }
        }
        while let Some(Reverse((distance, state))) = heap.pop() {
            if distances[state] != Some(distance) {
                continue;
            }
            for &(source, cost) in &backward[state] {
                let new_distance = distance + cost;
                if distances[source].map_or(true, |old| new_distance < old) {
                    distances[source] = Some(new_distance);
                    heap.push(Reverse((new_distance, source)));
                }
            }
        }

        PatternDatabase {
            pattern: projection.pattern().clone(),
            multipliers,
            distances,
        }
    }

    /// Returns the pattern this database was built for.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the number of abstract states of this database.
    pub fn size(&self) -> usize {
        self.distances.len()
    }

    /// Returns the goal distance of an abstract state, given as the values
    /// of the pattern variables in pattern order.
    ///
    /// [Option::None] is returned when no abstract goal state is reachable
    /// from the given state.
    pub fn value(&self, abstract_state: &[usize]) -> Option<u64> {
        debug_assert_eq!(self.pattern.len(), abstract_state.len());
        let rank = abstract_state
            .iter()
            .zip(self.multipliers.iter())
            .map(|(&value, &multiplier)| value * multiplier)
            .sum::<usize>();
        self.distances[rank]
    }

    /// Returns the goal distance of the abstract state a full concrete
    /// assignment projects onto.
    pub fn value_in_concrete_state(&self, state: &[usize]) -> Option<u64> {
        let abstract_state = self
            .pattern
            .variables()
            .iter()
            .map(|&var| state[var])
            .collect::<Vec<usize>>();
        self.value(&abstract_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{Effect, FactPair, Operator, Task};

    fn chain_task() -> Task {
        Task::new(
            vec![2, 2],
            vec![0, 0],
            vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            vec![
                Operator::new(
                    vec![FactPair::new(0, 0)],
                    vec![Effect::unconditional(FactPair::new(0, 1))],
                    1,
                ),
                Operator::new(
                    vec![FactPair::new(0, 1)],
                    vec![Effect::unconditional(FactPair::new(1, 1))],
                    1,
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_distances_on_chain() {
        let task = chain_task();
        let projection = ProjectedTask::new(&task, &Pattern::new(vec![0, 1]));
        let pdb = PatternDatabase::new(&projection);
        assert_eq!(4, pdb.size());
        assert_eq!(Some(2), pdb.value(&[0, 0]));
        assert_eq!(Some(1), pdb.value(&[1, 0]));
        assert_eq!(Some(1), pdb.value(&[0, 1]));
        assert_eq!(Some(0), pdb.value(&[1, 1]));
    }

    #[test]
    fn test_unreachable_goal_has_no_value() {
        let task = Task::new(vec![2], vec![0], vec![FactPair::new(0, 1)], vec![]).unwrap();
        let projection = ProjectedTask::new(&task, &Pattern::singleton(0));
        let pdb = PatternDatabase::new(&projection);
        assert_eq!(None, pdb.value(&[0]));
        assert_eq!(Some(0), pdb.value(&[1]));
    }

    #[test]
    fn test_operator_costs_are_added() {
        let task = Task::new(
            vec![3],
            vec![0],
            vec![FactPair::new(0, 2)],
            vec![
                Operator::new(
                    vec![FactPair::new(0, 0)],
                    vec![Effect::unconditional(FactPair::new(0, 1))],
                    2,
                ),
                Operator::new(
                    vec![FactPair::new(0, 1)],
                    vec![Effect::unconditional(FactPair::new(0, 2))],
                    3,
                ),
            ],
        )
        .unwrap();
        let projection = ProjectedTask::new(&task, &Pattern::singleton(0));
        let pdb = PatternDatabase::new(&projection);
        assert_eq!(Some(5), pdb.value(&[0]));
        assert_eq!(Some(3), pdb.value(&[1]));
        assert_eq!(Some(0), pdb.value(&[2]));
    }

    #[test]
    fn test_cheapest_path_is_kept() {
        // Two ways from 0 to 2: direct with cost 5, via 1 with cost 1+1.
        let task = Task::new(
            vec![3],
            vec![0],
            vec![FactPair::new(0, 2)],
            vec![
                Operator::new(
                    vec![FactPair::new(0, 0)],
                    vec![Effect::unconditional(FactPair::new(0, 2))],
                    5,
                ),
                Operator::new(
                    vec![FactPair::new(0, 0)],
                    vec![Effect::unconditional(FactPair::new(0, 1))],
                    1,
                ),
                Operator::new(
                    vec![FactPair::new(0, 1)],
                    vec![Effect::unconditional(FactPair::new(0, 2))],
                    1,
                ),
            ],
        )
        .unwrap();
        let projection = ProjectedTask::new(&task, &Pattern::singleton(0));
        let pdb = PatternDatabase::new(&projection);
        assert_eq!(Some(2), pdb.value(&[0]));
    }

    #[test]
    fn test_zero_cost_operators() {
        let task = Task::new(
            vec![2],
            vec![0],
            vec![FactPair::new(0, 1)],
            vec![Operator::new(
                vec![FactPair::new(0, 0)],
                vec![Effect::unconditional(FactPair::new(0, 1))],
                0,
            )],
        )
        .unwrap();
        let projection = ProjectedTask::new(&task, &Pattern::singleton(0));
        let pdb = PatternDatabase::new(&projection);
        assert_eq!(Some(0), pdb.value(&[0]));
        assert_eq!(Some(0), pdb.value(&[1]));
    }

    #[test]
    fn test_conditional_effects_respected() {
        // The effect sets v1 to 1 only when v0 is already 1.
        let task = Task::new(
            vec![2, 2],
            vec![0, 0],
            vec![FactPair::new(1, 1)],
            vec![Operator::new(
                vec![],
                vec![Effect::new(
                    vec![FactPair::new(0, 1)],
                    FactPair::new(1, 1),
                )],
                1,
            )],
        )
        .unwrap();
        let projection = ProjectedTask::new(&task, &Pattern::new(vec![0, 1]));
        let pdb = PatternDatabase::new(&projection);
        // From [0, 0] the operator never fires its effect.
        assert_eq!(None, pdb.value(&[0, 0]));
        assert_eq!(Some(1), pdb.value(&[1, 0]));
        assert_eq!(Some(0), pdb.value(&[1, 1]));
    }

    #[test]
    fn test_value_in_concrete_state() {
        let task = chain_task();
        let projection = ProjectedTask::new(&task, &Pattern::singleton(1));
        let pdb = PatternDatabase::new(&projection);
        assert_eq!(Some(1), pdb.value_in_concrete_state(&[0, 0]));
        assert_eq!(Some(0), pdb.value_in_concrete_state(&[0, 1]));
    }

    #[test]
    fn test_pattern_accessor() {
        let task = chain_task();
        let projection = ProjectedTask::new(&task, &Pattern::singleton(1));
        let pdb = PatternDatabase::new(&projection);
        assert_eq!(&Pattern::singleton(1), pdb.pattern());
    }
}
