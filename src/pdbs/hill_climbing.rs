use super::PatternDatabase;
use crate::planning::Task;
use rand::{seq::SliceRandom, Rng};
use std::collections::{HashMap, HashSet, VecDeque};

/// Extracts an abstract plan from a pattern database by steepest-ascent
/// enforced hill climbing.
///
/// Starting from the abstract initial state, the search repeatedly applies
/// an operator lying on a cheapest abstract plan, preferring the ones
/// whose successor has the strictly smallest database value and breaking
/// ties uniformly at random. When every such operator at the current state
/// has cost zero, a breadth-first search across the zero-cost transitions
/// locates the nearest state with a strictly improving operator.
///
/// The returned plan is a sequence of steps over the projected operator
/// ids. When `wildcard_plans` is set, each step holds every applicable
/// operator with the same cost and the same abstract successor as the
/// chosen one; otherwise steps are singletons. The plan is empty when the
/// initial state is already an abstract goal state.
///
/// The initial state must be solvable in the abstraction; this must be
/// checked against the database before calling this function.
pub fn steepest_ascent_enforced_hill_climbing<R>(
    projected: &Task,
    rng: &mut R,
    pdb: &PatternDatabase,
    wildcard_plans: bool,
) -> Vec<Vec<usize>>
where
    R: Rng,
{
    let mut plan = vec![];
    let mut state = projected.initial_state().to_vec();
    while !projected.is_goal_state(&state) {
        // Optimal operators preserve solvability, so the value is present
        // as long as it is for the initial state.
        let value = pdb.value(&state).unwrap();
        let improving = optimal_operators(projected, pdb, &state, value)
            .into_iter()
            .filter(|&(_, successor_value)| successor_value < value)
            .collect::<Vec<(usize, u64)>>();
        if improving.is_empty() {
            for op in escape_plateau(projected, pdb, &state, value) {
                push_step(projected, &mut state, &mut plan, wildcard_plans, op);
            }
            continue;
        }
        let best_value = improving.iter().map(|&(_, v)| v).min().unwrap();
        let best_ops = improving
            .iter()
            .filter(|&&(_, v)| v == best_value)
            .map(|&(op, _)| op)
            .collect::<Vec<usize>>();
        let chosen = *best_ops.choose(rng).unwrap();
        push_step(projected, &mut state, &mut plan, wildcard_plans, chosen);
    }
    plan
}

/// Returns the applicable operators lying on a cheapest abstract plan from
/// the given state, paired with the database value of their successor.
fn optimal_operators(
    projected: &Task,
    pdb: &PatternDatabase,
    state: &[usize],
    value: u64,
) -> Vec<(usize, u64)> {
    projected
        .operators()
        .iter()
        .enumerate()
        .filter(|(_, op)| op.is_applicable_in(state))
        .filter_map(|(id, op)| {
            pdb.value(&op.successor(state))
                .filter(|&successor_value| successor_value + op.cost() == value)
                .map(|successor_value| (id, successor_value))
        })
        .collect()
}

/// Appends the step built around the chosen operator to the plan and
/// advances the state.
fn push_step(
    projected: &Task,
    state: &mut Vec<usize>,
    plan: &mut Vec<Vec<usize>>,
    wildcard_plans: bool,
    chosen: usize,
) {
    let chosen_op = projected.operator(chosen);
    let successor = chosen_op.successor(state);
    let step = if wildcard_plans {
        projected
            .operators()
            .iter()
            .enumerate()
            .filter(|(_, op)| {
                op.cost() == chosen_op.cost()
                    && op.is_applicable_in(state)
                    && op.successor(state) == successor
            })
            .map(|(id, _)| id)
            .collect()
    } else {
        vec![chosen]
    };
    plan.push(step);
    *state = successor;
}

/// Searches the nearest state admitting a strictly improving operator
/// across the zero-cost transitions of the plateau, and returns the
/// operator sequence leading to it.
fn escape_plateau(
    projected: &Task,
    pdb: &PatternDatabase,
    from: &[usize],
    value: u64,
) -> Vec<usize> {
    let mut parents: HashMap<Vec<usize>, (Vec<usize>, usize)> = HashMap::new();
    let mut visited = HashSet::new();
    visited.insert(from.to_vec());
    let mut queue = VecDeque::new();
    queue.push_back(from.to_vec());
    while let Some(state) = queue.pop_front() {
        let optimal = optimal_operators(projected, pdb, &state, value);
        if optimal.iter().any(|&(_, successor_value)| successor_value < value) {
            let mut path = vec![];
            let mut current = state;
            while let Some((parent, op)) = parents.get(&current) {
                path.push(*op);
                current = parent.clone();
            }
            path.reverse();
            return path;
        }
        for (op, _) in optimal {
            let successor = projected.operator(op).successor(&state);
            if visited.insert(successor.clone()) {
                parents.insert(successor.clone(), (state.clone(), op));
                queue.push_back(successor);
            }
        }
    }
    unreachable!("a state with a positive goal distance admits a strictly improving operator somewhere on its plateau")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdbs::Pattern;
    use crate::planning::{Effect, FactPair, Operator, ProjectedTask};
    use rand::{rngs::StdRng, SeedableRng};

    fn plan_for(task: &Task, pattern: Pattern, wildcard: bool, seed: u64) -> Vec<Vec<usize>> {
        let projection = ProjectedTask::new(task, &pattern);
        let pdb = PatternDatabase::new(&projection);
        let mut rng = StdRng::seed_from_u64(seed);
        steepest_ascent_enforced_hill_climbing(projection.task(), &mut rng, &pdb, wildcard)
    }

    fn execute(projection: &ProjectedTask, plan: &[Vec<usize>]) -> Vec<usize> {
        let mut state = projection.task().initial_state().to_vec();
        for step in plan {
            let op = projection.task().operator(step[0]);
            assert!(op.is_applicable_in(&state));
            state = op.successor(&state);
        }
        state
    }

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
    fn test_plan_reaches_goal() {
        let task = chain_task();
        let plan = plan_for(&task, Pattern::new(vec![0, 1]), true, 0);
        assert_eq!(2, plan.len());
        let projection = ProjectedTask::new(&task, &Pattern::new(vec![0, 1]));
        let end = execute(&projection, &plan);
        assert!(projection.task().is_goal_state(&end));
    }

    #[test]
    fn test_empty_plan_when_initially_solved() {
        let task = Task::new(vec![2], vec![1], vec![FactPair::new(0, 1)], vec![]).unwrap();
        let plan = plan_for(&task, Pattern::singleton(0), true, 0);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_wildcard_steps_group_equivalent_operators() {
        // Two operators with the same precondition, effect and cost.
        let op = Operator::new(
            vec![FactPair::new(0, 0)],
            vec![Effect::unconditional(FactPair::new(0, 1))],
            1,
        );
        let task = Task::new(
            vec![2],
            vec![0],
            vec![FactPair::new(0, 1)],
            vec![op.clone(), op],
        )
        .unwrap();
        let mut wildcard_plan = plan_for(&task, Pattern::singleton(0), true, 0);
        assert_eq!(1, wildcard_plan.len());
        wildcard_plan[0].sort_unstable();
        assert_eq!(vec![0, 1], wildcard_plan[0]);
        let regular_plan = plan_for(&task, Pattern::singleton(0), false, 0);
        assert_eq!(1, regular_plan.len());
        assert_eq!(1, regular_plan[0].len());
    }

    #[test]
    fn test_operators_with_distinct_successors_are_not_grouped() {
        // Both operators are optimal but lead to different states.
        let task = Task::new(
            vec![2, 2],
            vec![0, 0],
            vec![FactPair::new(0, 1)],
            vec![
                Operator::new(
                    vec![],
                    vec![Effect::unconditional(FactPair::new(0, 1))],
                    1,
                ),
                Operator::new(
                    vec![],
                    vec![
                        Effect::unconditional(FactPair::new(0, 1)),
                        Effect::unconditional(FactPair::new(1, 1)),
                    ],
                    1,
                ),
            ],
        )
        .unwrap();
        let plan = plan_for(&task, Pattern::new(vec![0, 1]), true, 0);
        assert_eq!(1, plan.len());
        assert_eq!(1, plan[0].len());
    }

    #[test]
    fn test_zero_cost_plateau_is_crossed() {
        // Reaching the goal requires a zero-cost step before the improving one.
        let task = Task::new(
            vec![3],
            vec![0],
            vec![FactPair::new(0, 2)],
            vec![
                Operator::new(
                    vec![FactPair::new(0, 0)],
                    vec![Effect::unconditional(FactPair::new(0, 1))],
                    0,
                ),
                Operator::new(
                    vec![FactPair::new(0, 1)],
                    vec![Effect::unconditional(FactPair::new(0, 2))],
                    1,
                ),
            ],
        )
        .unwrap();
        let plan = plan_for(&task, Pattern::singleton(0), true, 0);
        assert_eq!(vec![vec![0], vec![1]], plan);
    }

    #[test]
    fn test_same_seed_same_plan() {
        let task = chain_task();
        let first = plan_for(&task, Pattern::new(vec![0, 1]), true, 42);
        let second = plan_for(&task, Pattern::new(vec![0, 1]), true, 42);
        assert_eq!(first, second);
    }
}
