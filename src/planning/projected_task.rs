use super::{Effect, FactPair, Operator, Task};
use crate::pdbs::Pattern;

/// The projection of a planning task onto a pattern.
///
/// The projected task is a task of its own whose variables are the
/// pattern variables, reindexed from 0 following the pattern order.
/// Preconditions, effects, effect conditions and goals are restricted to
/// the pattern variables; operators whose restricted effect list is empty
/// are dropped. Each surviving operator keeps the id of the concrete
/// operator it stems from, available through
/// [ancestor_operator_id](Self::ancestor_operator_id).
///
/// # Example
///
/// ```
/// # use rupaco::pdbs::Pattern;
/// # use rupaco::planning::{Effect, FactPair, Operator, ProjectedTask, Task};
/// let task = Task::new(
///     vec![2, 2],
///     vec![0, 0],
///     vec![FactPair::new(1, 1)],
///     vec![
///         Operator::new(vec![], vec![Effect::unconditional(FactPair::new(0, 1))], 1),
///         Operator::new(vec![], vec![Effect::unconditional(FactPair::new(1, 1))], 1),
///     ],
/// )
/// .unwrap();
/// let projection = ProjectedTask::new(&task, &Pattern::singleton(1));
/// assert_eq!(1, projection.task().n_variables());
/// assert_eq!(1, projection.task().n_operators());
/// assert_eq!(1, projection.ancestor_operator_id(0));
/// ```
pub struct ProjectedTask {
    pattern: Pattern,
    task: Task,
    ancestor_operator_ids: Vec<usize>,
}

impl ProjectedTask {
    /// Projects a task onto a pattern.
    pub fn new(task: &Task, pattern: &Pattern) -> Self {
        let mut to_abstract = vec![None; task.n_variables()];
        pattern
            .variables()
            .iter()
            .enumerate()
            .for_each(|(i, &var)| to_abstract[var] = Some(i));
        let project_fact =
            |f: &FactPair| to_abstract[f.var].map(|var| FactPair::new(var, f.value));
        let domain_sizes = pattern
            .variables()
            .iter()
            .map(|&var| task.domain_size(var))
            .collect::<Vec<usize>>();
        let initial_state = pattern
            .variables()
            .iter()
            .map(|&var| task.initial_state()[var])
            .collect::<Vec<usize>>();
        let goals = task
            .goals()
            .iter()
            .filter_map(project_fact)
            .collect::<Vec<FactPair>>();
        let mut operators = Vec::with_capacity(task.n_operators());
        let mut ancestor_operator_ids = Vec::with_capacity(task.n_operators());
        for (id, op) in task.operators().iter().enumerate() {
            let effects = op
                .effects()
                .iter()
                .filter_map(|e| {
                    project_fact(&e.fact()).map(|fact| {
                        Effect::new(
                            e.conditions().iter().filter_map(project_fact).collect(),
                            fact,
                        )
                    })
                })
                .collect::<Vec<Effect>>();
            if effects.is_empty() {
                continue;
            }
            let preconditions = op
                .preconditions()
                .iter()
                .filter_map(project_fact)
                .collect::<Vec<FactPair>>();
            operators.push(Operator::new(preconditions, effects, op.cost()));
            ancestor_operator_ids.push(id);
        }
        let task = Task::new(domain_sizes, initial_state, goals, operators).unwrap();
        ProjectedTask {
            pattern: pattern.clone(),
            task,
            ancestor_operator_ids,
        }
    }

    /// Returns the pattern this task is the projection onto.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the projected task itself.
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the id of the concrete operator a projected operator stems from.
    ///
    /// # Panics
    ///
    /// Panics if no projected operator has such id.
    pub fn ancestor_operator_id(&self, op: usize) -> usize {
        self.ancestor_operator_ids[op]
    }
}
