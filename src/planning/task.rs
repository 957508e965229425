use anyhow::{anyhow, Result};
use std::{collections::HashSet, fmt::Display};

/// A pair made of a state variable and a value of its domain.
///
/// Fact pairs are the building blocks of states, goals, operator
/// preconditions and effects.
/// Variables are identified by their index in the task; values by their
/// index in the variable domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactPair {
    /// The variable the fact refers to.
    pub var: usize,
    /// The value assigned to the variable.
    pub value: usize,
}

impl FactPair {
    /// Builds a new fact pair given a variable id and a value.
    ///
    /// # Example
    ///
    /// ```
    /// # use rupaco::planning::FactPair;
    /// let fact = FactPair::new(0, 1);
    /// assert_eq!(0, fact.var);
    /// assert_eq!(1, fact.value);
    /// ```
    pub fn new(var: usize, value: usize) -> Self {
        FactPair { var, value }
    }

    /// Returns `true` if and only if this fact holds in the given state.
    pub fn holds_in(&self, state: &[usize]) -> bool {
        state[self.var] == self.value
    }
}

impl Display for FactPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}={}", self.var, self.value)
    }
}

/// An operator effect: a target fact guarded by a conjunction of facts.
///
/// When an operator is applied in a state, the effect sets its target
/// fact if and only if all its conditions hold in that state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    conditions: Vec<FactPair>,
    fact: FactPair,
}

impl Effect {
    /// Builds a new effect given its conditions and the fact it sets.
    pub fn new(conditions: Vec<FactPair>, fact: FactPair) -> Self {
        Effect { conditions, fact }
    }

    /// Builds an effect with no conditions.
    pub fn unconditional(fact: FactPair) -> Self {
        Effect {
            conditions: vec![],
            fact,
        }
    }

    /// Returns the conditions guarding this effect.
    pub fn conditions(&self) -> &[FactPair] {
        &self.conditions
    }

    /// Returns the fact set by this effect.
    pub fn fact(&self) -> FactPair {
        self.fact
    }

    /// Returns `true` if and only if all the conditions of this effect hold in the given state.
    pub fn fires_in(&self, state: &[usize]) -> bool {
        self.conditions.iter().all(|c| c.holds_in(state))
    }
}

/// A deterministic planning operator.
///
/// An operator is applicable in a state when all its preconditions hold.
/// Applying it sets the target fact of every effect whose conditions hold.
/// Operators are identified by their index in the task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    preconditions: Vec<FactPair>,
    effects: Vec<Effect>,
    cost: u64,
}

impl Operator {
    /// Builds a new operator given its preconditions, its effects and its cost.
    pub fn new(preconditions: Vec<FactPair>, effects: Vec<Effect>, cost: u64) -> Self {
        Operator {
            preconditions,
            effects,
            cost,
        }
    }

    /// Returns the preconditions of this operator.
    pub fn preconditions(&self) -> &[FactPair] {
        &self.preconditions
    }

    /// Returns the effects of this operator.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Returns the cost of this operator.
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Returns `true` if and only if all the preconditions of this operator hold in the given state.
    pub fn is_applicable_in(&self, state: &[usize]) -> bool {
        self.preconditions.iter().all(|p| p.holds_in(state))
    }

    /// Computes the state obtained by applying this operator in the given state.
    ///
    /// Exactly the effects whose conditions hold in the given state are
    /// applied. Preconditions are not checked; callers that require
    /// applicability must test it with [is_applicable_in](Self::is_applicable_in).
    pub fn successor(&self, state: &[usize]) -> Vec<usize> {
        let mut new_values = state.to_vec();
        for effect in &self.effects {
            if effect.fires_in(state) {
                new_values[effect.fact.var] = effect.fact.value;
            }
        }
        new_values
    }
}

/// A classical planning task over finite-domain state variables.
///
/// A task holds the variable domains, a full initial assignment, a set of
/// conjunctive goal facts and the operators. All components are validated
/// at construction time; the structure is read-only afterwards.
///
/// # Example
///
/// ```
/// # use rupaco::planning::{Effect, FactPair, Operator, Task};
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
/// assert_eq!(1, task.n_variables());
/// assert!(!task.is_goal_state(task.initial_state()));
/// ```
pub struct Task {
    domain_sizes: Vec<usize>,
    initial_state: Vec<usize>,
    goals: Vec<FactPair>,
    operators: Vec<Operator>,
}

impl Task {
    /// Builds a new task, checking the consistency of its components.
    ///
    /// The checks are the following: variable domains must not be empty,
    /// the initial state must assign an in-domain value to every variable,
    /// goal facts must be in range with at most one goal per variable, and
    /// operator preconditions (at most one per variable), effects and
    /// effect conditions must be in range.
    /// An error is returned when one of them fails.
    pub fn new(
        domain_sizes: Vec<usize>,
        initial_state: Vec<usize>,
        goals: Vec<FactPair>,
        operators: Vec<Operator>,
    ) -> Result<Self> {
        let n_vars = domain_sizes.len();
        let check_fact = |f: &FactPair, kind: &str| {
            if f.var >= n_vars {
                return Err(anyhow!("unknown variable in {}: {}", kind, f));
            }
            if f.value >= domain_sizes[f.var] {
                return Err(anyhow!("out-of-domain value in {}: {}", kind, f));
            }
            Ok(())
        };
        if let Some(var) = domain_sizes.iter().position(|&d| d == 0) {
            return Err(anyhow!("variable {} has an empty domain", var));
        }
        if initial_state.len() != n_vars {
            return Err(anyhow!(
                "initial state sets {} variables while the task has {}",
                initial_state.len(),
                n_vars
            ));
        }
        for (var, &value) in initial_state.iter().enumerate() {
            check_fact(&FactPair::new(var, value), "the initial state")?;
        }
        let mut goal_vars = HashSet::new();
        for goal in &goals {
            check_fact(goal, "a goal")?;
            if !goal_vars.insert(goal.var) {
                return Err(anyhow!("multiple goals for variable {}", goal.var));
            }
        }
        for (id, op) in operators.iter().enumerate() {
            let kind = |what: &str| format!("{} of operator {}", what, id);
            let mut precondition_vars = HashSet::new();
            for p in &op.preconditions {
                check_fact(p, &kind("a precondition"))?;
                if !precondition_vars.insert(p.var) {
                    return Err(anyhow!(
                        "multiple preconditions on variable {} in operator {}",
                        p.var,
                        id
                    ));
                }
            }
            for e in &op.effects {
                check_fact(&e.fact, &kind("an effect"))?;
                for c in &e.conditions {
                    check_fact(c, &kind("an effect condition"))?;
                }
            }
        }
        Ok(Task {
            domain_sizes,
            initial_state,
            goals,
            operators,
        })
    }

    /// Returns the number of state variables of this task.
    pub fn n_variables(&self) -> usize {
        self.domain_sizes.len()
    }

    /// Returns the domain size of a variable.
    ///
    /// # Panics
    ///
    /// Panics if no variable has such id.
    pub fn domain_size(&self, var: usize) -> usize {
        self.domain_sizes[var]
    }

    /// Returns the initial state as a full assignment.
    pub fn initial_state(&self) -> &[usize] {
        &self.initial_state
    }

    /// Returns the goal facts of this task.
    pub fn goals(&self) -> &[FactPair] {
        &self.goals
    }

    /// Returns the operators of this task.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Returns the number of operators of this task.
    pub fn n_operators(&self) -> usize {
        self.operators.len()
    }

    /// Returns the operator with the given id.
    ///
    /// # Panics
    ///
    /// Panics if no operator has such id.
    pub fn operator(&self, id: usize) -> &Operator {
        &self.operators[id]
    }

    /// Returns `true` if and only if all the goal facts of this task hold in the given state.
    pub fn is_goal_state(&self, state: &[usize]) -> bool {
        self.goals.iter().all(|g| g.holds_in(state))
    }
}
