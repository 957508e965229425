use super::{
    steepest_ascent_enforced_hill_climbing, Pattern, PatternCollectionInformation,
    PatternDatabase,
};
use crate::{
    planning::{FactPair, ProjectedTask, Task},
    utils::{CountdownTimer, Verbosity},
};
use anyhow::{anyhow, Result};
use log::info;
use rand::{seq::SliceRandom, Rng};
use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};
use thiserror::Error;

const TOKEN: &str = "CEGAR: ";

/// The configuration of the CEGAR pattern collection generator.
///
/// The default configuration has no refinement, collection size or time
/// limit, caps the number of abstract states of a single PDB at one
/// million, and makes the generator work with wildcard plans. Options are
/// set with consuming `with_` functions.
///
/// # Example
///
/// ```
/// # use rupaco::pdbs::CegarConfig;
/// let config = CegarConfig::default()
///     .with_max_pdb_size(1 << 16)
///     .with_max_time(30.);
/// ```
#[derive(Clone, Debug)]
pub struct CegarConfig {
    max_refinements: usize,
    max_pdb_size: usize,
    max_collection_size: usize,
    wildcard_plans: bool,
    max_time: f64,
}

impl Default for CegarConfig {
    fn default() -> Self {
        CegarConfig {
            max_refinements: usize::MAX,
            max_pdb_size: 1_000_000,
            max_collection_size: usize::MAX,
            wildcard_plans: true,
            max_time: f64::INFINITY,
        }
    }
}

impl CegarConfig {
    /// Sets the maximal number of refinements; [usize::MAX] stands for the
    /// absence of a limit.
    pub fn with_max_refinements(mut self, max_refinements: usize) -> Self {
        self.max_refinements = max_refinements;
        self
    }

    /// Sets the maximal number of abstract states of a single PDB.
    ///
    /// The limit must be at least 1. It is not applied to the PDBs of the
    /// initial goal variable patterns.
    pub fn with_max_pdb_size(mut self, max_pdb_size: usize) -> Self {
        self.max_pdb_size = max_pdb_size;
        self
    }

    /// Sets the limit on the total number of abstract states across all
    /// the PDBs of the collection.
    ///
    /// The limit must be at least 1. It is not applied to the PDBs of the
    /// initial goal variable patterns.
    pub fn with_max_collection_size(mut self, max_collection_size: usize) -> Self {
        self.max_collection_size = max_collection_size;
        self
    }

    /// Makes the generator work with wildcard rather than regular plans.
    pub fn with_wildcard_plans(mut self, wildcard_plans: bool) -> Self {
        self.wildcard_plans = wildcard_plans;
        self
    }

    /// Sets the time limit of the generation, in seconds; [f64::INFINITY]
    /// stands for the absence of a limit.
    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }
}

/// The terminal failures of the CEGAR pattern collection generator.
///
/// These errors travel inside [anyhow::Error] values; callers that need
/// to react to them (typically to exit with a dedicated status) can
/// recover them by downcasting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CegarError {
    /// A goal given to the generator which is not a goal of the task.
    #[error("fact {0} is not a goal of the task")]
    NotAGoal(FactPair),
    /// The task was proven unsolvable.
    ///
    /// An unsolvable projection is a sound lower bound, so the concrete
    /// task itself admits no plan.
    #[error("the task admits no plan (shown by its projection onto {0})")]
    UnsolvableTask(Pattern),
}

struct Projection {
    pdb: Rc<PatternDatabase>,
    plan: Vec<Vec<usize>>,
    unsolvable: bool,
    solved: bool,
}

impl Projection {
    fn pattern(&self) -> &Pattern {
        self.pdb.pattern()
    }
}

fn compute_projection<R>(
    task: &Task,
    pattern: Pattern,
    rng: &mut R,
    wildcard_plans: bool,
    verbosity: Verbosity,
) -> Projection
where
    R: Rng,
{
    let projected = ProjectedTask::new(task, &pattern);
    let pdb = PatternDatabase::new(&projected);
    let mut plan = vec![];
    let mut unsolvable = false;
    if pdb.value(projected.task().initial_state()).is_none() {
        unsolvable = true;
        if verbosity >= Verbosity::Verbose {
            info!("{}PDB with pattern {} is unsolvable", TOKEN, pattern);
        }
    } else {
        if verbosity >= Verbosity::Verbose {
            info!("{}computing a plan for the PDB with pattern {}", TOKEN, pattern);
        }
        // The plan is computed over the projected operator ids; rewrite
        // each step with the ids of the concrete task.
        plan = steepest_ascent_enforced_hill_climbing(projected.task(), rng, &pdb, wildcard_plans)
            .into_iter()
            .map(|step| {
                step.into_iter()
                    .map(|op| projected.ancestor_operator_id(op))
                    .collect()
            })
            .collect();
    }
    Projection {
        pdb: Rc::new(pdb),
        plan,
        unsolvable,
        solved: false,
    }
}

struct Flaw {
    collection_index: usize,
    variable: usize,
}

type FlawList = Vec<Flaw>;

fn is_product_within_limit(factor1: usize, factor2: usize, limit: usize) -> bool {
    factor1
        .checked_mul(factor2)
        .map_or(false, |product| product <= limit)
}

struct Cegar<'a, R>
where
    R: Rng,
{
    config: &'a CegarConfig,
    task: &'a Task,
    goals: Vec<FactPair>,
    blacklisted_variables: HashSet<usize>,
    rng: &'a mut R,
    verbosity: Verbosity,
    projections: Vec<Option<Projection>>,
    // Maps each variable contained in the collection to the slot of the
    // projection it belongs to.
    variable_to_projection: HashMap<usize, usize>,
    collection_size: usize,
    // Set to the slot of a projection whose plan solves the concrete task.
    concrete_solution_index: Option<usize>,
}

impl<'a, R> Cegar<'a, R>
where
    R: Rng,
{
    fn new(
        config: &'a CegarConfig,
        task: &'a Task,
        goals: Vec<FactPair>,
        blacklisted_variables: HashSet<usize>,
        rng: &'a mut R,
        verbosity: Verbosity,
    ) -> Self {
        Cegar {
            config,
            task,
            goals,
            blacklisted_variables,
            rng,
            verbosity,
            projections: vec![],
            variable_to_projection: HashMap::new(),
            collection_size: 0,
            concrete_solution_index: None,
        }
    }

    fn collection_to_string(&self) -> String {
        let patterns = self
            .projections
            .iter()
            .flatten()
            .map(|p| p.pattern().to_string())
            .collect::<Vec<String>>();
        format!("[{}]", patterns.join(", "))
    }

    fn compute_initial_collection(&mut self) {
        let goal_vars = self.goals.iter().map(|g| g.var).collect::<Vec<usize>>();
        for var in goal_vars {
            self.add_pattern_for_var(var);
        }
        if self.verbosity >= Verbosity::Verbose {
            info!("{}initial collection: {}", TOKEN, self.collection_to_string());
        }
    }

    fn time_limit_reached(&self, timer: &CountdownTimer) -> bool {
        if timer.is_expired() {
            if self.verbosity >= Verbosity::Normal {
                info!("{}time limit reached", TOKEN);
            }
            return true;
        }
        false
    }

    fn termination_conditions_met(
        &self,
        timer: &CountdownTimer,
        refinement_counter: usize,
    ) -> bool {
        if self.time_limit_reached(timer) {
            return true;
        }
        if refinement_counter == self.config.max_refinements {
            if self.verbosity >= Verbosity::Normal {
                info!("{}maximal number of refinements reached", TOKEN);
            }
            return true;
        }
        false
    }

    /// Applies the plan of the projection at the given slot in the
    /// concrete task, starting at the concrete initial state and ignoring
    /// blacklisted variables. Returns the empty flaw list when the
    /// application succeeds, setting `concrete_solution_index` if the
    /// blacklist is empty; otherwise returns the violated precondition
    /// variables of all the operators of the failing plan step, or the
    /// unsatisfied goal variables when the whole plan applied.
    fn apply_wildcard_plan(&mut self, collection_index: usize) -> FlawList {
        let mut flaws: FlawList = vec![];
        let mut current = self.task.initial_state().to_vec();
        let projection = self.projections[collection_index].as_ref().unwrap();
        'plan: for equivalent_ops in &projection.plan {
            for &op_id in equivalent_ops {
                let op = self.task.operator(op_id);
                // Check the applicability of the operator; its violated
                // precondition variables are flaws.
                let mut flaw_detected = false;
                for precondition in op.preconditions() {
                    if self.blacklisted_variables.contains(&precondition.var) {
                        continue;
                    }
                    if !precondition.holds_in(&current) {
                        flaw_detected = true;
                        flaws.push(Flaw {
                            collection_index,
                            variable: precondition.var,
                        });
                    }
                }
                // An applicable operator discards the flaws accumulated
                // for this step.
                if !flaw_detected {
                    flaws.clear();
                    current = op.successor(&current);
                    continue 'plan;
                }
            }
            // All the equivalent operators are inapplicable.
            break;
        }
        if !flaws.is_empty() {
            if self.verbosity >= Verbosity::Verbose {
                info!(
                    "{}the plan of the pattern {} failed",
                    TOKEN,
                    self.projections[collection_index].as_ref().unwrap().pattern()
                );
            }
            return flaws;
        }
        if self.task.is_goal_state(&current) {
            // Blacklisted variables may have been ignored during the
            // application, in which case the plan is not guaranteed to be
            // valid in the concrete task.
            if self.blacklisted_variables.is_empty() {
                if self.verbosity >= Verbosity::Verbose {
                    info!(
                        "{}the plan of the pattern {} executed to a concrete goal state without a blacklist: the task is solved",
                        TOKEN,
                        self.projections[collection_index].as_ref().unwrap().pattern()
                    );
                }
                self.concrete_solution_index = Some(collection_index);
            } else {
                if self.verbosity >= Verbosity::Verbose {
                    info!(
                        "{}the plan of the pattern {} executed to a concrete goal state under a non-empty blacklist: marking the projection as solved",
                        TOKEN,
                        self.projections[collection_index].as_ref().unwrap().pattern()
                    );
                }
                self.projections[collection_index].as_mut().unwrap().solved = true;
            }
        } else {
            for goal in &self.goals {
                if !goal.holds_in(&current) && !self.blacklisted_variables.contains(&goal.var) {
                    flaws.push(Flaw {
                        collection_index,
                        variable: goal.var,
                    });
                }
            }
            if flaws.is_empty() {
                if self.verbosity >= Verbosity::Verbose {
                    info!(
                        "{}no non-blacklisted goal variable left unsatisfied: marking the pattern {} as solved",
                        TOKEN,
                        self.projections[collection_index].as_ref().unwrap().pattern()
                    );
                }
                self.projections[collection_index].as_mut().unwrap().solved = true;
            } else if self.verbosity >= Verbosity::Verbose {
                info!("{}raising goal violation flaws", TOKEN);
            }
        }
        flaws
    }

    fn get_flaws(&mut self) -> Result<FlawList> {
        let mut flaws = vec![];
        for collection_index in 0..self.projections.len() {
            let (unsolvable, solved) = match &self.projections[collection_index] {
                None => continue,
                Some(projection) => (projection.unsolvable, projection.solved),
            };
            if solved {
                continue;
            }
            if unsolvable {
                let pattern = self.projections[collection_index]
                    .as_ref()
                    .unwrap()
                    .pattern()
                    .clone();
                if self.verbosity >= Verbosity::Normal {
                    info!("{}the task was proven unsolvable", TOKEN);
                }
                return Err(CegarError::UnsolvableTask(pattern).into());
            }
            let new_flaws = self.apply_wildcard_plan(collection_index);
            if self.concrete_solution_index.is_some() {
                // The plan of this projection is valid in the concrete
                // task; the empty flaw list signals the termination.
                debug_assert_eq!(Some(collection_index), self.concrete_solution_index);
                debug_assert!(new_flaws.is_empty());
                debug_assert!(self.blacklisted_variables.is_empty());
                return Ok(vec![]);
            }
            flaws.extend(new_flaws);
        }
        Ok(flaws)
    }

    fn add_pattern_for_var(&mut self, var: usize) {
        let projection = compute_projection(
            self.task,
            Pattern::singleton(var),
            self.rng,
            self.config.wildcard_plans,
            self.verbosity,
        );
        self.collection_size += projection.pdb.size();
        self.variable_to_projection.insert(var, self.projections.len());
        self.projections.push(Some(projection));
    }

    fn can_merge_patterns(&self, index1: usize, index2: usize) -> bool {
        let pdb_size1 = self.projections[index1].as_ref().unwrap().pdb.size();
        let pdb_size2 = self.projections[index2].as_ref().unwrap().pdb.size();
        if !is_product_within_limit(pdb_size1, pdb_size2, self.config.max_pdb_size) {
            return false;
        }
        (self.collection_size - pdb_size1 - pdb_size2)
            .checked_add(pdb_size1 * pdb_size2)
            .map_or(false, |new_size| {
                new_size <= self.config.max_collection_size
            })
    }

    fn merge_patterns(&mut self, index1: usize, index2: usize) {
        // Retarget the variables of the absorbed pattern before vacating
        // its slot.
        let pattern2 = self.projections[index2].as_ref().unwrap().pattern().clone();
        for &var in pattern2.variables() {
            self.variable_to_projection.insert(var, index1);
        }
        let pattern1 = self.projections[index1].as_ref().unwrap().pattern().clone();
        let pdb_size1 = self.projections[index1].as_ref().unwrap().pdb.size();
        let pdb_size2 = self.projections[index2].as_ref().unwrap().pdb.size();
        let merged = compute_projection(
            self.task,
            pattern1.merged_with(&pattern2),
            self.rng,
            self.config.wildcard_plans,
            self.verbosity,
        );
        self.collection_size -= pdb_size1;
        self.collection_size -= pdb_size2;
        self.collection_size += merged.pdb.size();
        self.projections[index1] = Some(merged);
        self.projections[index2] = None;
    }

    fn can_add_variable_to_pattern(&self, index: usize, var: usize) -> bool {
        let pdb_size = self.projections[index].as_ref().unwrap().pdb.size();
        let domain_size = self.task.domain_size(var);
        if !is_product_within_limit(pdb_size, domain_size, self.config.max_pdb_size) {
            return false;
        }
        (self.collection_size - pdb_size)
            .checked_add(pdb_size * domain_size)
            .map_or(false, |new_size| {
                new_size <= self.config.max_collection_size
            })
    }

    fn add_variable_to_pattern(&mut self, collection_index: usize, var: usize) {
        let projection = self.projections[collection_index].as_ref().unwrap();
        let new_pattern = projection.pattern().extended_with(var);
        let old_pdb_size = projection.pdb.size();
        let new_projection = compute_projection(
            self.task,
            new_pattern,
            self.rng,
            self.config.wildcard_plans,
            self.verbosity,
        );
        self.collection_size -= old_pdb_size;
        self.collection_size += new_projection.pdb.size();
        self.variable_to_projection.insert(var, collection_index);
        self.projections[collection_index] = Some(new_projection);
    }

    fn handle_flaw(&mut self, flaw: &Flaw) {
        let collection_index = flaw.collection_index;
        let var = flaw.variable;
        let mut added_var = false;
        if let Some(&other_index) = self.variable_to_projection.get(&var) {
            // The variable is contained in another pattern of the collection.
            debug_assert_ne!(collection_index, other_index);
            debug_assert!(self.projections[other_index].is_some());
            if self.verbosity >= Verbosity::Verbose {
                info!(
                    "{}variable {} is already in the pattern {}",
                    TOKEN,
                    var,
                    self.projections[other_index].as_ref().unwrap().pattern()
                );
            }
            if self.can_merge_patterns(collection_index, other_index) {
                if self.verbosity >= Verbosity::Verbose {
                    info!("{}merging the two patterns", TOKEN);
                }
                self.merge_patterns(collection_index, other_index);
                added_var = true;
            }
        } else {
            // The variable is not in the collection yet.
            if self.verbosity >= Verbosity::Verbose {
                info!("{}variable {} is not in the collection yet", TOKEN, var);
            }
            if self.can_add_variable_to_pattern(collection_index, var) {
                if self.verbosity >= Verbosity::Verbose {
                    info!("{}adding it to the pattern", TOKEN);
                }
                self.add_variable_to_pattern(collection_index, var);
                added_var = true;
            }
        }
        if !added_var {
            if self.verbosity >= Verbosity::Verbose {
                info!(
                    "{}the size limits forbid adding the variable or merging the patterns; blacklisting variable {}",
                    TOKEN, var
                );
            }
            self.blacklisted_variables.insert(var);
        }
    }

    fn refine(&mut self, flaws: &[Flaw]) {
        debug_assert!(!flaws.is_empty());
        let flaw = flaws.choose(self.rng).unwrap();
        if self.verbosity >= Verbosity::Verbose {
            info!(
                "{}chosen flaw: pattern {} with a flaw on variable {}",
                TOKEN,
                self.projections[flaw.collection_index]
                    .as_ref()
                    .unwrap()
                    .pattern(),
                flaw.variable
            );
        }
        self.handle_flaw(flaw);
    }

    fn run(&mut self) -> Result<PatternCollectionInformation> {
        let timer = CountdownTimer::new(self.config.max_time);
        self.compute_initial_collection();
        let mut refinement_counter = 0;
        while !self.termination_conditions_met(&timer, refinement_counter) {
            if self.verbosity >= Verbosity::Verbose {
                info!("{}iteration #{}", TOKEN, refinement_counter + 1);
            }
            let flaws = self.get_flaws()?;
            if flaws.is_empty() {
                if self.verbosity >= Verbosity::Normal {
                    if self.concrete_solution_index.is_some() {
                        info!(
                            "{}the task was solved during the computation of the collection",
                            TOKEN
                        );
                    } else {
                        info!("{}the flaw list is empty; no further refinement is possible", TOKEN);
                    }
                }
                break;
            }
            if self.time_limit_reached(&timer) {
                break;
            }
            self.refine(&flaws);
            refinement_counter += 1;
            if self.verbosity >= Verbosity::Verbose {
                info!("{}current collection size: {}", TOKEN, self.collection_size);
                info!("{}current collection: {}", TOKEN, self.collection_to_string());
            }
        }
        let pdbs = match self.concrete_solution_index {
            Some(index) => vec![Rc::clone(&self.projections[index].as_ref().unwrap().pdb)],
            None => self
                .projections
                .iter()
                .flatten()
                .map(|projection| Rc::clone(&projection.pdb))
                .collect(),
        };
        let collection = PatternCollectionInformation::new(pdbs);
        if self.verbosity >= Verbosity::Normal {
            let patterns = collection
                .patterns()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>();
            info!("{}computation time: {:?}", TOKEN, timer.elapsed());
            info!("{}number of iterations: {}", TOKEN, refinement_counter);
            info!("{}final collection: [{}]", TOKEN, patterns.join(", "));
            info!(
                "{}final collection number of patterns: {}",
                TOKEN,
                collection.patterns().len()
            );
            info!(
                "{}final collection summed PDB sizes: {}",
                TOKEN, self.collection_size
            );
        }
        Ok(collection)
    }
}

fn limit_to_string(limit: usize) -> String {
    if limit == usize::MAX {
        "infinity".to_string()
    } else {
        limit.to_string()
    }
}

/// Computes a pattern collection for a planning task with counterexample
/// guided abstraction refinement.
///
/// The initial collection holds one singleton pattern per variable of the
/// given goals. The generator then repeatedly applies the abstract plan of
/// a projection in the concrete task; the variables whose absence from the
/// pattern made the application fail are flaws, and a flaw chosen
/// uniformly at random is repaired by merging two patterns or by extending
/// one, within the size limits of the configuration. Variables whose
/// absorption would exceed the limits are blacklisted: their precondition
/// and goal violations are ignored from then on. The refinement stops when
/// a plan is valid in the concrete task, when no flaw remains, or when a
/// refinement or time limit of the configuration is reached.
///
/// The given goals must be goals of the task and drive the initial
/// collection; the given blacklist is the initial set of ignored
/// variables. The same random generator seed makes the computation
/// deterministic.
///
/// # Errors
///
/// Two terminal failures are reported, both as [CegarError] values inside
/// the returned error: a supplied goal that is not a goal of the task, and
/// a projection proving the task unsolvable.
///
/// # Example
///
/// ```
/// # use rand::{rngs::StdRng, SeedableRng};
/// # use rupaco::pdbs::{generate_pattern_collection, CegarConfig};
/// # use rupaco::planning::{Effect, FactPair, Operator, Task};
/// # use rupaco::utils::Verbosity;
/// # use std::collections::HashSet;
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
/// let mut rng = StdRng::seed_from_u64(0);
/// let collection = generate_pattern_collection(
///     &CegarConfig::default(),
///     &task,
///     task.goals().to_vec(),
///     HashSet::new(),
///     &mut rng,
///     Verbosity::Silent,
/// )
/// .unwrap();
/// assert_eq!(1, collection.patterns().len());
/// ```
pub fn generate_pattern_collection<R>(
    config: &CegarConfig,
    task: &Task,
    goals: Vec<FactPair>,
    blacklisted_variables: HashSet<usize>,
    rng: &mut R,
    verbosity: Verbosity,
) -> Result<PatternCollectionInformation>
where
    R: Rng,
{
    if config.max_pdb_size == 0 {
        return Err(anyhow!("the maximal PDB size must be at least 1"));
    }
    if config.max_collection_size == 0 {
        return Err(anyhow!("the maximal collection size must be at least 1"));
    }
    if config.max_time.is_nan() || config.max_time < 0. {
        return Err(anyhow!("the time limit must be a non-negative number"));
    }
    for goal in &goals {
        if !task.goals().contains(goal) {
            return Err(CegarError::NotAGoal(*goal).into());
        }
    }
    if verbosity >= Verbosity::Normal {
        info!("options of the CEGAR pattern collection generator:");
        info!("max refinements: {}", limit_to_string(config.max_refinements));
        info!("max pdb size: {}", limit_to_string(config.max_pdb_size));
        info!(
            "max collection size: {}",
            limit_to_string(config.max_collection_size)
        );
        info!("wildcard plans: {}", config.wildcard_plans);
        info!("max time: {}", config.max_time);
        info!("verbosity: {:?}", verbosity);
        if blacklisted_variables.is_empty() {
            info!("blacklisted variables: none");
        } else {
            let mut vars = blacklisted_variables
                .iter()
                .copied()
                .collect::<Vec<usize>>();
            vars.sort_unstable();
            let vars = vars
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>();
            info!("blacklisted variables: {}", vars.join(", "));
        }
    }
    Cegar::new(config, task, goals, blacklisted_variables, rng, verbosity).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{Effect, Operator};
    use rand::{rngs::StdRng, SeedableRng};

    fn generate(
        config: &CegarConfig,
        task: &Task,
        seed: u64,
    ) -> Result<PatternCollectionInformation> {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_pattern_collection(
            config,
            task,
            task.goals().to_vec(),
            HashSet::new(),
            &mut rng,
            Verbosity::Silent,
        )
    }

    fn trivial_task() -> Task {
        Task::new(
            vec![2],
            vec![0],
            vec![FactPair::new(0, 1)],
            vec![Operator::new(
                vec![],
                vec![Effect::unconditional(FactPair::new(0, 1))],
                1,
            )],
        )
        .unwrap()
    }

    fn chain_task() -> Task {
        // A: pre v0=0, eff v0=1 ; B: pre v0=1, eff v1=1
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

    fn assert_disjoint(collection: &PatternCollectionInformation) {
        let mut seen = HashSet::new();
        for pattern in collection.patterns() {
            for &var in pattern.variables() {
                assert!(seen.insert(var), "variable {} in two patterns", var);
            }
        }
    }

    #[test]
    fn test_trivially_solved_task() {
        let task = trivial_task();
        let collection = generate(&CegarConfig::default(), &task, 0).unwrap();
        assert_eq!(&[Pattern::singleton(0)], collection.patterns());
        assert_eq!(Some(1), collection.heuristic_value(task.initial_state()));
    }

    #[test]
    fn test_merge_on_precondition_flaw() {
        let task = chain_task();
        let collection = generate(&CegarConfig::default(), &task, 0).unwrap();
        assert_eq!(&[Pattern::new(vec![0, 1])], collection.patterns());
        assert_eq!(Some(2), collection.heuristic_value(task.initial_state()));
    }

    #[test]
    fn test_extend_on_precondition_flaw() {
        // Only the goal on v1 seeds the collection; v0 is pulled in by a flaw.
        let task = Task::new(
            vec![2, 2],
            vec![0, 0],
            vec![FactPair::new(1, 1)],
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
        .unwrap();
        let collection = generate(&CegarConfig::default(), &task, 0).unwrap();
        assert_eq!(&[Pattern::new(vec![0, 1])], collection.patterns());
    }

    #[test]
    fn test_goal_subset_seeds_the_collection() {
        // Seeding with the second goal only still solves the whole task,
        // as plan execution checks every goal of the task.
        let task = chain_task();
        let mut rng = StdRng::seed_from_u64(0);
        let collection = generate_pattern_collection(
            &CegarConfig::default(),
            &task,
            vec![FactPair::new(1, 1)],
            HashSet::new(),
            &mut rng,
            Verbosity::Silent,
        )
        .unwrap();
        assert_eq!(&[Pattern::new(vec![0, 1])], collection.patterns());
    }

    #[test]
    fn test_blacklist_when_size_limits_forbid_merging() {
        let task = chain_task();
        let config = CegarConfig::default().with_max_pdb_size(2);
        let collection = generate(&config, &task, 0).unwrap();
        // No merge fits in two abstract states; both seed projections
        // remain, solved under the blacklist.
        let mut patterns = collection.patterns().to_vec();
        patterns.sort();
        assert_eq!(vec![Pattern::singleton(0), Pattern::singleton(1)], patterns);
        for pdb in collection.pdbs() {
            assert!(pdb.size() <= 2);
        }
    }

    #[test]
    fn test_unsolvable_projection_aborts() {
        let task = Task::new(vec![2], vec![0], vec![FactPair::new(0, 1)], vec![]).unwrap();
        let err = generate(&CegarConfig::default(), &task, 0).unwrap_err();
        assert_eq!(
            Some(&CegarError::UnsolvableTask(Pattern::singleton(0))),
            err.downcast_ref::<CegarError>()
        );
    }

    #[test]
    fn test_zero_time_limit_keeps_the_seed_collection() {
        let task = chain_task();
        let config = CegarConfig::default().with_max_time(0.);
        let collection = generate(&config, &task, 0).unwrap();
        assert_eq!(
            &[Pattern::singleton(0), Pattern::singleton(1)],
            collection.patterns()
        );
    }

    #[test]
    fn test_zero_refinements_keeps_the_seed_collection() {
        let task = chain_task();
        let config = CegarConfig::default().with_max_refinements(0);
        let collection = generate(&config, &task, 0).unwrap();
        assert_eq!(
            &[Pattern::singleton(0), Pattern::singleton(1)],
            collection.patterns()
        );
    }

    #[test]
    fn test_seed_patterns_ignore_size_limits() {
        let task = Task::new(
            vec![5],
            vec![0],
            vec![FactPair::new(0, 1)],
            vec![Operator::new(
                vec![],
                vec![Effect::unconditional(FactPair::new(0, 1))],
                1,
            )],
        )
        .unwrap();
        let config = CegarConfig::default().with_max_pdb_size(2);
        let collection = generate(&config, &task, 0).unwrap();
        assert_eq!(1, collection.pdbs().len());
        assert_eq!(5, collection.pdbs()[0].size());
    }

    #[test]
    fn test_goal_not_in_task_is_rejected() {
        let task = trivial_task();
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate_pattern_collection(
            &CegarConfig::default(),
            &task,
            vec![FactPair::new(0, 0)],
            HashSet::new(),
            &mut rng,
            Verbosity::Silent,
        )
        .unwrap_err();
        assert_eq!(
            Some(&CegarError::NotAGoal(FactPair::new(0, 0))),
            err.downcast_ref::<CegarError>()
        );
    }

    #[test]
    fn test_zero_max_pdb_size_is_rejected() {
        let task = trivial_task();
        let config = CegarConfig::default().with_max_pdb_size(0);
        assert!(generate(&config, &task, 0).is_err());
    }

    #[test]
    fn test_zero_max_collection_size_is_rejected() {
        let task = trivial_task();
        let config = CegarConfig::default().with_max_collection_size(0);
        assert!(generate(&config, &task, 0).is_err());
    }

    #[test]
    fn test_negative_time_limit_is_rejected() {
        let task = trivial_task();
        let config = CegarConfig::default().with_max_time(-1.);
        assert!(generate(&config, &task, 0).is_err());
    }

    #[test]
    fn test_initial_blacklist_is_honored() {
        // With v0 blacklisted from the start, the precondition of B is
        // never reported as a flaw and the seed pattern solves its goal.
        let task = Task::new(
            vec![2, 2],
            vec![0, 0],
            vec![FactPair::new(1, 1)],
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
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let collection = generate_pattern_collection(
            &CegarConfig::default(),
            &task,
            task.goals().to_vec(),
            HashSet::from([0]),
            &mut rng,
            Verbosity::Silent,
        )
        .unwrap();
        assert_eq!(&[Pattern::singleton(1)], collection.patterns());
    }

    #[test]
    fn test_wildcard_and_regular_plans_reach_the_same_collection() {
        let task = chain_task();
        let regular = CegarConfig::default().with_wildcard_plans(false);
        let collection = generate(&regular, &task, 0).unwrap();
        assert_eq!(&[Pattern::new(vec![0, 1])], collection.patterns());
    }

    #[test]
    fn test_patterns_stay_disjoint_and_bounded() {
        // Three chained variables force several refinements; the variables
        // that do not fit in four abstract states get blacklisted.
        let task = Task::new(
            vec![2, 2, 2],
            vec![0, 0, 0],
            vec![FactPair::new(1, 1), FactPair::new(2, 1)],
            vec![
                Operator::new(
                    vec![],
                    vec![Effect::unconditional(FactPair::new(0, 1))],
                    1,
                ),
                Operator::new(
                    vec![FactPair::new(0, 1)],
                    vec![Effect::unconditional(FactPair::new(1, 1))],
                    1,
                ),
                Operator::new(
                    vec![FactPair::new(1, 1)],
                    vec![Effect::unconditional(FactPair::new(2, 1))],
                    1,
                ),
            ],
        )
        .unwrap();
        let config = CegarConfig::default().with_max_pdb_size(4);
        for seed in 0..8 {
            let collection = generate(&config, &task, seed).unwrap();
            assert_disjoint(&collection);
            for pdb in collection.pdbs() {
                assert!(pdb.size() <= 4);
            }
        }
    }

    #[test]
    fn test_full_refinement_solves_the_three_variable_chain() {
        let task = Task::new(
            vec![2, 2, 2],
            vec![0, 0, 0],
            vec![FactPair::new(1, 1), FactPair::new(2, 1)],
            vec![
                Operator::new(
                    vec![],
                    vec![Effect::unconditional(FactPair::new(0, 1))],
                    1,
                ),
                Operator::new(
                    vec![FactPair::new(0, 1)],
                    vec![Effect::unconditional(FactPair::new(1, 1))],
                    1,
                ),
                Operator::new(
                    vec![FactPair::new(1, 1)],
                    vec![Effect::unconditional(FactPair::new(2, 1))],
                    1,
                ),
            ],
        )
        .unwrap();
        for seed in 0..8 {
            let collection = generate(&CegarConfig::default(), &task, seed).unwrap();
            assert_disjoint(&collection);
            // The task is solvable with unlimited sizes: the emitted
            // collection is the single projection whose plan solved it.
            assert_eq!(1, collection.patterns().len());
            assert_eq!(&Pattern::new(vec![0, 1, 2]), &collection.patterns()[0]);
        }
    }

    #[test]
    fn test_same_seed_same_collection() {
        let task = chain_task();
        let first = generate(&CegarConfig::default(), &task, 7).unwrap();
        let second = generate(&CegarConfig::default(), &task, 7).unwrap();
        assert_eq!(first.patterns(), second.patterns());
    }
}
