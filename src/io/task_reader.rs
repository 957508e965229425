use super::{InstanceReader, WarningHandler};
use crate::planning::{Effect, FactPair, Operator, Task};
use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader, Read};

/// A reader for the line-oriented numeric task format.
///
/// # Task format
///
/// A task file is made of lines of whitespace-separated words; lines
/// starting with `#` are comments. The first line is the preamble
/// `p task <n_vars>`. The other lines start with a one-letter kind:
///
/// * `v <domain_size>` — declares the next variable (one line per
///   variable, in id order);
/// * `i <val_0> ... <val_{n-1}>` — the initial state, one value per
///   variable;
/// * `g <var> <value>` — a goal fact;
/// * `o <cost>` — starts a new operator;
/// * `q <var> <value>` — a precondition of the current operator;
/// * `e <var> <value> [<cvar> <cval>]...` — an effect of the current
///   operator, optionally guarded by condition facts.
///
/// The following content defines a task with two Boolean variables where
/// the first operator sets `v0` to 1 and the second one requires it
/// before setting `v1` to 1.
///
/// ```text
/// p task 2
/// v 2
/// v 2
/// i 0 0
/// g 0 1
/// g 1 1
/// o 1
/// q 0 0
/// e 0 1
/// o 1
/// q 0 1
/// e 1 1
/// ```
#[derive(Default)]
pub struct TaskReader {
    warning_handlers: Vec<WarningHandler>,
}

impl InstanceReader for TaskReader {
    fn read(&self, reader: &mut dyn Read) -> Result<Task> {
        let br = BufReader::new(reader);
        let mut n_vars = None;
        let mut domain_sizes: Vec<usize> = vec![];
        let mut initial_state: Option<Vec<usize>> = None;
        let mut goals: Vec<FactPair> = vec![];
        let mut operators: Vec<Operator> = vec![];
        let mut current_op: Option<PendingOperator> = None;
        let mut found_empty_lines = false;
        for (i, line) in br.lines().enumerate() {
            let context = || format!("while reading line with index {}", i);
            let l = line.with_context(context)?;
            if l.starts_with('#') {
                continue;
            }
            if l.is_empty() {
                found_empty_lines = true;
                continue;
            }
            if found_empty_lines {
                return Err(anyhow!("got content after an empty line")).with_context(context);
            }
            let words = l.split_whitespace().collect::<Vec<&str>>();
            let expected_n_vars = match n_vars {
                None => {
                    n_vars = Some(read_preamble(&words).with_context(context)?);
                    continue;
                }
                Some(n) => n,
            };
            match words[0] {
                "v" => {
                    if words.len() != 2 {
                        return Err(anyhow!(
                            "error in variable declaration; expected 2 words, got {}",
                            words.len()
                        ))
                        .with_context(context);
                    }
                    if domain_sizes.len() == expected_n_vars {
                        return Err(anyhow!("too many variable declarations"))
                            .with_context(context);
                    }
                    domain_sizes
                        .push(read_number(words[1], "domain size").with_context(context)?);
                }
                "i" => {
                    if initial_state.is_some() {
                        return Err(anyhow!("multiple initial states")).with_context(context);
                    }
                    if words.len() != 1 + expected_n_vars {
                        return Err(anyhow!(
                            "error in initial state; expected {} values, got {}",
                            expected_n_vars,
                            words.len() - 1
                        ))
                        .with_context(context);
                    }
                    let values = words[1..]
                        .iter()
                        .map(|w| read_number(w, "initial state value"))
                        .collect::<Result<Vec<usize>>>()
                        .with_context(context)?;
                    initial_state = Some(values);
                }
                "g" => {
                    goals.push(read_fact(&words, "goal").with_context(context)?);
                }
                "o" => {
                    if words.len() != 2 {
                        return Err(anyhow!(
                            "error in operator declaration; expected 2 words, got {}",
                            words.len()
                        ))
                        .with_context(context);
                    }
                    self.flush_operator(current_op.take(), &mut operators);
                    current_op = Some(PendingOperator {
                        declaration_line: i,
                        cost: words[1].parse::<u64>().map_err(|_| {
                            anyhow!(r#"invalid operator cost; got "{}""#, words[1])
                        }).with_context(context)?,
                        preconditions: vec![],
                        effects: vec![],
                    });
                }
                "q" => match &mut current_op {
                    Some(op) => op
                        .preconditions
                        .push(read_fact(&words, "precondition").with_context(context)?),
                    None => {
                        return Err(anyhow!("precondition given outside of an operator"))
                            .with_context(context)
                    }
                },
                "e" => match &mut current_op {
                    Some(op) => op.effects.push(read_effect(&words).with_context(context)?),
                    None => {
                        return Err(anyhow!("effect given outside of an operator"))
                            .with_context(context)
                    }
                },
                _ => {
                    return Err(anyhow!(r#"unexpected line kind "{}""#, words[0]))
                        .with_context(context)
                }
            }
        }
        self.flush_operator(current_op.take(), &mut operators);
        let n_vars = match n_vars {
            Some(n) => n,
            None => return Err(anyhow!("missing preamble")),
        };
        if domain_sizes.len() != n_vars {
            return Err(anyhow!(
                "expected {} variable declarations, got {}",
                n_vars,
                domain_sizes.len()
            ));
        }
        let initial_state = initial_state.ok_or_else(|| anyhow!("missing initial state"))?;
        Task::new(domain_sizes, initial_state, goals, operators)
    }

    fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }
}

impl TaskReader {
    fn flush_operator(&self, pending: Option<PendingOperator>, operators: &mut Vec<Operator>) {
        if let Some(op) = pending {
            if op.effects.is_empty() {
                self.warning_handlers
                    .iter()
                    .for_each(|h| h(op.declaration_line, "operator with no effect".to_string()));
            }
            operators.push(Operator::new(op.preconditions, op.effects, op.cost));
        }
    }
}

struct PendingOperator {
    declaration_line: usize,
    cost: u64,
    preconditions: Vec<FactPair>,
    effects: Vec<Effect>,
}

fn read_preamble(words: &[&str]) -> Result<usize> {
    if words.len() != 3 {
        return Err(anyhow!(
            "error in preamble; expected 3 words, got {}",
            words.len()
        ));
    }
    if words[0] != "p" {
        return Err(anyhow!(
            r#"error in first word of preamble; expected "p", got "{}""#,
            words[0]
        ));
    }
    if words[1] != "task" {
        return Err(anyhow!(
            r#"error in second word of preamble; expected "task", got "{}""#,
            words[1]
        ));
    }
    read_number(words[2], "number of variables")
}

fn read_number(word: &str, what: &str) -> Result<usize> {
    word.parse::<usize>()
        .map_err(|_| anyhow!(r#"invalid {}; expected a non-negative integer, got "{}""#, what, word))
}

fn read_fact(words: &[&str], what: &str) -> Result<FactPair> {
    if words.len() != 3 {
        return Err(anyhow!(
            "error in {}; expected 3 words, got {}",
            what,
            words.len()
        ));
    }
    Ok(FactPair::new(
        read_number(words[1], "variable id")?,
        read_number(words[2], "value")?,
    ))
}

fn read_effect(words: &[&str]) -> Result<Effect> {
    if words.len() < 3 || words.len() % 2 == 0 {
        return Err(anyhow!(
            "error in effect; expected a variable, a value and condition pairs, got {} words",
            words.len()
        ));
    }
    let fact = FactPair::new(
        read_number(words[1], "variable id")?,
        read_number(words[2], "value")?,
    );
    let conditions = words[3..]
        .chunks(2)
        .map(|pair| {
            Ok(FactPair::new(
                read_number(pair[0], "condition variable id")?,
                read_number(pair[1], "condition value")?,
            ))
        })
        .collect::<Result<Vec<FactPair>>>()?;
    Ok(Effect::new(conditions, fact))
}
