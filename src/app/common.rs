use anyhow::{anyhow, Context, Result};
use crusti_app_helper::Arg;
use log::{info, warn};
use rupaco::{
    io::{InstanceReader, TaskReader},
    planning::Task,
};
use std::{
    fs::{self, File},
    io::BufReader,
    path::PathBuf,
};

pub(crate) const ARG_INPUT: &str = "INPUT";

pub(crate) fn input_args() -> Arg<'static, 'static> {
    Arg::with_name(ARG_INPUT)
        .short("f")
        .empty_values(false)
        .multiple(false)
        .help("the input file that contains the planning task")
        .required(true)
}

pub(crate) fn read_task_path(file_path: &str) -> Result<Task> {
    let mut reader = TaskReader::default();
    reader.add_warning_handler(Box::new(|line, msg| warn!("at line {}: {}", line, msg)));
    let canonicalized = canonicalize_file_path(file_path)?;
    info!("reading input file {:?}", canonicalized);
    let mut file_reader = BufReader::new(File::open(canonicalized)?);
    let task = reader.read(&mut file_reader)?;
    info!(
        "the task has {} variable(s), {} goal(s) and {} operator(s)",
        task.n_variables(),
        task.goals().len(),
        task.n_operators(),
    );
    Ok(task)
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}

pub(crate) fn parse_limit(value: &str, what: &str) -> Result<usize> {
    if value == "infinity" {
        return Ok(usize::MAX);
    }
    value.parse::<usize>().map_err(|_| {
        anyhow!(
            r#"invalid {}; expected a non-negative integer or "infinity", got "{}""#,
            what,
            value
        )
    })
}

pub(crate) fn parse_time_limit(value: &str) -> Result<f64> {
    if value == "infinity" {
        return Ok(f64::INFINITY);
    }
    match value.parse::<f64>() {
        Ok(t) if t >= 0. => Ok(t),
        _ => Err(anyhow!(
            r#"invalid time limit; expected a non-negative number or "infinity", got "{}""#,
            value
        )),
    }
}
