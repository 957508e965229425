use super::common;
use anyhow::{Context, Result};
use crusti_app_helper::{
    info, logging_level_cli_arg, AppSettings, Arg, ArgMatches, Command, SubCommand,
};
use rand::{rngs::StdRng, SeedableRng};
use rupaco::{
    io::PatternCollectionWriter,
    pdbs::{generate_pattern_collection, CegarConfig, CegarError, PatternCollectionInformation},
    utils::Verbosity,
};
use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufWriter},
};

const CMD_NAME: &str = "generate";

const ARG_MAX_REFINEMENTS: &str = "MAX_REFINEMENTS";
const ARG_MAX_PDB_SIZE: &str = "MAX_PDB_SIZE";
const ARG_MAX_COLLECTION_SIZE: &str = "MAX_COLLECTION_SIZE";
const ARG_REGULAR_PLANS: &str = "REGULAR_PLANS";
const ARG_MAX_TIME: &str = "MAX_TIME";
const ARG_SEED: &str = "SEED";
const ARG_BLACKLIST: &str = "BLACKLIST";
const ARG_VERBOSITY: &str = "VERBOSITY";
const ARG_OUTPUT: &str = "OUTPUT";

pub(crate) struct GenerateCommand;

impl GenerateCommand {
    pub(crate) fn new() -> Self {
        GenerateCommand
    }
}

impl<'a> Command<'a> for GenerateCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> crusti_app_helper::App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Generates a pattern collection for a planning task")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(
                Arg::with_name(ARG_MAX_REFINEMENTS)
                    .long("max-refinements")
                    .empty_values(false)
                    .multiple(false)
                    .default_value("infinity")
                    .help("the maximal number of refinements")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_MAX_PDB_SIZE)
                    .long("max-pdb-size")
                    .empty_values(false)
                    .multiple(false)
                    .default_value("1000000")
                    .help("the maximal number of abstract states in a PDB (not applied to the initial goal variable patterns)")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_MAX_COLLECTION_SIZE)
                    .long("max-collection-size")
                    .empty_values(false)
                    .multiple(false)
                    .default_value("infinity")
                    .help("the limit on the total number of abstract states across all PDBs (not applied to the initial goal variable patterns)")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_REGULAR_PLANS)
                    .long("regular-plans")
                    .takes_value(false)
                    .help("make the generator work with regular rather than wildcard plans")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_MAX_TIME)
                    .long("max-time")
                    .empty_values(false)
                    .multiple(false)
                    .default_value("infinity")
                    .help("the time limit of the generation, in seconds")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_SEED)
                    .long("seed")
                    .empty_values(false)
                    .multiple(false)
                    .default_value("0")
                    .help("the seed of the random generator")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_BLACKLIST)
                    .long("blacklist")
                    .empty_values(false)
                    .multiple(true)
                    .help("a variable whose precondition and goal violations must be ignored")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_VERBOSITY)
                    .long("verbosity")
                    .empty_values(false)
                    .multiple(false)
                    .possible_values(&["silent", "normal", "verbose", "debug"])
                    .default_value("normal")
                    .help("the verbosity of the generator")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_OUTPUT)
                    .short("o")
                    .long("output")
                    .empty_values(false)
                    .multiple(false)
                    .help("a file to write the collection to, instead of the standard output")
                    .required(false),
            )
            .arg(logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let task = common::read_task_path(arg_matches.value_of(common::ARG_INPUT).unwrap())?;
        let config = read_config(arg_matches)?;
        let seed = arg_matches
            .value_of(ARG_SEED)
            .unwrap()
            .parse::<u64>()
            .context("while parsing the seed of the random generator")?;
        let blacklisted_variables = match arg_matches.values_of(ARG_BLACKLIST) {
            Some(values) => values
                .map(|v| {
                    v.parse::<usize>().with_context(|| {
                        format!(r#"while parsing blacklisted variable "{}""#, v)
                    })
                })
                .collect::<Result<HashSet<usize>>>()?,
            None => HashSet::new(),
        };
        let verbosity = Verbosity::try_from(arg_matches.value_of(ARG_VERBOSITY).unwrap())?;
        let mut rng = StdRng::seed_from_u64(seed);
        let collection = match generate_pattern_collection(
            &config,
            &task,
            task.goals().to_vec(),
            blacklisted_variables,
            &mut rng,
            verbosity,
        ) {
            Ok(collection) => collection,
            Err(e) if matches!(e.downcast_ref::<CegarError>(), Some(CegarError::UnsolvableTask(_))) => {
                info!("{}", e);
                println!("UNSOLVABLE");
                std::process::exit(2);
            }
            Err(e) => return Err(e),
        };
        if let Some(value) = collection.heuristic_value(task.initial_state()) {
            info!("the initial state of the task has an estimated cost of {}", value);
        }
        write_collection(arg_matches, &collection)
    }
}

fn read_config(arg_matches: &ArgMatches<'_>) -> Result<CegarConfig> {
    Ok(CegarConfig::default()
        .with_max_refinements(common::parse_limit(
            arg_matches.value_of(ARG_MAX_REFINEMENTS).unwrap(),
            "maximal number of refinements",
        )?)
        .with_max_pdb_size(common::parse_limit(
            arg_matches.value_of(ARG_MAX_PDB_SIZE).unwrap(),
            "maximal PDB size",
        )?)
        .with_max_collection_size(common::parse_limit(
            arg_matches.value_of(ARG_MAX_COLLECTION_SIZE).unwrap(),
            "maximal collection size",
        )?)
        .with_wildcard_plans(!arg_matches.is_present(ARG_REGULAR_PLANS))
        .with_max_time(common::parse_time_limit(
            arg_matches.value_of(ARG_MAX_TIME).unwrap(),
        )?))
}

fn write_collection(
    arg_matches: &ArgMatches<'_>,
    collection: &PatternCollectionInformation,
) -> Result<()> {
    let writer = PatternCollectionWriter::default();
    match arg_matches.value_of(ARG_OUTPUT) {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!(r#"while creating output file "{}""#, path))?;
            writer.write(&mut BufWriter::new(file), collection)
        }
        None => writer.write(&mut io::stdout(), collection),
    }
}
