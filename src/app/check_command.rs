use super::common;
use anyhow::Result;
use crusti_app_helper::{logging_level_cli_arg, AppSettings, Command, SubCommand};

const CMD_NAME: &str = "check";

pub(crate) struct CheckCommand;

impl CheckCommand {
    pub(crate) fn new() -> Self {
        CheckCommand
    }
}

impl<'a> Command<'a> for CheckCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> crusti_app_helper::App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Checks an input task file for errors")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &crusti_app_helper::ArgMatches<'_>) -> Result<()> {
        common::read_task_path(arg_matches.value_of(common::ARG_INPUT).unwrap()).map(|_| ())
    }
}
