use anyhow::Result;
use crusti_app_helper::{AppSettings, Command, SubCommand};

const CMD_NAME: &str = "authors";

pub(crate) struct AuthorsCommand;

impl AuthorsCommand {
    pub(crate) fn new() -> Self {
        AuthorsCommand
    }
}

impl<'a> Command<'a> for AuthorsCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> crusti_app_helper::App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Displays the version and the authors of rupaco")
            .setting(AppSettings::DisableVersion)
            .arg(crusti_app_helper::logging_level_cli_arg())
    }

    fn execute(&self, _arg_matches: &crusti_app_helper::ArgMatches<'_>) -> Result<()> {
        println!(
            "{} {} -- a pattern collection generator for classical planning",
            option_env!("CARGO_PKG_NAME").unwrap_or("rupaco"),
            option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version"),
        );
        println!("{}", crate::AUTHORS.replace(':', ", "));
        Ok(())
    }
}
