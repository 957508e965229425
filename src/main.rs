use app::{AuthorsCommand, CheckCommand, GenerateCommand};
use crusti_app_helper::{AppHelper, Command};

mod app;

const AUTHORS: &str = "The rupaco developers";

fn main() {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        AUTHORS,
        "Rupaco, a pattern collection generator for classical planning.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(AuthorsCommand::new()),
        Box::new(CheckCommand::new()),
        Box::new(GenerateCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app.launch_app();
}
