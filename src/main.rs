use clap::Parser;
use penkit::app::{self, exit};
use penkit::i18n::{self, Msg};
use penkit::{init_logging, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.dev, cli.no_color) {
        eprintln!("{}", e);
        return ExitCode::from(exit::UNEXPECTED);
    }
    tracing::debug!("penkit {} (built {})", penkit::VERSION, penkit::BUILD_DATE);

    match app::run(&cli) {
        Ok((outcome, lang)) => {
            eprintln!("{}", app::summary(&outcome, lang));
            ExitCode::from(exit::SUCCESS)
        }
        Err(e) => {
            let lang = app::language_hint(&cli);
            eprintln!("{}: {:#}", i18n::text(lang, Msg::Error), e);
            ExitCode::from(app::exit_code(&e))
        }
    }
}
