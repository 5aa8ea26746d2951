//! adnlctl - inspect TON lite-servers from the command line

use std::process;
use ton_adnlctl::{
    app::App,
    cli::{supports_color, Cli, Command},
    config::EnvManager,
    error::{AppError, Result},
    output::StatusReporter,
};

/// Conventional exit status after SIGINT
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse_args();
    let verbose = cli.wants_details();

    let outcome = tokio::select! {
        outcome = run_application(cli) => outcome,
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", StatusReporter::new(supports_color()).interrupted_banner());
            process::exit(EXIT_INTERRUPTED);
        }
    };

    if let Err(e) = outcome {
        let use_color = supports_color();
        eprintln!("Error: {}", e.format_for_console(use_color));
        if verbose {
            print_error_suggestions(&e);
        }
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Status(args) => {
            let app = App::from_args(args).await?;
            app.run().await?;
            Ok(())
        }
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    let suggestions = error.suggestions();
    if !suggestions.is_empty() {
        eprintln!();
        for suggestion in suggestions {
            eprintln!("  - {}", suggestion);
        }
    }

    if matches!(error, AppError::Validation(_)) {
        eprintln!();
        eprint!("{}", EnvManager::display_env_help());
    }
}
