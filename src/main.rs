use clap::Parser;
use quadrant::cli::commands::Cli;
use quadrant::cli::handlers;
use quadrant::io::store_io::resolve_data_path;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            let data = resolve_data_path(cli.data.as_deref());
            if let Err(e) = quadrant::tui::run(&data) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
