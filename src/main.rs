use ipenricher::app::App;
use ipenricher::cli::Cli;

fn main() {
    let cli = Cli::from_args();
    let error_enabled = cli.error_enabled();

    // Every handled failure class prints one message and exits cleanly;
    // there is no exit-code taxonomy beyond ran-to-completion vs stopped.
    if let Err(e) = App::new(cli).run() {
        if error_enabled {
            eprintln!("Error: {e}");
        }
    }
}
