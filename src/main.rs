use appcall::infrastructure::loader::RegistryLoader;
use appcall::infrastructure::{logging, output};
use appcall::presentation::cli::Cli;
use clap::Parser;

/// appcall: exercise a web application without opening a socket
///
/// Parses repeatable headers, query strings, a JSON body or form fields and
/// files, dispatches the request into a registered application router and
/// prints the status, body and (optionally) headers as indented JSON.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    logging::install_panic_hook();
    let loader = RegistryLoader::with_builtin();

    if let Err(err) = cli.run(&loader).await {
        output::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
