use tracing_subscriber::EnvFilter;

fn main() {
    let matches = cdag_cli::cli().get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cdag_cli::run(&matches) {
        Ok(output) => {
            print!("{}", output.body);
            std::process::exit(output.exit_code);
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
