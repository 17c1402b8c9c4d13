use callcenter_reports::cli::{CliError, parse_cli, run};

fn is_robot_mode_args() -> bool {
    std::env::args().any(|arg| arg == "--json")
}

fn report_failure(err: &CliError) -> ! {
    if is_robot_mode_args() {
        eprintln!("{}", err.to_json());
    } else {
        eprintln!("Error: {}", err.message);
    }
    std::process::exit(err.code);
}

fn main() {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();
    callcenter_reports::init_tracing();

    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => report_failure(&err),
    };

    if let Err(err) = run(cli) {
        report_failure(&err);
    }
}
