//! `ngapi` binary.

fn main() {
    ngapi_cli::init_tracing();
    let code = ngapi_cli::run_cli(std::env::args().collect());
    std::process::exit(code);
}
