use std::process::ExitCode;

fn main() -> ExitCode {
    sweetshop_cli::run()
}
