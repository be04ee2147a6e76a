use std::process::ExitCode;

fn main() -> ExitCode {
    htlogic::shell::main(std::env::args().collect())
}
