use std::process::ExitCode;

fn main() -> ExitCode {
    quickfm::lib_main()
}
