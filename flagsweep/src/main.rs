fn main() {
    if let Err(err) = flagsweep::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(flagsweep::exit_code(&err));
    }
}
