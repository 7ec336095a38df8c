fn main() {
    if let Err(err) = drcrun::cli::run() {
        // Logging may not be up yet if the run directory could not be
        // created, so the terminal error goes to stderr directly.
        eprintln!("drcrun: {err:#}");
        std::process::exit(1);
    }
}
