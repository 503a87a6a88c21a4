//! modpublish binary entry point.

fn main() {
    if let Err(e) = modpublish::cli::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
