//! Entry point for the Gather command-line interface.
#![forbid(unsafe_code)]
#![expect(
    clippy::print_stderr,
    reason = "the binary's only job is to surface errors on stderr"
)]

fn main() {
    if let Err(err) = gather_cli::run() {
        eprintln!("gather: {err}");
        std::process::exit(1);
    }
}
