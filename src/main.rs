//! Gemini Goblin CLI
//!
//! Usage tracking and cost analytics for the Gemini CLI.

fn main() {
    if let Err(e) = gemini_goblin::cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
