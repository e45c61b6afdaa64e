use std::process::exit;

fn main() {
    if let Err(e) = critterdex::app::run_cli() {
        eprintln!("error: {e}");
        exit(1);
    }
}
