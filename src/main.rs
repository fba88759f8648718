use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(e) = hostel_admin::app::run_cli() {
        eprintln!("{} {e}", "[ERR]".red().bold());
        exit(1);
    }
}
