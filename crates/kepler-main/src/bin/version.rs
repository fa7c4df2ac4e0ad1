// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Tiny binary that outputs the Kepler workspace version, also used as the
//! `planner_version` stamped onto every solved [`kepler_types::ScheduleMeta`].

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            eprintln!("kepler-version - print the Kepler workspace version");
            eprintln!();
            eprintln!("Usage: kepler-version [OPTIONS]");
            eprintln!();
            eprintln!("  -h, --help     Print this help message");
            eprintln!("  -v, --version  Print version (same as no args)");
        }
        Some("--version" | "-v") | None => print!("{VERSION}"),
        Some(other) => {
            eprintln!("Unknown option: {other}");
            std::process::exit(1);
        }
    }
}
