//! 連続領域アロケータの対話的シミュレータ.
//!
//! ```text
//! $ allocator <initial_memory_size>
//! allocator> RQ P1 40 F
//! allocator> STAT
//! ```
extern crate contalloc;
#[macro_use]
extern crate trackable;

use contalloc::manager::MemoryManager;
use contalloc::shell::{self, Shell};
use std::env;
use std::io;
use std::process;

fn main() {
    let arg = match env::args().nth(1) {
        Some(arg) => arg,
        None => {
            eprintln!("Usage: allocator <initial_memory_size>");
            process::exit(1);
        }
    };
    let capacity = match shell::parse_capacity(&arg) {
        Ok(capacity) => capacity,
        Err(_) => {
            eprintln!("Invalid initial memory size provided.");
            process::exit(1);
        }
    };

    let manager = track_try_unwrap!(MemoryManager::new(capacity));
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(manager, stdout.lock());
    track_try_unwrap!(shell.run(stdin.lock()));
}
