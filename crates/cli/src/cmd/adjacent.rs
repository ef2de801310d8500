//! Previous/next note navigation.

use perinote_core::periodic::Direction;

use crate::{AdjacentArgs, GlobalArgs};

pub fn run(global: &GlobalArgs, args: &AdjacentArgs) {
    let (rc, _log) = super::load_config(global);
    let index = super::build_index(&rc);

    let path = if args.path.is_absolute() {
        let absolute = args.path.canonicalize().unwrap_or_else(|_| args.path.clone());
        match index.store().vault_file(&absolute) {
            Some(file) => file.path,
            None => {
                eprintln!("{} is not inside the vault", args.path.display());
                std::process::exit(1);
            }
        }
    } else {
        args.path.to_string_lossy().replace('\\', "/")
    };

    if index.find(&path).is_none() {
        eprintln!("{path} is not a periodic note");
        std::process::exit(1);
    }

    let (direction, label) = if args.backward {
        (Direction::Backward, "previous note before")
    } else {
        (Direction::Forward, "next note after")
    };
    match index.find_adjacent(&path, direction) {
        Some(entry) => println!("{}", entry.file_path),
        None => {
            eprintln!("No {label} {path}");
            std::process::exit(1);
        }
    }
}
