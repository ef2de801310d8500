//! List command implementation.

use super::output::print_entries;
use crate::{GlobalArgs, ListArgs};

pub fn run(global: &GlobalArgs, args: &ListArgs) {
    let (rc, _log) = super::load_config(global);
    let index = super::build_index(&rc);

    let entries: Vec<_> = index
        .entries()
        .into_iter()
        .filter(|e| args.granularity.is_none_or(|g| e.granularity == g))
        .collect();

    print_entries(&entries, args.json);
}
