//! Range query over one calendar period.

use super::output::print_entries;
use crate::{GlobalArgs, PeriodArgs};

pub fn run(global: &GlobalArgs, args: &PeriodArgs) {
    let (rc, _log) = super::load_config(global);
    let date = super::parse_date_arg(&args.date);

    if !rc.periodic.is_enabled(args.granularity) {
        eprintln!("{} notes are not enabled in profile '{}'", args.granularity, rc.active_profile);
        std::process::exit(1);
    }

    let index = super::build_index(&rc);
    let entries = index.entries_for_period(args.granularity, date, args.finer);
    print_entries(&entries, args.json);
}
