//! Point lookup: the note for the period containing a date.

use perinote_core::periodic::DateFormat;

use crate::{GlobalArgs, NoteArgs};

pub fn run(global: &GlobalArgs, args: &NoteArgs) {
    let (rc, _log) = super::load_config(global);
    let date = super::parse_date_arg(&args.date);
    let granularity = args.granularity;

    if !rc.periodic.is_enabled(granularity) {
        eprintln!("{} notes are not enabled in profile '{}'", granularity, rc.active_profile);
        std::process::exit(1);
    }

    let index = super::build_index(&rc);
    if let Some(path) = index.note_for_period(granularity, date) {
        println!("{path}");
        return;
    }

    let settings = rc.periodic.get(granularity);
    let name = DateFormat::new(settings.effective_format(granularity))
        .format(date, rc.periodic.week_rules());
    let expected = match settings.normalized_folder() {
        "" => format!("{name}.md"),
        folder => format!("{folder}/{name}.md"),
    };
    eprintln!("No {} note for {}; expected {}", granularity, date, expected);
    std::process::exit(1);
}
