use std::env;
use std::path::PathBuf;
use std::process;

use getopts::{Matches, Options};

use pbxnorm::{Normalizer, Result, StageReport};

const BRIEF: &str = "Usage: pbxnorm [-v][-u][-s][-c][-p] path/to/Project.xcodeproj";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut opts = Options::new();
    opts.optflag("v", "verbose", "output verbose messages");
    opts.optflag("u", "unique", "uniquify the project file");
    opts.optflag(
        "s",
        "sort",
        "sort the project file; with neither -u nor -s, both run",
    );
    opts.optflag(
        "c",
        "combine-commit",
        "exit with status 100 when the project file was modified (for git hooks)",
    );
    opts.optflag(
        "p",
        "sort-pbx-by-filename",
        "order the PBXFileReference and PBXBuildFile sections by file name instead of by digest (the digest order matches Xcode)",
    );
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args) {
        Ok(matches) => matches,
        Err(failure) => {
            eprintln!("{}", failure);
            process::exit(2);
        }
    };
    if matches.opt_present("h") {
        print!("{}", opts.usage(BRIEF));
        return;
    }

    let mut logger = env_logger::Builder::from_default_env();
    if matches.opt_present("v") {
        logger.filter_level(log::LevelFilter::Debug);
    }
    let _ = logger.try_init();

    if matches.free.len() != 1 {
        eprintln!("{}", opts.usage(BRIEF));
        eprintln!("pbxnorm requires exactly one positional argument: the path to the xcodeproj.");
        process::exit(1);
    }

    match run(&matches) {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    }
}

fn run(matches: &Matches) -> Result<i32> {
    let target = PathBuf::from(&matches.free[0]);
    let verbose = matches.opt_present("v");
    let unique_requested = matches.opt_present("u");
    let sort_requested = matches.opt_present("s");
    let by_filename = matches.opt_present("p");
    let both = !unique_requested && !sort_requested;

    let mut normalizer = Normalizer::open(&target)?;
    if both {
        println!("Uniquify and Sort");
    }

    if both || unique_requested {
        if !both {
            println!("Uniquify...");
        }
        let report = normalizer.uniquify()?;
        if verbose {
            let dump = normalizer.dump_debug_result()?;
            eprintln!("Debug result json file has been written to '{}'", dump.display());
        }
        report_stage(
            &normalizer,
            &report,
            "uniquify",
            "Uniquify done",
            "Following lines were deleted because of invalid format or no longer being used:",
        );
    }
    if both || sort_requested {
        if !both {
            println!("Sort...");
        }
        let report = normalizer.sort(by_filename)?;
        report_stage(
            &normalizer,
            &report,
            "sort",
            "Sort done",
            "Following lines were deleted because of duplication:",
        );
    }
    if both {
        println!("Uniquify and Sort done");
    }

    if matches.opt_present("c") {
        if normalizer.is_modified() {
            eprintln!("File 'project.pbxproj' was modified, please add it and then commit.");
            return Ok(100);
        }
    } else if normalizer.is_modified() {
        eprintln!(
            "File 'project.pbxproj' was modified, please add it and commit again to pick up the result.\n\
             NOTICE: pass '-c' to combine the result with your original commit instead."
        );
    }
    Ok(0)
}

fn report_stage(
    normalizer: &Normalizer,
    report: &StageReport,
    stage: &str,
    done: &str,
    removed_header: &str,
) {
    if !report.changed {
        println!(
            "Ignore {}, no changes made to \"{}\"",
            stage,
            normalizer.project().pbxproj_path.display()
        );
        return;
    }
    println!("{}", done);
    for warning in &report.warnings {
        eprintln!("{}", warning);
    }
    if !report.removed_lines.is_empty() {
        eprintln!("{}", removed_header);
        for line in &report.removed_lines {
            // Removed lines keep their own terminators
            eprint!("{}", line);
        }
    }
}
