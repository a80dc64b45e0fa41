//! Golden-file runner: regenerates every `fixtures/*.json` and compares it
//! with the `+JsonGen.swift` file next to it.
//!
//! ```text
//! cargo run -p dev-test-runner            # compare
//! cargo run -p dev-test-runner -- --bless # overwrite the expected files
//! ```
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{TimeZone, Utc};
use colored::Colorize;
use swift_json_gen::ast::SourceFile;
use swift_json_gen::codegen::make_file;
use swift_json_gen::registry::GlobalAttrs;

fn main() -> Result<()> {
    let bless = std::env::args().any(|a| a == "--bless");
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");

    let pattern = fixtures.join("*.json");
    let mut documents = Vec::<(PathBuf, SourceFile)>::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry?;
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file = swift_json_gen::path_de::from_str_with_path::<SourceFile>(&source)
            .map_err(|error| anyhow!("{}: {error}", path.display()))?;
        documents.push((path, file));
    }

    let attrs = GlobalAttrs::scan(documents.iter().map(|(_, file)| file));
    // fixed so the header line is stable
    let generated_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    let mut failed = 0usize;
    for (path, file) in &documents {
        let generated = make_file(file, &attrs, generated_at)
            .with_context(|| format!("generation failed for {}", path.display()))?;
        let expected_path = fixtures.join(&generated.filename);
        let actual = generated.contents();

        if bless {
            std::fs::write(&expected_path, &actual)?;
            eprintln!("{} {}", "blessed".yellow(), expected_path.display());
            continue;
        }

        let expected = std::fs::read_to_string(&expected_path).unwrap_or_default();
        if expected == actual {
            eprintln!("{} {}", "✅ ok".green(), file.filename);
        } else {
            failed += 1;
            eprintln!("{} {}", "❌ mismatch".red(), file.filename);
            report_first_difference(&expected, &actual);
        }
    }

    if failed > 0 {
        return Err(anyhow!("{failed} fixture(s) differ"));
    }
    Ok(())
}

fn report_first_difference(expected: &str, actual: &str) {
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    for line_no in 1.. {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => return,
            (e, a) if e == a => continue,
            (e, a) => {
                eprintln!("   line {line_no}");
                eprintln!("   {} {}", "-".red(), e.unwrap_or("<eof>"));
                eprintln!("   {} {}", "+".green(), a.unwrap_or("<eof>"));
                return;
            }
        }
    }
}
