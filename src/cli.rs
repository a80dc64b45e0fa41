//! CLI: declaration documents → `<Name>+JsonGen.swift`
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::ast::SourceFile;
use crate::codegen::{GeneratedFile, make_file};
use crate::registry::GlobalAttrs;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Swift `decodeJson`/`encodeJson` extensions from parsed Swift declarations
#[derive(Parser, Debug)]
#[command(name = "swift-json-gen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate one `+JsonGen.swift` file per declaration document
    Generate(GenerateOut),
    /// print the existing codecs and type aliases found in the inputs
    Registry(RegistryOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JQ filter applied to each input; every output is one declaration document
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more declaration documents (JSON). May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory (next to each input if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// print generated files to stdout instead of writing them
    #[arg(long, conflicts_with = "out")]
    stdout: bool,

    /// also write the `JsonGen.swift` support file into the output directory
    #[arg(long)]
    emit_runtime: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct RegistryOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// A declaration document and the file it was read from.
struct Document {
    path: PathBuf,
    file: SourceFile,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|error| anyhow::anyhow!("failed to resolve input file paths: {error}"))?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read {source_path_str}"))?;
            let files = match self.jq_expr.as_ref() {
                None => vec![
                    crate::path_de::from_str_with_path::<SourceFile>(&source)
                        .map_err(|error| anyhow::anyhow!("{source_path_str}: {error}"))?,
                ],
                Some(jq_expr) => {
                    let json_value = serde_json::from_str::<serde_json::Value>(&source)
                        .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                    crate::jq_exec::run_jaq(jq_expr, &json_value)
                        .with_context(|| format!("failed to apply jq expression to {source_path_str}"))?
                        .into_iter()
                        .map(|value| {
                            crate::path_de::from_value_with_path::<SourceFile>(value)
                                .map_err(|error| anyhow::anyhow!("{source_path_str}: {error}"))
                        })
                        .collect::<Result<Vec<_>>>()?
                }
            };
            for file in files {
                file.validate()
                    .with_context(|| format!("{source_path_str}: invalid declarations in {}", file.filename))?;
                documents.push(Document { path: source_path.clone(), file });
            }
        }
        Ok(documents)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                target.run()
            }
            Command::Registry(target) => {
                let documents = target.input_settings.load()?;
                let attrs = GlobalAttrs::scan(documents.iter().map(|d| &d.file));
                let registry_src = serde_json::to_string_pretty(&attrs)?;
                match target.out.as_ref() {
                    Some(out) => write_file(out, &registry_src)?,
                    None => println!("{registry_src}"),
                }
                Ok(())
            }
        }
    }
}

impl GenerateOut {
    fn run(&self) -> Result<()> {
        // 1) every document first: the registry spans all inputs
        let documents = self.input_settings.load()?;
        let attrs = GlobalAttrs::scan(documents.iter().map(|d| &d.file));

        // 2) generate in parallel, one task per document
        let generated_at = Utc::now();
        let results = documents
            .par_iter()
            .map(|doc| make_file(&doc.file, &attrs, generated_at))
            .collect::<Vec<_>>();

        // 3) report and write in input order
        let mut failures = 0usize;
        for (doc, result) in documents.iter().zip(results) {
            let generated = match result {
                Ok(generated) => generated,
                Err(error) => {
                    failures += 1;
                    eprintln!("{} {}: {error}", "✗".red().bold(), doc.file.filename);
                    continue;
                }
            };
            for warning in &generated.warnings {
                eprintln!(
                    "{} {}.{}: dictionary key `{}` does not encode to a JSON string",
                    "warning:".yellow().bold(),
                    warning.type_name,
                    warning.field,
                    warning.key,
                );
            }
            if generated.is_empty() {
                eprintln!("{} {} (nothing to generate)", "–".yellow(), doc.file.filename);
                continue;
            }
            self.output(doc, &generated)?;
        }

        if self.emit_runtime {
            let dir = self.out.clone().unwrap_or_else(|| PathBuf::from("."));
            let path = dir.join(crate::runtime::FILENAME);
            write_file(&path, crate::runtime::SOURCE)?;
            eprintln!("{} {}", "✓".green(), path.display());
        }

        if failures > 0 {
            bail!("{failures} of {} document(s) failed", documents.len());
        }
        Ok(())
    }

    fn output(&self, doc: &Document, generated: &GeneratedFile) -> Result<()> {
        if self.stdout {
            print!("{}", generated.contents());
            return Ok(());
        }
        let dir = match self.out.as_ref() {
            Some(out) => out.clone(),
            None => doc.path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let path = dir.join(&generated.filename);
        write_file(&path, &generated.contents())?;
        eprintln!("{} {}", "✓".green(), path.display());
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CommandLineInterface::command().debug_assert();
    }

    #[test]
    fn parses_generate_flags() {
        let cli = CommandLineInterface::parse_from([
            "swift-json-gen", "generate", "-i", "a.json", "b.json", "--out", "gen", "--emit-runtime",
        ]);
        let Command::Generate(target) = cli.cmd else { panic!("expected generate") };
        assert_eq!(target.input_settings.input, ["a.json", "b.json"]);
        assert_eq!(target.out.as_deref(), Some(Path::new("gen")));
        assert!(target.emit_runtime && !target.stdout);
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["models.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("models.json")]);
        assert!(resolve_file_path_patterns(["/definitely/not/here/*.json"]).is_err());
    }
}
