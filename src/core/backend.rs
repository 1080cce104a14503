//! Subprocess seam to the `pkg(8)`-style package manager.
//!
//! Everything that shells out lives behind [`PkgBackend`] so the inventory
//! and the UI can be exercised against an in-memory implementation in tests.

use std::io;
use std::process::Command;

use thiserror::Error;

/// Field separator used in the query format strings. Package comments can
/// contain almost anything printable, so an unlikely control byte is used.
const DELIMITER: char = '\u{2}';

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not execute [{command}]: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("[{command}] exited with status {status}")]
    Failed { command: String, status: i32 },
    #[error("malformed output from [{command}]: {detail}")]
    Parse { command: String, detail: String },
}

/// One record as produced by a repository query, before status merging.
#[derive(Debug, Clone)]
pub struct RawPackage {
    pub origin: String,
    pub version: String,
    pub comment: String,
    pub description: String,
}

/// The external package manager, reduced to the operations the browser needs.
pub trait PkgBackend: Send + Sync {
    /// All packages available in the remote repository.
    fn query_remote(&self) -> Result<Vec<RawPackage>, BackendError>;
    /// All packages installed locally.
    fn query_local(&self) -> Result<Vec<RawPackage>, BackendError>;
    /// Origins matching a search term.
    fn search(&self, term: &str) -> Result<Vec<String>, BackendError>;
    fn install(&self, origins: &[String]) -> Result<(), BackendError>;
    fn remove(&self, origins: &[String]) -> Result<(), BackendError>;
    /// Whether commits are allowed to proceed.
    fn has_privileges(&self) -> bool;
}

// ───────────────────────────────────────── pkg CLI ───────────

/// Real backend driving the `pkg` command line tool.
pub struct PkgCli;

impl PkgCli {
    pub fn new() -> Self {
        Self
    }

    fn query(&self, subcommand: &str) -> Result<Vec<RawPackage>, BackendError> {
        let format = format!("%o{DELIMITER}%v{DELIMITER}%c{DELIMITER}%e{DELIMITER}");
        let output = self.run(&[subcommand, "-a", &format])?;
        parse_query_output(subcommand, &output)
    }

    fn run(&self, args: &[&str]) -> Result<String, BackendError> {
        let command = format!("pkg {}", args.join(" "));
        tracing::debug!("running [{command}]");
        let output = Command::new("pkg").args(args).output().map_err(|source| {
            BackendError::Spawn {
                command: command.clone(),
                source,
            }
        })?;
        if !output.status.success() {
            return Err(BackendError::Failed {
                command,
                status: output.status.code().unwrap_or(-1),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_with_origins(&self, base: &[&str], origins: &[String]) -> Result<(), BackendError> {
        let mut args: Vec<&str> = base.to_vec();
        args.extend(origins.iter().map(String::as_str));
        self.run(&args).map(|_| ())
    }
}

impl Default for PkgCli {
    fn default() -> Self {
        Self::new()
    }
}

impl PkgBackend for PkgCli {
    fn query_remote(&self) -> Result<Vec<RawPackage>, BackendError> {
        self.query("rquery")
    }

    fn query_local(&self) -> Result<Vec<RawPackage>, BackendError> {
        self.query("query")
    }

    fn search(&self, term: &str) -> Result<Vec<String>, BackendError> {
        let output = self.run(&["search", "-o", term])?;
        // One match per line, origin first, padded description after.
        Ok(output
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect())
    }

    fn install(&self, origins: &[String]) -> Result<(), BackendError> {
        if origins.is_empty() {
            return Ok(());
        }
        self.run_with_origins(&["install", "-qy"], origins)
    }

    fn remove(&self, origins: &[String]) -> Result<(), BackendError> {
        if origins.is_empty() {
            return Ok(());
        }
        self.run_with_origins(&["delete", "-qy"], origins)
    }

    fn has_privileges(&self) -> bool {
        // Safety: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
}

/// Split a query dump into records. Each record is four delimited fields
/// followed by a newline; descriptions may themselves span several lines.
fn parse_query_output(subcommand: &str, output: &str) -> Result<Vec<RawPackage>, BackendError> {
    let mut fields = output.split(DELIMITER).peekable();
    let mut packages = Vec::new();

    loop {
        let Some(first) = fields.next() else { break };
        // The leading field carries the previous record's terminating newline.
        let origin = first.trim_start_matches('\n');
        if origin.is_empty() {
            break;
        }
        let mut take = |what: &str| -> Result<String, BackendError> {
            fields
                .next()
                .map(str::to_string)
                .ok_or_else(|| BackendError::Parse {
                    command: format!("pkg {subcommand}"),
                    detail: format!("EOF while reading {what} for [{origin}]"),
                })
        };
        let version = take("version")?;
        let comment = take("comment")?;
        let description = take("description")?;
        packages.push(RawPackage {
            origin: origin.to_string(),
            version,
            comment,
            description,
        });
    }

    Ok(packages)
}

// ───────────────────────────────────────── test backend ──────


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delimited_records() {
        let d = DELIMITER;
        let output = format!(
            "editors/vim{d}9.1{d}Vim editor{d}A long description\nover two lines{d}\n\
             shells/zsh{d}5.9{d}Z shell{d}The Z shell{d}\n"
        );
        let pkgs = parse_query_output("rquery", &output).unwrap();
        assert_eq!(pkgs.len(), 2);
        assert_eq!(pkgs[0].origin, "editors/vim");
        assert_eq!(pkgs[0].version, "9.1");
        assert_eq!(pkgs[0].description, "A long description\nover two lines");
        assert_eq!(pkgs[1].origin, "shells/zsh");
    }

    #[test]
    fn truncated_record_is_an_error() {
        let d = DELIMITER;
        let output = format!("editors/vim{d}9.1{d}");
        assert!(matches!(
            parse_query_output("query", &output),
            Err(BackendError::Parse { .. })
        ));
    }

    #[test]
    fn empty_output_yields_no_records() {
        assert!(parse_query_output("query", "").unwrap().is_empty());
    }
}
