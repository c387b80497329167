//! Argument parsing

use anyhow::{Context, Result, bail};

pub const USAGE: &str = "\
usage: flexbe [--config <path>] [--metrics] <command>

commands:
  languages [--user]          site (or interface) languages
  currencies                  site currencies
  pages <site_id> [--limit N] list pages of a site
  page <site_id> <page_id>    show one page
  token                       bearer session state
  revoke                      log out the bearer session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Languages { user: bool },
    Currencies,
    Pages { site_id: u64, limit: Option<u64> },
    Page { site_id: u64, page_id: u64 },
    Token,
    Revoke,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub config: Option<String>,
    pub metrics: bool,
    pub command: Command,
}

/// Parse arguments, not including the program name.
pub fn parse(args: &[String]) -> Result<Cli> {
    let mut config = None;
    let mut metrics = false;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(iter.next().context("--config needs a path")?.clone());
            }
            "--metrics" => metrics = true,
            _ => rest.push(arg.as_str()),
        }
    }

    let command = match rest.as_slice() {
        ["languages"] => Command::Languages { user: false },
        ["languages", "--user"] => Command::Languages { user: true },
        ["currencies"] => Command::Currencies,
        ["pages", site_id] => Command::Pages {
            site_id: id(site_id)?,
            limit: None,
        },
        ["pages", site_id, "--limit", limit] => Command::Pages {
            site_id: id(site_id)?,
            limit: Some(limit.parse().with_context(|| format!("invalid limit: {limit}"))?),
        },
        ["page", site_id, page_id] => Command::Page {
            site_id: id(site_id)?,
            page_id: id(page_id)?,
        },
        ["token"] => Command::Token,
        ["revoke"] => Command::Revoke,
        [] => bail!("missing command\n\n{USAGE}"),
        other => bail!("unrecognized arguments: {}\n\n{USAGE}", other.join(" ")),
    };

    Ok(Cli {
        config,
        metrics,
        command,
    })
}

fn id(raw: &str) -> Result<u64> {
    raw.parse().with_context(|| format!("invalid id: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = parse(&args("pages 12 --config /etc/flexbe.toml --limit 5 --metrics")).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/etc/flexbe.toml"));
        assert!(cli.metrics);
        assert_eq!(
            cli.command,
            Command::Pages {
                site_id: 12,
                limit: Some(5)
            }
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse(&args("token")).unwrap().command, Command::Token);
        assert_eq!(parse(&args("revoke")).unwrap().command, Command::Revoke);
        assert_eq!(
            parse(&args("languages --user")).unwrap().command,
            Command::Languages { user: true }
        );
        assert_eq!(
            parse(&args("page 3 44")).unwrap().command,
            Command::Page {
                site_id: 3,
                page_id: 44
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&args("pages abc")).is_err());
        assert!(parse(&args("frobnicate")).is_err());
        assert!(parse(&args("token --config")).is_err());
    }
}
