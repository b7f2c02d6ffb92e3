use crate::services::classifier::{
    ClassificationRule, Classifier, DEFAULT_LARGE_FILE_THRESHOLD, RuleSet,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments. Built once at startup
/// and handed to the services that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub verbose: bool,
    pub large_file_threshold: u64,
    pub rules: RuleSet,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Event-driven S3 object filetype tagger")]
pub struct Args {
    /// Host to bind to (overrides OBJECT_TAGGER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides OBJECT_TAGGER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL for the tag store (overrides OBJECT_TAGGER_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Log diagnostic output, including full event payloads (or set VERBOSE)
    #[arg(long, short)]
    pub verbose: bool,

    /// Size in bytes at which unmatched objects are tagged `largefile`
    /// (overrides OBJECT_TAGGER_LARGE_FILE_THRESHOLD)
    #[arg(long)]
    pub large_file_threshold: Option<u64>,

    /// Classification rule as `label=regex`; repeat for more, first match
    /// wins (overrides OBJECT_TAGGER_RULES, a `;`-separated list)
    #[arg(long = "rule", value_name = "LABEL=REGEX")]
    pub rules: Vec<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();
        Self::resolve(args, |name| env::var(name))
    }

    /// Merge parsed arguments with values from `lookup`, which stands in for
    /// the process environment.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<(Self, bool)>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = lookup("OBJECT_TAGGER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match lookup("OBJECT_TAGGER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing OBJECT_TAGGER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading OBJECT_TAGGER_PORT"),
        };
        let env_db = lookup("OBJECT_TAGGER_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/tags.db".into());
        let env_verbose = lookup("VERBOSE").map(|v| !v.is_empty()).unwrap_or(false);
        let env_threshold = match lookup("OBJECT_TAGGER_LARGE_FILE_THRESHOLD") {
            Ok(value) => value.parse::<u64>().with_context(|| {
                format!("parsing OBJECT_TAGGER_LARGE_FILE_THRESHOLD value `{}`", value)
            })?,
            Err(env::VarError::NotPresent) => DEFAULT_LARGE_FILE_THRESHOLD,
            Err(err) => return Err(err).context("reading OBJECT_TAGGER_LARGE_FILE_THRESHOLD"),
        };

        let rule_args: Vec<String> = if !args.rules.is_empty() {
            args.rules
        } else {
            match lookup("OBJECT_TAGGER_RULES") {
                Ok(value) => value
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                Err(env::VarError::NotPresent) => Vec::new(),
                Err(err) => return Err(err).context("reading OBJECT_TAGGER_RULES"),
            }
        };
        let rules = if rule_args.is_empty() {
            RuleSet::defaults()?
        } else {
            let parsed = rule_args
                .iter()
                .map(|raw| ClassificationRule::parse(raw))
                .collect::<Result<Vec<_>, _>>()
                .context("parsing classification rules")?;
            RuleSet::new(parsed).context("building classification rules")?
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            verbose: args.verbose || env_verbose,
            large_file_threshold: args.large_file_threshold.unwrap_or(env_threshold),
            rules,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.rules.clone(), self.large_file_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(argv: &[&str], vars: &[(&str, &str)]) -> Result<(AppConfig, bool)> {
        let argv = std::iter::once("object-tagger").chain(argv.iter().copied());
        let args = Args::try_parse_from(argv).unwrap();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::resolve(args, |name| {
            vars.get(name).cloned().ok_or(env::VarError::NotPresent)
        })
    }

    #[test]
    fn defaults() {
        let (cfg, migrate) = resolve(&[], &[]).unwrap();
        assert!(!migrate);
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.database_url, "sqlite://./data/tags.db");
        assert!(!cfg.verbose);
        assert_eq!(cfg.large_file_threshold, 50 * 1024 * 1024);
        let labels: Vec<&str> = cfg.rules.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["fastq", "bam"]);
        assert_eq!(cfg.default_log_filter(), "info");
    }

    #[test]
    fn cli_overrides_environment() {
        let (cfg, migrate) = resolve(
            &["--port", "8080", "--large-file-threshold", "1024", "--migrate"],
            &[
                ("OBJECT_TAGGER_PORT", "9000"),
                ("OBJECT_TAGGER_HOST", "127.0.0.1"),
                ("OBJECT_TAGGER_LARGE_FILE_THRESHOLD", "5"),
            ],
        )
        .unwrap();
        assert!(migrate);
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.large_file_threshold, 1024);
    }

    #[test]
    fn verbose_from_env_or_flag() {
        let (cfg, _) = resolve(&[], &[("VERBOSE", "1")]).unwrap();
        assert!(cfg.verbose);
        assert_eq!(cfg.default_log_filter(), "debug");

        let (cfg, _) = resolve(&[], &[("VERBOSE", "")]).unwrap();
        assert!(!cfg.verbose);

        let (cfg, _) = resolve(&["--verbose"], &[]).unwrap();
        assert!(cfg.verbose);
    }

    #[test]
    fn rules_from_environment_keep_order() {
        let (cfg, _) = resolve(
            &[],
            &[("OBJECT_TAGGER_RULES", r"cram=\.cram$; vcf=\.vcf(\.gz)?$")],
        )
        .unwrap();
        let labels: Vec<&str> = cfg.rules.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["cram", "vcf"]);
    }

    #[test]
    fn cli_rules_replace_environment_rules() {
        let (cfg, _) = resolve(
            &["--rule", r"bam=\.bam$"],
            &[("OBJECT_TAGGER_RULES", r"cram=\.cram$")],
        )
        .unwrap();
        let labels: Vec<&str> = cfg.rules.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["bam"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(resolve(&[], &[("OBJECT_TAGGER_PORT", "not-a-port")]).is_err());
        assert!(resolve(&[], &[("OBJECT_TAGGER_LARGE_FILE_THRESHOLD", "-1")]).is_err());
        assert!(resolve(&["--rule", "broken"], &[]).is_err());
        assert!(resolve(&["--rule", r"a=\.a$", "--rule", r"a=\.b$"], &[]).is_err());
    }
}
