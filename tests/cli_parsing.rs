//! Tests for CLI subcommand parsing.

use std::path::PathBuf;

use clap::Parser;
use domain_sift::config::{Command, DEFAULT_RESOLVERS_FILE, DEFAULT_TRUSTED_RESOLVERS_FILE};
use domain_sift::{Cli, EngineKind, InputMode};

#[test]
fn test_resolve_subcommand_defaults() {
    let cli = Cli::try_parse_from(["domain_sift", "resolve", "domains.txt"]).unwrap();
    assert!(matches!(cli.command, Command::Resolve(_)));

    let (config, quiet) = cli.into_config();
    assert!(!quiet);
    assert_eq!(
        config.input,
        InputMode::ResolveFile(PathBuf::from("domains.txt"))
    );
    assert_eq!(config.resolvers_file, PathBuf::from(DEFAULT_RESOLVERS_FILE));
    assert_eq!(
        config.trusted_resolvers_file,
        PathBuf::from(DEFAULT_TRUSTED_RESOLVERS_FILE)
    );
    assert_eq!(config.rate_limit, 0);
    assert_eq!(config.rate_limit_trusted, None);
    assert_eq!(config.engine, EngineKind::Massdns);
    assert!(config.sanitize);
    assert!(!config.skip_wildcard_filter);
    assert!(!config.skip_validation);
    assert!(config.outputs.domains.is_none());
}

#[test]
fn test_bruteforce_subcommand() {
    let cli = Cli::try_parse_from(["domain_sift", "bruteforce", "words.txt", "example.com"])
        .unwrap();
    let (config, _) = cli.into_config();
    assert_eq!(
        config.input,
        InputMode::Bruteforce {
            wordlist: PathBuf::from("words.txt"),
            base_domain: "example.com".to_string(),
        }
    );
}

#[test]
fn test_all_options() {
    let cli = Cli::try_parse_from([
        "domain_sift",
        "resolve",
        "-",
        "-r",
        "pub.txt",
        "--resolvers-trusted",
        "trust.txt",
        "-l",
        "500",
        "--rate-limit-trusted",
        "40",
        "--engine",
        "native",
        "-b",
        "/opt/massdns",
        "--wildcard-bin",
        "/opt/detect",
        "--skip-sanitize",
        "--skip-wildcard-filter",
        "--skip-validation",
        "-w",
        "out.txt",
        "--write-massdns",
        "records.txt",
        "--write-wildcards",
        "wildcards.txt",
        "--write-wildcard-answers",
        "answers.txt",
        "-q",
        "--debug",
    ])
    .unwrap();
    let (config, quiet) = cli.into_config();

    assert!(quiet);
    assert!(config.debug);
    assert_eq!(config.input, InputMode::ResolveFile(PathBuf::from("-")));
    assert_eq!(config.resolvers_file, PathBuf::from("pub.txt"));
    assert_eq!(config.trusted_resolvers_file, PathBuf::from("trust.txt"));
    assert_eq!(config.rate_limit, 500);
    assert_eq!(config.rate_limit_trusted, Some(40));
    assert_eq!(config.engine, EngineKind::Native);
    assert_eq!(config.massdns_bin, PathBuf::from("/opt/massdns"));
    assert_eq!(config.wildcard_bin, PathBuf::from("/opt/detect"));
    assert!(!config.sanitize);
    assert!(config.skip_wildcard_filter);
    assert!(config.skip_validation);
    assert_eq!(config.outputs.domains, Some(PathBuf::from("out.txt")));
    assert_eq!(config.outputs.records, Some(PathBuf::from("records.txt")));
    assert_eq!(
        config.outputs.wildcard_roots,
        Some(PathBuf::from("wildcards.txt"))
    );
    assert_eq!(
        config.outputs.wildcard_answers,
        Some(PathBuf::from("answers.txt"))
    );
}

#[test]
fn test_trusted_rate_defaults_to_ten_per_resolver() {
    let cli = Cli::try_parse_from(["domain_sift", "resolve", "domains.txt"]).unwrap();
    let (config, _) = cli.into_config();
    assert_eq!(config.trusted_rate_limit(3), 30);

    let cli = Cli::try_parse_from([
        "domain_sift",
        "resolve",
        "domains.txt",
        "--rate-limit-trusted",
        "7",
    ])
    .unwrap();
    let (config, _) = cli.into_config();
    assert_eq!(config.trusted_rate_limit(3), 7);
}

#[test]
fn test_missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["domain_sift"]).is_err());
}

#[test]
fn test_bruteforce_requires_domain() {
    assert!(Cli::try_parse_from(["domain_sift", "bruteforce", "words.txt"]).is_err());
}

#[test]
fn test_invalid_engine_is_rejected() {
    assert!(Cli::try_parse_from([
        "domain_sift",
        "resolve",
        "domains.txt",
        "--engine",
        "dig"
    ])
    .is_err());
}
