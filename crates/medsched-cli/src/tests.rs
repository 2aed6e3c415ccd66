use super::*;

#[test]
fn parses_sources_command() {
    let cli = Cli::try_parse_from(["medsched-cli", "sources"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Sources));
}

#[test]
fn missing_command_is_rejected() {
    assert!(Cli::try_parse_from(["medsched-cli"]).is_err());
}

#[test]
fn collect_defaults_to_all_sources_as_json() {
    let cli = Cli::try_parse_from(["medsched-cli", "collect"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Collect {
            source: None,
            format: OutputFormat::Json,
            output: None,
            dry_run: false,
        }
    ));
}

#[test]
fn collect_with_source_filter() {
    let cli =
        Cli::try_parse_from(["medsched-cli", "collect", "--source", "san-pablo-surco"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Collect {
            source: Some(ref s),
            ..
        } if s == "san-pablo-surco"
    ));
}

#[test]
fn collect_ndjson_to_custom_dir() {
    let cli = Cli::try_parse_from([
        "medsched-cli",
        "collect",
        "--format",
        "ndjson",
        "--output",
        "/tmp/medsched",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Collect {
            format: OutputFormat::Ndjson,
            output: Some(ref dir),
            ..
        } if dir == &PathBuf::from("/tmp/medsched")
    ));
}

#[test]
fn collect_dry_run() {
    let cli = Cli::try_parse_from(["medsched-cli", "collect", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Collect { dry_run: true, .. }
    ));
}

#[test]
fn collect_rejects_unknown_format() {
    let result = Cli::try_parse_from(["medsched-cli", "collect", "--format", "csv"]);
    assert!(result.is_err());
}
