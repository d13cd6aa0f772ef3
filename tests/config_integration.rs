use std::path::PathBuf;

use ripple::config::{ConfigFlags, load_config_flags, parse_flag_tokens, save_config_flags};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".ripplerc");
    let content = r#"
# comment
--offline

--author   Jane Smith

--log-file=ripple.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.offline);
    assert_eq!(flags.author.as_deref(), Some("Jane Smith"));
    assert_eq!(flags.log_file, Some(PathBuf::from("ripple.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".ripplerc");
    let content = "--offline\n--api-base http://file.test/api/v1\n--log-file file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "ripple".to_string(),
        "--api-base".to_string(),
        "http://cli.test/api/v1".to_string(),
        "--history-limit".to_string(),
        "20".to_string(),
        "q1".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.offline, "file flags should remain enabled");
    assert_eq!(effective.history_limit, Some(20), "cli flags should be applied");
    assert_eq!(
        effective.api_base.as_deref(),
        Some("http://cli.test/api/v1"),
        "cli should override the API base"
    );
    assert_eq!(
        effective.log_file,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_global_local_cli_layering() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config");
    let local = dir.path().join(".ripplerc");
    save_config_flags(
        &global,
        &ConfigFlags {
            author: Some("global".to_string()),
            token: Some("global-token".to_string()),
            ..ConfigFlags::default()
        },
    )
    .unwrap();
    std::fs::write(&local, "--author local\n").unwrap();

    let files = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    assert_eq!(files.author.as_deref(), Some("local"));
    assert_eq!(files.token.as_deref(), Some("global-token"));

    let cli = parse_flag_tokens(&["--author=cli".to_string()]);
    assert_eq!(files.union(&cli).author.as_deref(), Some("cli"));
}

#[test]
fn test_missing_file_is_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("nope")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_zero_history_limit_in_config_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".ripplerc");
    std::fs::write(&path, "--history-limit 0\n--author Sam\n").unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags.history_limit, None);
    assert_eq!(flags.author.as_deref(), Some("Sam"));
}
