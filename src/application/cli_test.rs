use anyhow::Result;
use serde_json::json;

use super::build;
use super::parse_args;
use super::parse_kwargs;

#[test]
fn it_parses_call_args() -> Result<()> {
    let args = parse_args(r#"[[1, 2], {"lang": "en"}]"#)?;
    assert_eq!(args, vec![json!([1, 2]), json!({"lang": "en"})]);

    let err = parse_args(r#"{"ids": [1]}"#).unwrap_err();
    assert_eq!(err.to_string(), "--args must be a JSON array");

    return Ok(());
}

#[test]
fn it_parses_call_kwargs() -> Result<()> {
    let kwargs = parse_kwargs(r#"{"limit": 5}"#)?;
    assert_eq!(kwargs.get("limit"), Some(&json!(5)));

    let err = parse_kwargs("[]").unwrap_err();
    assert_eq!(err.to_string(), "--kwargs must be a JSON object");

    assert!(parse_kwargs("{oops").is_err());

    return Ok(());
}

#[test]
fn it_accepts_global_flags_after_subcommands() -> Result<()> {
    let matches = build().try_get_matches_from(vec![
        "erpdesk",
        "call",
        "res.partner",
        "search_read",
        "--kwargs",
        r#"{"limit": 1}"#,
        "-v",
        "--storage",
        "memory",
    ])?;

    let (name, subcmd_matches) = matches.subcommand().unwrap();
    assert_eq!(name, "call");
    assert!(subcmd_matches.get_flag("verbose"));
    assert_eq!(
        subcmd_matches.get_one::<String>("storage").map(|e| return e.as_str()),
        Some("memory")
    );
    assert_eq!(
        subcmd_matches.get_one::<String>("args").map(|e| return e.as_str()),
        Some("[]")
    );

    return Ok(());
}

#[test]
fn it_rejects_unknown_storage() {
    let res = build().try_get_matches_from(vec!["erpdesk", "--storage", "cloud", "menus"]);
    assert!(res.is_err());
}
