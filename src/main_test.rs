use super::*;

#[test]
fn parses_topic_ensure() {
    let cli = Cli::try_parse_from([
        "specto-forum",
        "--token",
        "t",
        "topics",
        "ensure",
        "--tmdb-id",
        "438631",
        "--media-type",
        "movie",
        "--title",
        "Dune",
    ])
    .expect("parse");
    let Command::Topics(TopicsCommand {
        command: TopicsSubcommand::Ensure {
            tmdb_id, media_type, ..
        },
    }) = cli.command
    else {
        panic!("expected topics ensure");
    };
    assert_eq!(tmdb_id, 438_631);
    assert_eq!(MediaType::from(media_type), MediaType::Movie);
}

#[test]
fn parses_chat_with_quiet() {
    let cli = Cli::try_parse_from(["specto-forum", "chat", "7", "--quiet"]).expect("parse");
    assert!(matches!(cli.command, Command::Chat { topic_id: 7, quiet: true }));
}

#[test]
fn explicit_ws_base_overrides_derived_one() {
    let cli = Cli::try_parse_from([
        "specto-forum",
        "--base-url",
        "https://api.specto.test/",
        "--ws-base-url",
        "wss://rt.specto.test",
        "me",
    ])
    .expect("parse");
    let config = build_config(&cli).expect("config");
    assert_eq!(config.api_base_url, "https://api.specto.test");
    assert_eq!(config.ws_base_url, "wss://rt.specto.test");
}

#[test]
fn derives_ws_base_from_api_base() {
    let cli = Cli::try_parse_from(["specto-forum", "--base-url", "http://localhost:8000", "me"]).expect("parse");
    assert_eq!(build_config(&cli).expect("config").ws_base_url, "ws://localhost:8000");
}

#[test]
fn rejects_unsupported_scheme() {
    let cli = Cli::try_parse_from(["specto-forum", "--base-url", "ftp://x", "me"]).expect("parse");
    assert!(matches!(build_config(&cli), Err(CliError::Config(_))));
}
