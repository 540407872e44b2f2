use std::io::Cursor;

use super::*;

#[test]
fn explicit_session_file_wins() {
    let path = session_path(Some(PathBuf::from("/tmp/bg-session"))).unwrap();
    assert_eq!(path, PathBuf::from("/tmp/bg-session"));
}

#[test]
fn default_session_file_lives_under_home() {
    if let Some(home) = dirs::home_dir() {
        let path = session_path(None).unwrap();
        assert_eq!(path, home.join(".boardgate").join("session"));
    }
}

#[test]
fn prompt_reads_one_line_without_newline() {
    let mut input = Cursor::new(b"hunter2hunter2\r\nignored\n".to_vec());
    let mut prompt = Vec::new();
    let password = prompt_password(&mut input, &mut prompt).unwrap();
    assert_eq!(password, "hunter2hunter2");
    assert_eq!(prompt, b"password: ");
}

#[test]
fn short_password_is_rejected_before_network() {
    let args = CredentialArgs { email: "a@b.com".into(), password: Some("short".into()) };
    let err = read_credentials(args).unwrap_err();
    assert!(matches!(err, CliError::Auth(AuthError::Validation(_))));
}

#[test]
fn login_subcommand_parses() {
    let cli = Cli::try_parse_from([
        "boardgate",
        "--api-url",
        "http://id.local",
        "login",
        "--email",
        "a@b.com",
        "--password",
        "longenough",
    ])
    .unwrap();
    assert_eq!(cli.api_url, "http://id.local");
    match cli.command {
        Command::Login(args) => {
            assert_eq!(args.email, "a@b.com");
            assert_eq!(args.password.as_deref(), Some("longenough"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn registration_sign_in_failure_mentions_created_account() {
    let err = CliError::from(RegistrationError::SignIn {
        identity: boardgate::transport::IdentityRecord {
            id: 1,
            username: "a@b.com".into(),
            email: "a@b.com".into(),
        },
        source: AuthError::Rejected { status: 401, message: "Incorrect credentials".into() },
    });
    assert_eq!(err.to_string(), "account created, but signing in failed: Incorrect credentials");
}
