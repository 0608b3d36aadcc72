use super::*;
use chrono::TimeZone;
use serde_json::{from_str, to_string};

#[test]
fn test_commit_serialization() {
    let commit = Commit {
        sha: "6dcb09b5b57875f334f61aebed695e2e4193db5e".to_string(),
        author_login: Some("octocat".to_string()),
        authored_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
    };

    let json_str = to_string(&commit).expect("Failed to serialize Commit");

    let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("Failed to parse JSON");
    assert_eq!(parsed["sha"], "6dcb09b5b57875f334f61aebed695e2e4193db5e");
    assert_eq!(parsed["author_login"], "octocat");
    assert_eq!(parsed["authored_at"], "2024-03-01T10:00:00Z");
}

#[test]
fn test_commit_detail_default_is_empty() {
    let detail = CommitDetail::default();

    assert!(detail.sha.is_empty());
    assert_eq!(detail.additions, 0);
    assert_eq!(detail.deletions, 0);
    assert_eq!(detail.total, 0);
    assert!(detail.files.is_empty());
}

#[test]
fn test_repository_deserialization() {
    let json_str = r#"{
        "id": 1296269,
        "owner": "octocat",
        "name": "Hello-World",
        "full_name": "octocat/Hello-World",
        "size": 108
    }"#;

    let repo: Repository = from_str(json_str).expect("Failed to deserialize Repository");

    assert_eq!(repo.id, 1296269);
    assert_eq!(repo.owner, "octocat");
    assert_eq!(repo.name, "Hello-World");
    assert_eq!(repo.full_name, "octocat/Hello-World");
    assert_eq!(repo.size, 108);
}
