use serde_json::json;
use tempfile::TempDir;

use onboard_core::error::OnboardError;
use onboard_core::registry::{ChainTable, ConfigDocument, insert_chain};

fn seeded(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("devnet-foo.json");
    let document = json!({
        "chains": { "foo-1": { "name": "Foo" } },
        "axelar": {
            "contracts": {
                "VotingVerifier": { "foo-1": { "serviceName": "validators" } },
                "MultisigProver": { "foo-1": { "encoder": "abi" } }
            }
        }
    });
    // Not in the writer's format, so any rewrite changes the bytes.
    let text = serde_json::to_string(&document).unwrap().replace(',', ",\n ");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn duplicate_insert_fails_for_every_table_and_preserves_bytes() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);
    let before = std::fs::read(&path).unwrap();

    for table in [
        ChainTable::Chains,
        ChainTable::VotingVerifier,
        ChainTable::MultisigProver,
    ] {
        let err = insert_chain(&path, table, "foo-1", json!({"replacement": true})).unwrap_err();

        assert!(OnboardError::is_duplicate(&err), "{}: {:#}", table, err);
        assert!(err.to_string().contains("foo-1"));
        assert_eq!(std::fs::read(&path).unwrap(), before, "{} rewrote the file", table);
    }
}

#[test]
fn insert_appends_and_keeps_existing_order() {
    let temp = TempDir::new().unwrap();
    let path = seeded(&temp);

    insert_chain(&path, ChainTable::Chains, "bar-2", json!({"name": "Bar"})).unwrap();

    let doc = ConfigDocument::load(&path).unwrap();
    let chains: Vec<&String> = doc.root()["chains"].as_object().unwrap().keys().collect();
    assert_eq!(chains, ["foo-1", "bar-2"]);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("}\n"));
    assert!(text.contains("\n  \"chains\": {"));
}
