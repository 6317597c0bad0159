use tagddl_core::{ModelDocument, Project, TagKind};

#[test]
fn serializes_document_deterministically() {
    let document = ModelDocument {
        project: Some(Project::new("Shop")),
    };

    let json = document.to_json_pretty().expect("serialize document");
    let expected = r#"{
  "project": {
    "name": "Shop",
    "tags": [],
    "data_models": []
  }
}"#;
    assert_eq!(json, expected);
}

#[test]
fn parses_tags_and_column_defaults() {
    let json = r#"{
      "project": {
        "name": "Shop",
        "tags": [{ "kind": "database", "value": "shop_db" }],
        "data_models": [{
          "name": "Sales",
          "tags": [{ "kind": "schema", "value": "sales" }],
          "entities": [{
            "name": "Orders",
            "tags": [
              { "kind": "reference", "value": "FOR EACH ROW EXECUTE FUNCTION touch();",
                "reference": { "target": "trigger", "name": "touch", "event": "BEFORE UPDATE" } },
              { "kind": "colour", "value": "blue" }
            ],
            "columns": [
              { "id": "o.id", "name": "id", "data_type": "INTEGER", "length": -1, "primary_key": true },
              { "name": "code", "data_type": "VARCHAR", "length": 12,
                "tags": [{ "kind": "index", "value": "idx_code", "sequence": 2, "descending": true }] }
            ]
          }]
        }]
      }
    }"#;

    let document = ModelDocument::from_json(json).expect("parse document");
    let project = document.project.expect("project present");
    assert_eq!(project.tags[0].kind, TagKind::Database);

    let entity = &project.data_models[0].entities[0];
    assert_eq!(entity.tags[1].kind, TagKind::Other);
    let reference = entity.tags[0].reference.as_ref().expect("reference target");
    assert_eq!(reference.event.as_deref(), Some("BEFORE UPDATE"));

    let id = &entity.columns[0];
    assert_eq!(id.length, Some(-1));
    assert!(id.nullable);
    let code = &entity.columns[1];
    assert_eq!(code.tags[0].sequence, Some(2));
    assert!(code.tags[0].descending);
}

#[test]
fn document_without_project_parses() {
    let document = ModelDocument::from_json("{}").expect("parse empty document");
    assert!(document.project.is_none());
}

#[test]
fn malformed_document_is_invalid_model() {
    let err = ModelDocument::from_json("{ not json").expect_err("malformed json");
    assert!(err.to_string().starts_with("invalid model:"));
}
