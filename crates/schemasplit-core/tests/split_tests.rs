use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use schemasplit_core::config::SplitConfig;
use schemasplit_core::document;
use schemasplit_core::emit::MemorySink;
use schemasplit_core::error::{ExtractError, LoadError, RunError, SplitError};
use schemasplit_core::extract::SkipReason;
use schemasplit_core::pipeline::parse_keyword_list;
use schemasplit_core::Pipeline;

const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn pipeline_with(extra: &str) -> Pipeline {
    Pipeline::new(SplitConfig {
        definition_keywords: parse_keyword_list(extra),
        ..SplitConfig::default()
    })
}

fn read_json(root: &Path, relative: &str) -> Value {
    let content = fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"));
    serde_json::from_str(&content).unwrap()
}

/// Every file under `root`, keyed by relative path.
fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn visit(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                visit(root, &path, files);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, fs::read(&path).unwrap());
            }
        }
    }
    let mut files = BTreeMap::new();
    visit(root, root, &mut files);
    files
}

#[test]
fn split_widgets_writes_component_files() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    let report = pipeline_with("")
        .run(&fixture("widgets.yaml"), &out)
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.keywords, vec!["components.schemas"]);

    for name in ["Widget", "Owner", "Part", "Timestamp"] {
        let schema = read_json(&out, &format!("components.schemas/{name}.json"));
        assert_eq!(schema["$id"], format!("{name}.json"));
        assert_eq!(schema["title"], name);
        assert!(schema.get("$schema").is_none());
    }

    let owner = read_json(&out, "components.schemas/Owner.json");
    assert_eq!(owner["type"], serde_json::json!(["object", "null"]));

    let widget = read_json(&out, "components.schemas/Widget.json");
    assert!(widget.get("discriminator").is_none());
}

#[test]
fn split_widgets_adds_ts_type_only_for_dates() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    pipeline_with("").run(&fixture("widgets.yaml"), &out).unwrap();

    let timestamp = read_json(&out, "components.schemas/Timestamp.json");
    assert_eq!(timestamp["tsType"], "Date");
    for name in ["Widget", "Owner", "Part"] {
        let schema = read_json(&out, &format!("components.schemas/{name}.json"));
        assert!(schema.get("tsType").is_none(), "{name} should have no tsType");
    }
}

#[test]
fn split_widgets_rewrites_references() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    pipeline_with("").run(&fixture("widgets.yaml"), &out).unwrap();

    let widget = fs::read_to_string(out.join("components.schemas/Widget.json")).unwrap();
    assert!(!widget.contains("#/components/"));
    assert_eq!(widget.matches(r#""$ref": "Part.json""#).count(), 2);
    assert!(widget.contains(r#""$ref": "Owner.json""#));
    assert!(widget.contains(r#""$ref": "Timestamp.json""#));

    let part = read_json(&out, "components.schemas/Part.json");
    assert_eq!(part["properties"]["links"]["$ref"], "PartLink.json");
    assert_eq!(part["properties"]["legacy"]["$ref"], "#/definitions/Legacy");
}

#[test]
fn split_widgets_parameter_schemas() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    let report = pipeline_with("").run(&fixture("widgets.yaml"), &out).unwrap();

    let query = read_json(&out, "widgets_{id}/get/widgets_{id}_query_parameters.json");
    let query_props = query["properties"].as_object().unwrap();
    assert_eq!(query_props.keys().collect::<Vec<_>>(), vec!["id"]);
    assert_eq!(query["required"], serde_json::json!(["id"]));

    let path = fs::read_to_string(out.join("widgets_{id}/get/widgets_{id}_path_parameters.json"))
        .unwrap();
    insta::assert_snapshot!(path, @r#"
    {
      "$id": "widgets_{id}_path_parameters.json",
      "title": "widgets_{id}_path_parameters",
      "type": "object",
      "properties": {
        "verbose": {
          "type": "boolean"
        }
      },
      "additionalProperties": false
    }
    "#);

    assert!(!out.join("widgets").exists());
    assert!(report.extract.skipped.iter().any(|s| {
        s.location == "paths./widgets.parameters[0]"
            && s.reason
                == SkipReason::UnresolvedParameterRef(
                    "#/components/parameters/PageSize".to_string(),
                )
    }));
    assert!(report.extract.skipped.iter().any(|s| {
        s.reason == SkipReason::UnsupportedLocation("header".to_string())
    }));
}

#[test]
fn split_widgets_resolves_shared_parameters_when_enabled() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    let mut config = SplitConfig::default();
    config.parameters.resolve_refs = true;
    Pipeline::new(config)
        .run(&fixture("widgets.yaml"), &out)
        .unwrap();

    let page = read_json(&out, "widgets/widgets_path_parameters.json");
    assert_eq!(page["properties"]["pageSize"]["type"], "integer");
    assert_eq!(page["required"], serde_json::json!(["pageSize"]));
}

#[test]
fn split_extra_keywords() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    let report = pipeline_with("components.responses, components.examples")
        .run(&fixture("widgets.yaml"), &out)
        .unwrap();
    assert_eq!(
        report.keywords,
        vec![
            "components.responses",
            "components.examples",
            "components.schemas"
        ]
    );

    let created = read_json(&out, "components.responses/Created.json");
    assert_eq!(created["title"], "Created");
    assert_eq!(
        created["content"]["application/json"]["schema"]["$ref"],
        "Widget.json"
    );

    let basic = read_json(&out, "components.examples/basic.json");
    assert_eq!(basic["$id"], "basic.json");
    assert_eq!(basic["value"]["name"], "Sprocket");
    assert!(!out.join("components.examples/0.json").exists());
    assert!(!out.join("components.examples/1.json").exists());
    assert!(report.extract.skipped.iter().any(|s| {
        s.location == "components.examples[1]" && s.reason == SkipReason::MissingName
    }));
}

#[test]
fn split_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    let pipeline = pipeline_with("components.responses,components.examples");

    pipeline.run(&fixture("widgets.yaml"), &out).unwrap();
    let first = read_tree(&out);
    pipeline.run(&fixture("widgets.yaml"), &out).unwrap();
    let second = read_tree(&out);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn split_clears_stale_output() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    fs::create_dir_all(out.join("components.schemas")).unwrap();
    fs::write(out.join("components.schemas/Stale.json"), "{}").unwrap();

    pipeline_with("").run(&fixture("widgets.yaml"), &out).unwrap();
    assert!(!out.join("components.schemas/Stale.json").exists());
}

#[test]
fn malformed_schema_keeps_earlier_files() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    let report = pipeline_with("")
        .run(&fixture("malformed.yaml"), &out)
        .unwrap();

    match &report.failure {
        Some(SplitError::Extract(ExtractError::NotAnObject { location })) => {
            assert_eq!(location, "components.schemas.Foo");
        }
        other => panic!("expected NotAnObject failure, got {other:?}"),
    }
    assert!(out.join("components.schemas/Alpha.json").exists());
    assert!(!out.join("components.schemas/Foo.json").exists());
    assert!(!out.join("components.schemas/Zeta.json").exists());
    assert!(!out.join("things_{id}").exists());
    assert_eq!(read_tree(&out).len(), 1);
}

#[test]
fn unreadable_input_leaves_empty_output() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("schemas");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("leftover.json"), "{}").unwrap();

    let err = pipeline_with("")
        .run(&tmp.path().join("missing.yaml"), &out)
        .unwrap_err();
    assert!(matches!(err, RunError::Load(LoadError::Io { .. })));
    assert!(out.is_dir());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn json_input_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("openapi.json");
    fs::write(
        &input,
        r##"{"components": {"schemas": {"Pet": {"type": "object", "properties": {"tag": {"$ref": "#/components/schemas/Tag"}}}, "Tag": {"type": "string"}}}}"##,
    )
    .unwrap();
    let out = tmp.path().join("schemas");
    let report = pipeline_with("").run(&input, &out).unwrap();
    assert_eq!(report.extract.written.len(), 2);
    let pet = read_json(&out, "components.schemas/Pet.json");
    assert_eq!(pet["properties"]["tag"]["$ref"], "Tag.json");
}

#[test]
fn split_document_in_memory() {
    let document = document::from_str(WIDGETS).unwrap();
    let mut sink = MemorySink::new();
    let report = pipeline_with("").split_document(&document, &mut sink);
    assert!(report.is_complete());
    assert_eq!(sink.len(), report.extract.written.len());
    assert_eq!(
        sink.files().keys().cloned().collect::<Vec<_>>(),
        vec![
            PathBuf::from("components.schemas/Owner.json"),
            PathBuf::from("components.schemas/Part.json"),
            PathBuf::from("components.schemas/Timestamp.json"),
            PathBuf::from("components.schemas/Widget.json"),
            PathBuf::from("widgets_{id}/get/widgets_{id}_path_parameters.json"),
            PathBuf::from("widgets_{id}/get/widgets_{id}_query_parameters.json"),
        ]
    );
}
