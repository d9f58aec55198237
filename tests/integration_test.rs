use openapi_from_annotations::{
    error::Error,
    generator::{generate, load_definition, GeneratorOptions},
    openapi_builder::{BaseDefinition, OpenApiBuilder, OpenApiDocument},
    serializer::{serialize_json, serialize_yaml},
    tokenizer::{AnnotationTokenizer, JsDocTokenizer},
    validator::{Passthrough, ReferenceCheck},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Generates the document for the bundled fixtures
fn generate_fixtures() -> Value {
    let definition = load_definition(&fixtures_dir().join("base.yaml")).expect("Failed to load base definition");
    let options = GeneratorOptions::new(fixtures_dir())
        .with_files(["routes.js", "models/*.js"])
        .with_definition(definition);

    let (document, report) =
        generate(&options, &JsDocTokenizer, &ReferenceCheck).expect("Generation failed");

    assert_eq!(report.files_read, 2);
    assert_eq!(report.blocks_merged, 9);
    assert_eq!(report.blocks_skipped, 1);

    serde_json::to_value(&document).unwrap()
}

/// Document for blocks of a single in-memory source
fn document_for(source: &str) -> Value {
    let mut builder = OpenApiBuilder::new();
    builder.add_file(Path::new("inline.js"), &JsDocTokenizer.tokenize(source));
    serde_json::to_value(builder.build()).unwrap()
}

#[test]
fn test_body_parameter_with_model_reference() {
    let doc = generate_fixtures();
    let hello = &doc["paths"]["/hello/"]["post"];

    assert_eq!(hello["tags"], json!(["hello"]));
    assert_eq!(hello["summary"], "greetings to name");
    assert_eq!(
        hello["description"],
        "This route will respond greetings to name in json request body."
    );
    assert_eq!(
        hello["requestBody"],
        json!({
            "description": "username or email",
            "required": true,
            "content": {
                "application/json": {
                    "schema": {"$ref": "#/components/schemas/ReqNameJSON"}
                }
            }
        })
    );
    assert_eq!(hello["responses"]["200"]["description"], "An object with the key 'msg'");
    assert_eq!(
        hello["responses"]["200"]["content"]["application/json"]["schema"],
        json!({"type": "object"})
    );
    assert_eq!(hello["responses"]["default"]["description"], "Unexpected error");
    assert_eq!(hello["produces"], json!(["application/json"]));
    assert_eq!(hello["consumes"], json!(["application/json"]));
}

#[test]
fn test_response_headers() {
    let doc = generate_fixtures();
    let headers = &doc["paths"]["/hello/"]["post"]["responses"]["200"]["headers"];

    assert_eq!(
        headers["X-Rate-Limit"],
        json!({"type": "integer", "description": "calls per hour"})
    );
    assert_eq!(
        headers["X-Expires-After"],
        json!({"type": "string", "description": "date in UTC when token expires"})
    );
    assert!(doc["paths"]["/hello/"]["post"]["responses"]["default"]
        .get("headers")
        .is_none());
}

#[test]
fn test_typedef_inheritance() {
    let doc = generate_fixtures();

    assert_eq!(
        doc["components"]["schemas"]["Dog"],
        json!({
            "allOf": [{"$ref": "#/components/schemas/Pet"}],
            "required": [],
            "properties": {
                "woof": {"type": "string", "description": "M", "example": "woof"}
            }
        })
    );
    assert_eq!(
        doc["components"]["schemas"]["Cat"]["properties"]["scores"],
        json!({
            "type": "array",
            "items": {"type": "number"},
            "description": "A lot of numbers",
            "example": [1, 2, 3]
        })
    );
    assert_eq!(
        doc["components"]["schemas"]["ReqNameJSON"]["required"],
        json!(["name"])
    );
}

#[test]
fn test_union_body_and_bound_examples() {
    let doc = generate_fixtures();
    let union = &doc["paths"]["/pets/union"]["post"];
    let body = &union["requestBody"]["content"]["application/json"];

    assert_eq!(
        body["schema"],
        json!({
            "oneOf": [
                {"$ref": "#/components/schemas/Cat"},
                {"$ref": "#/components/schemas/Dog"}
            ],
            "discriminator": {"propertyName": "objectType"}
        })
    );
    assert_eq!(
        body["examples"],
        json!({
            "Dog": {"value": {"name": "Rex", "woof": "1"}},
            "Cat": {"value": {"name": "Tom", "meow": "2"}}
        })
    );
    assert_eq!(union["requestBody"]["required"], true);
    assert_eq!(union["responses"]["201"]["description"], "Cat or dog");
}

#[test]
fn test_query_and_path_parameters() {
    let doc = generate_fixtures();
    let get_pet = &doc["paths"]["/pets/{id}"]["get"];

    assert_eq!(
        get_pet["parameters"],
        json!([
            {
                "name": "id",
                "in": "path",
                "description": "pet id",
                "required": true,
                "schema": {"type": "integer"}
            },
            {
                "name": "status",
                "in": "query",
                "description": "filter - eg: string:available,sold",
                "required": false,
                "schema": {"type": "string", "enum": ["available", "sold"]}
            }
        ])
    );
    assert_eq!(get_pet["operationId"], "getPet");
    assert_eq!(get_pet["security"], json!([{"JWT": []}]));
    assert_eq!(
        get_pet["responses"]["200"]["content"]["application/json"],
        json!({
            "schema": {"$ref": "#/components/schemas/Dog"},
            "examples": {"Rex": {"value": {"name": "Rex", "woof": "loud"}}}
        })
    );
    assert!(get_pet.get("requestBody").is_none());
}

#[test]
fn test_param_without_route_is_inert() {
    let doc = document_for(
        r#"
/**
 * @param {string} orphan.query
 */
"#,
    );

    assert_eq!(doc["paths"], json!({}));
    assert_eq!(doc["tags"], json!([]));
}

#[test]
fn test_malformed_block_is_skipped() {
    let doc = generate_fixtures();

    // The DELETE block carries an invalid example and contributes nothing
    assert!(doc["paths"]["/pets/{id}"].get("delete").is_none());
    assert!(doc["paths"]["/pets/{id}"].get("get").is_some());
}

#[test]
fn test_later_file_redefines_type() {
    let doc = generate_fixtures();
    let pet = &doc["components"]["schemas"]["Pet"];

    assert_eq!(pet["required"], json!(["nickname"]));
    assert!(pet["properties"].get("name").is_none());
    assert_eq!(
        pet["properties"]["vaccinated"],
        json!({"type": "boolean", "description": "Vaccinated", "example": true})
    );
    assert_eq!(pet["discriminator"], json!({"propertyName": "objectType"}));
    assert_eq!(pet["properties"]["friend"]["description"], "Best friend");
}

#[test]
fn test_base_definition_is_kept() {
    let doc = generate_fixtures();

    assert_eq!(doc["openapi"], "3.0.0");
    assert_eq!(doc["info"]["title"], "Pet Store");
    assert_eq!(doc["servers"], json!([{"url": "http://localhost:3000"}]));
    assert_eq!(doc["security"], json!([{"JWT": []}]));
    assert_eq!(
        doc["components"]["securitySchemes"]["JWT"],
        json!({"type": "http", "scheme": "bearer"})
    );
    assert_eq!(
        doc["tags"],
        json!([
            {"name": "pets", "description": "Declared in the base definition"},
            {"name": "hello", "description": "Test Demo"}
        ])
    );
}

#[test]
fn test_post_without_body_param_advertises_empty_body() {
    let doc = document_for(
        r#"
/**
 * @route POST /ping
 * @returns 204 - done
 */
"#,
    );

    assert_eq!(
        doc["paths"]["/ping"]["post"]["requestBody"],
        json!({"required": false, "content": {"application/json": {}}})
    );
    assert_eq!(
        doc["paths"]["/ping"]["post"]["responses"]["204"],
        json!({"description": "done"})
    );
}

#[test]
fn test_multiple_http_methods_same_path() {
    let temp_dir = create_test_project(vec![
        (
            "routes/read.js",
            "/**\n * @route GET /items\n * @returns {Array.<Item>} 200 - items\n */\n",
        ),
        (
            "routes/write.js",
            "/**\n * @route PUT /items\n * @param {Item.model} item.body.required\n */\n",
        ),
    ]);

    let options = GeneratorOptions::new(temp_dir.path())
        .with_files(["routes"])
        .with_definition(BaseDefinition::new("Items", "1.0.0"));
    let (document, _) = generate(&options, &JsDocTokenizer, &Passthrough).unwrap();

    let item = &document.paths["/items"];
    assert_eq!(item.keys().collect::<Vec<_>>(), vec!["get", "put"]);

    let doc = serde_json::to_value(&document).unwrap();
    assert_eq!(
        doc["paths"]["/items"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/Item"}})
    );
}

#[test]
fn test_missing_configuration_aborts() {
    let options = GeneratorOptions::new(fixtures_dir()).with_files(["routes.js"]);

    let err = generate(&options, &JsDocTokenizer, &Passthrough).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MissingConfiguration(_))
    ));
}

#[test]
fn test_yaml_and_json_output() {
    let temp_dir = create_test_project(vec![(
        "app.js",
        "/**\n * @route GET /health\n * @group ops - Operations\n * @returns {string} 200 - ok\n */\n",
    )]);

    let options = GeneratorOptions::new(temp_dir.path())
        .with_files(["app.js"])
        .with_definition(BaseDefinition::new("Ops", "1.0.0"));
    let (document, _): (OpenApiDocument, _) =
        generate(&options, &JsDocTokenizer, &ReferenceCheck).unwrap();

    let yaml = serialize_yaml(&document).unwrap();
    assert!(yaml.contains("/health:"));
    assert!(yaml.contains("title: Ops"));

    let from_yaml: Value = serde_yaml::from_str(&yaml).unwrap();
    let from_json: Value = serde_json::from_str(&serialize_json(&document).unwrap()).unwrap();
    assert_eq!(from_yaml, from_json);
    assert_eq!(from_json["paths"]["/health"]["get"]["tags"], json!(["ops"]));
}
