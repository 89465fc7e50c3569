use apidoc_from_source::{
    builder::{self, EndpointDescriptor},
    classifier::{Argument, ArgumentKind},
    error::Error,
    extractor::{HandlerExtractor, SourceExtractor},
    model::HandlerSet,
    parser::AstParser,
    render,
    scanner::FileScanner,
    service::DocService,
    settings::{DocFormat, DocSettings, DocSettingsBuilder, FailurePolicy},
};
use pretty_assertions::assert_eq;
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

fn demo_project() -> TempDir {
    create_test_project(vec![
        ("src/controllers/home.rs", include_str!("fixtures/home_controller.rs")),
        ("src/controllers/user.rs", include_str!("fixtures/user_controller.rs")),
        ("src/models.rs", include_str!("fixtures/models.rs")),
    ])
}

fn load(project: &TempDir) -> HandlerSet {
    let scan_result = FileScanner::new(project.path())
        .scan()
        .expect("Failed to scan directory");
    let batch = AstParser::parse_files(&scan_result.rust_files);
    assert!(batch.failures.is_empty(), "fixtures should parse: {:?}", batch.failures);
    SourceExtractor.extract_handlers(&batch.files)
}

fn default_settings() -> DocSettings {
    DocSettings::builder().build().unwrap()
}

fn find<'a>(endpoints: &'a [EndpointDescriptor], handler: &str, action: &str) -> &'a EndpointDescriptor {
    endpoints
        .iter()
        .find(|e| e.controller_name == handler && e.action_name == action)
        .unwrap_or_else(|| panic!("missing endpoint {}::{}", handler, action))
}

fn argument(name: &str, required: bool, kind: ArgumentKind) -> Argument {
    Argument {
        name: name.to_string(),
        required,
        kind,
    }
}

#[test]
fn test_discovers_documentable_actions_in_scan_order() {
    let project = demo_project();
    let endpoints = builder::generate(&default_settings(), &load(&project)).unwrap();

    let names: Vec<_> = endpoints
        .iter()
        .map(|e| format!("{}::{}", e.controller_name, e.action_name))
        .collect();
    assert_eq!(
        names,
        vec![
            "HomeController::index",
            "HomeController::no_action",
            "HomeController::authorized_api",
            "HomeController::get_a_number",
            "HomeController::query_something",
            "HomeController::query_something_paged",
            "HomeController::get_fibonacci_first10",
            "HomeController::register_form",
            "HomeController::register_json",
            "HomeController::crash_known",
            "UserController::list",
            "UserController::rename",
        ]
    );
}

#[test]
fn test_routes_verbs_and_authorization() {
    let project = demo_project();
    let endpoints = builder::generate(&default_settings(), &load(&project)).unwrap();

    let index = find(&endpoints, "HomeController", "index");
    assert_eq!(index.routes, vec!["Home/index"]);
    assert!(!index.is_post);
    assert!(!index.auth_required);

    assert_eq!(
        find(&endpoints, "HomeController", "no_action").routes,
        vec!["home/no-action"]
    );
    assert!(find(&endpoints, "HomeController", "authorized_api").auth_required);
    assert!(find(&endpoints, "HomeController", "register_form").is_post);

    let list = find(&endpoints, "UserController", "list");
    assert_eq!(list.routes, vec!["api/users", "api/users/list"]);
    assert!(list.auth_required);

    let rename = find(&endpoints, "UserController", "rename");
    assert_eq!(rename.routes, vec!["api/users/{id}/rename"]);
    assert!(rename.is_post);
}

#[test]
fn test_arguments_are_classified() {
    let project = demo_project();
    let endpoints = builder::generate(&default_settings(), &load(&project)).unwrap();

    assert!(find(&endpoints, "HomeController", "index").arguments.is_empty());
    assert_eq!(
        find(&endpoints, "HomeController", "query_something").arguments,
        vec![argument("question", false, ArgumentKind::Text)]
    );
    assert_eq!(
        find(&endpoints, "HomeController", "query_something_paged").arguments,
        vec![
            argument("question", false, ArgumentKind::Text),
            argument("pageNumber", false, ArgumentKind::Number),
            argument("pageSize", false, ArgumentKind::Number),
        ]
    );
    assert_eq!(
        find(&endpoints, "HomeController", "register_form").arguments,
        vec![
            argument("name", true, ArgumentKind::Text),
            argument("password", false, ArgumentKind::Text),
            argument("age", true, ArgumentKind::Number),
            argument("birthday", false, ArgumentKind::Datetime),
            argument("hobbies", false, ArgumentKind::Collection),
        ]
    );
    assert_eq!(
        find(&endpoints, "UserController", "list").arguments,
        vec![
            argument("q", false, ArgumentKind::Text),
            argument("take", false, ArgumentKind::Number),
        ]
    );
    assert_eq!(
        find(&endpoints, "UserController", "rename").arguments,
        vec![
            argument("id", true, ArgumentKind::Number),
            argument("new_name", true, ArgumentKind::Text),
            argument("effective", false, ArgumentKind::Datetime),
        ]
    );
}

#[test]
fn test_possible_responses_are_synthesized() {
    let project = demo_project();
    let endpoints = builder::generate(&default_settings(), &load(&project)).unwrap();

    assert!(find(&endpoints, "HomeController", "index")
        .possible_responses
        .is_empty());
    assert_eq!(
        find(&endpoints, "HomeController", "get_a_number").possible_responses,
        vec![r#"{"code":"ResultShown","message":"an example string.","value":0}"#]
    );
    assert_eq!(
        find(&endpoints, "HomeController", "query_something_paged").possible_responses,
        vec![
            r#"{"code":"ResultShown","message":"an example string.","items":[0],"currentPage":0,"pageSize":0,"totalCount":0}"#
        ]
    );
    assert_eq!(
        find(&endpoints, "HomeController", "register_json").possible_responses,
        vec![r#"{"code":"ResultShown","message":"an example string.","userId":"an example string."}"#]
    );
    assert_eq!(
        find(&endpoints, "UserController", "list").possible_responses,
        vec![r#"{"code":"ResultShown","message":"an example string.","items":["an example string."]}"#]
    );
}

#[test]
fn test_global_responses_from_settings_file() {
    let project = demo_project();
    let settings = DocSettingsBuilder::from_yaml_str(
        r#"
handler_traits: [ControllerBase]
global_responses:
  - { code: -4, message: "Some error." }
"#,
    )
    .unwrap()
    .build()
    .unwrap();

    let endpoints = builder::generate(&settings, &load(&project)).unwrap();
    assert!(endpoints.iter().all(|e| e.controller_name == "HomeController"));

    let index = find(&endpoints, "HomeController", "index");
    assert_eq!(index.possible_responses, vec![r#"{"code":-4,"message":"Some error."}"#]);

    let number = find(&endpoints, "HomeController", "get_a_number");
    assert_eq!(number.possible_responses.len(), 2);
    assert_eq!(number.possible_responses[1], r#"{"code":-4,"message":"Some error."}"#);
}

#[test]
fn test_successive_passes_are_equal() {
    let project = demo_project();
    let handlers = load(&project);
    let settings = default_settings();

    let first = builder::generate(&settings, &handlers).unwrap();
    let second = builder::generate(&settings, &handlers).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_recursive_response_type_under_failure_policy() {
    let project = create_test_project(vec![(
        "src/lib.rs",
        r#"
        pub struct TreeNode {
            pub label: String,
            pub parent: Box<TreeNode>,
        }

        #[generate_doc]
        pub struct TreeController;
        impl Controller for TreeController {}

        impl TreeController {
            #[produces(TreeNode)]
            pub fn root(&self) {}
            pub fn count(&self) {}
        }
        "#,
    )]);
    let handlers = load(&project);

    let skipping = DocSettings::builder().example_depth_limit(4).build().unwrap();
    let endpoints = builder::generate(&skipping, &handlers).unwrap();
    let names: Vec<_> = endpoints.iter().map(|e| e.action_name.as_str()).collect();
    assert_eq!(names, vec!["count"]);

    let aborting = DocSettings::builder()
        .example_depth_limit(4)
        .on_failure(FailurePolicy::Abort)
        .build()
        .unwrap();
    match builder::generate(&aborting, &handlers) {
        Err(Error::Synthesis { handler, action, .. }) => {
            assert_eq!(handler, "TreeController");
            assert_eq!(action, "root");
        }
        other => panic!("expected a synthesis error, got {:?}", other),
    }
}

#[test]
fn test_json_document() {
    let project = demo_project();
    let endpoints = builder::generate(&default_settings(), &load(&project)).unwrap();
    let json = render::renderer_for(DocFormat::Json, false)
        .render(&endpoints, "http://localhost")
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &value[0];
    let keys: Vec<_> = first.as_object().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "ControllerName",
            "ActionName",
            "AuthRequired",
            "IsPost",
            "Arguments",
            "PossibleResponses",
            "Routes",
        ]
    );
    assert_eq!(value[4]["Arguments"][0]["Type"], "Text");
    assert!(value[3]["PossibleResponses"][0].is_string());
}

#[test]
fn test_markdown_document() {
    let project = demo_project();
    let endpoints = builder::generate(&default_settings(), &load(&project)).unwrap();
    let markdown = render::renderer_for(DocFormat::Markdown, false)
        .render(&endpoints, "https://api.example.com")
        .unwrap();

    let home = markdown.find("# HomeController").unwrap();
    let user = markdown.find("# UserController").unwrap();
    assert!(home < user);
    assert_eq!(markdown.matches("# HomeController\n").count(), 1);
    assert!(markdown.contains("* GET `https://api.example.com/Home/index`"));
    assert!(markdown.contains("* POST `https://api.example.com/api/users/{id}/rename`"));
    assert!(markdown.contains("| pageNumber | No | Number |"));
    assert!(markdown.contains("This action takes no arguments."));
    assert!(markdown.contains("Authorization is required."));
}

#[test]
fn test_html_document() {
    let project = demo_project();
    let endpoints = builder::generate(&default_settings(), &load(&project)).unwrap();
    let html = render::renderer_for(DocFormat::Html, false)
        .render(&endpoints, "http://localhost")
        .unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h1>HomeController</h1>"));
    assert!(html.contains("<h2>register_form</h2>"));
    assert!(html.contains("<table>"));
}

#[test]
fn test_service_over_extracted_handlers() {
    let project = demo_project();
    let settings = DocSettings::builder()
        .mount_path("/my-doc-markdown")
        .format(DocFormat::Markdown)
        .build()
        .unwrap();
    let service = DocService::new(settings, load(&project));

    let request = http::Request::get("/My-Doc-Markdown/")
        .header("Host", "localhost:5000")
        .body(())
        .unwrap();
    let response = service.handle(&request).unwrap().unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    assert!(response
        .body()
        .contains("`http://localhost:5000/home/no-action`"));
}
