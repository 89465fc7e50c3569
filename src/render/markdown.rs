use super::DocRenderer;
use crate::builder::EndpointDescriptor;
use crate::classifier::{Argument, ArgumentKind};
use crate::error::Result;
use log::debug;
use std::fmt::Write;

/// Separates actions within a handler and closes every handler section
pub const DELIMITER: &str = "--------";

/// Writes a Markdown document with one section per handler.
///
/// Sections appear in the order their handler is first seen; all endpoints of a handler are
/// written together. Output depends only on the input, so it is snapshot friendly.
pub struct MarkdownRenderer;

impl DocRenderer for MarkdownRenderer {
    fn content_type(&self) -> &'static str {
        "text/markdown"
    }

    fn render(&self, endpoints: &[EndpointDescriptor], base_url: &str) -> Result<String> {
        let groups = group_by_handler(endpoints);
        debug!(
            "Rendering {} endpoints in {} handler sections",
            endpoints.len(),
            groups.len()
        );

        let mut out = String::new();
        for (handler, actions) in groups {
            write_handler(&mut out, handler, &actions, base_url)?;
        }
        Ok(out)
    }
}

/// Groups endpoints by handler name, keeping first-occurrence order.
pub fn group_by_handler(endpoints: &[EndpointDescriptor]) -> Vec<(&str, Vec<&EndpointDescriptor>)> {
    let mut groups: Vec<(&str, Vec<&EndpointDescriptor>)> = Vec::new();
    for endpoint in endpoints {
        let name = endpoint.controller_name.as_str();
        match groups.iter_mut().find(|(handler, _)| *handler == name) {
            Some((_, actions)) => actions.push(endpoint),
            None => groups.push((name, vec![endpoint])),
        }
    }
    groups
}

fn write_handler(
    out: &mut String,
    handler: &str,
    actions: &[&EndpointDescriptor],
    base_url: &str,
) -> std::fmt::Result {
    writeln!(out, "# {}", handler)?;
    writeln!(out)?;

    for (i, endpoint) in actions.iter().enumerate() {
        if i > 0 {
            writeln!(out, "{}", DELIMITER)?;
            writeln!(out)?;
        }
        write_action(out, endpoint, base_url)?;
    }

    writeln!(out, "{}", DELIMITER)?;
    writeln!(out)
}

fn write_action(out: &mut String, endpoint: &EndpointDescriptor, base_url: &str) -> std::fmt::Result {
    writeln!(out, "## {}", endpoint.action_name)?;
    writeln!(out)?;

    let verb = if endpoint.is_post { "POST" } else { "GET" };
    for route in &endpoint.routes {
        writeln!(out, "* {} {}", verb, code_span(&full_url(base_url, route)))?;
    }
    writeln!(out)?;

    if endpoint.auth_required {
        writeln!(out, "Authorization is required.")?;
    } else {
        writeln!(out, "Authorization is not required.")?;
    }
    writeln!(out)?;

    write_arguments(out, &endpoint.arguments)?;

    if !endpoint.possible_responses.is_empty() {
        writeln!(out, "### Possible responses")?;
        writeln!(out)?;
        for payload in &endpoint.possible_responses {
            let payload = pretty_payload(payload);
            let fence = "`".repeat((longest_backtick_run(&payload) + 1).max(3));
            writeln!(out, "{}json", fence)?;
            writeln!(out, "{}", payload)?;
            writeln!(out, "{}", fence)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_arguments(out: &mut String, arguments: &[Argument]) -> std::fmt::Result {
    if arguments.is_empty() {
        writeln!(out, "This action takes no arguments.")?;
        return writeln!(out);
    }

    writeln!(out, "| Name | Required | Type |")?;
    writeln!(out, "| --- | --- | --- |")?;
    for argument in arguments {
        writeln!(
            out,
            "| {} | {} | {} |",
            table_cell(&argument.name),
            if argument.required { "Yes" } else { "No" },
            kind_label(argument.kind)
        )?;
    }
    writeln!(out)
}

fn kind_label(kind: ArgumentKind) -> &'static str {
    match kind {
        ArgumentKind::Text => "Text",
        ArgumentKind::Number => "Number",
        ArgumentKind::Boolean => "Boolean",
        ArgumentKind::Datetime => "Datetime",
        ArgumentKind::Collection => "Collection",
        ArgumentKind::Unknown => "Unknown",
    }
}

fn full_url(base_url: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

/// Keeps a `|` inside a name from splitting the table row
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Wraps `text` in a code span whose delimiter does not occur inside it
fn code_span(text: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(text) + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Re-indents a compact JSON payload; anything that is not JSON is written as is.
fn pretty_payload(payload: &str) -> String {
    serde_json::from_str::<serde_json::Value>(payload)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn endpoint(handler: &str, action: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            controller_name: handler.to_string(),
            action_name: action.to_string(),
            auth_required: false,
            is_post: false,
            arguments: Vec::new(),
            possible_responses: Vec::new(),
            routes: vec![format!("{}/{}", handler.trim_end_matches("Controller"), action)],
        }
    }

    #[test]
    fn test_pipes_in_names_stay_in_their_cell() {
        let mut endpoint = endpoint("HomeController", "index");
        endpoint.arguments.push(Argument {
            name: "a|b".to_string(),
            required: false,
            kind: ArgumentKind::Text,
        });
        let doc = MarkdownRenderer.render(&[endpoint], "http://localhost").unwrap();
        assert!(doc.contains("| a\\|b | No | Text |"));
    }

    #[test]
    fn test_backticks_widen_the_code_delimiters() {
        let mut endpoint = endpoint("HomeController", "index");
        endpoint.routes = vec!["Home/`raw`".to_string()];
        endpoint.possible_responses = vec!["```not json".to_string()];
        let doc = MarkdownRenderer.render(&[endpoint], "http://localhost").unwrap();

        assert!(doc.contains("* GET `` http://localhost/Home/`raw` ``"));
        assert!(doc.contains("````json\n```not json\n````\n"));
        assert_eq!(code_span("plain"), "`plain`");
    }

    #[test]
    fn test_groups_keep_first_occurrence_order() {
        let endpoints = vec![
            endpoint("HomeController", "index"),
            endpoint("UserController", "list"),
            endpoint("HomeController", "about"),
        ];

        let groups: Vec<_> = group_by_handler(&endpoints)
            .into_iter()
            .map(|(handler, actions)| {
                let names: Vec<_> = actions.iter().map(|a| a.action_name.as_str()).collect();
                (handler, names)
            })
            .collect();
        assert_eq!(
            groups,
            vec![
                ("HomeController", vec!["index", "about"]),
                ("UserController", vec!["list"]),
            ]
        );
    }

    #[test]
    fn test_same_handler_rendered_contiguously() {
        let endpoints = vec![
            endpoint("HomeController", "index"),
            endpoint("UserController", "list"),
            endpoint("HomeController", "about"),
        ];
        let doc = MarkdownRenderer.render(&endpoints, "http://localhost").unwrap();

        let index = doc.find("## index").unwrap();
        let about = doc.find("## about").unwrap();
        let list = doc.find("## list").unwrap();
        assert!(index < about);
        assert!(about < list);
        assert_eq!(doc.matches("# HomeController").count(), 1);
    }

    #[test]
    fn test_full_action_layout() {
        let mut register = endpoint("HomeController", "register");
        register.is_post = true;
        register.auth_required = true;
        register.routes = vec!["api/register".to_string(), "/api/signup".to_string()];
        register.arguments = vec![
            Argument {
                name: "name".to_string(),
                required: true,
                kind: ArgumentKind::Text,
            },
            Argument {
                name: "age".to_string(),
                required: false,
                kind: ArgumentKind::Number,
            },
        ];
        register.possible_responses = vec![r#"{"code":0,"message":"ok"}"#.to_string()];

        let doc = MarkdownRenderer
            .render(&[register, endpoint("HomeController", "index")], "https://example.com/")
            .unwrap();
        let expected = "\
# HomeController

## register

* POST `https://example.com/api/register`
* POST `https://example.com/api/signup`

Authorization is required.

| Name | Required | Type |
| --- | --- | --- |
| name | Yes | Text |
| age | No | Number |

### Possible responses

```json
{
  \"code\": 0,
  \"message\": \"ok\"
}
```

--------

## index

* GET `https://example.com/Home/index`

Authorization is not required.

This action takes no arguments.

--------

";
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_output_is_deterministic() {
        let endpoints = vec![
            endpoint("HomeController", "index"),
            endpoint("UserController", "list"),
        ];
        let first = MarkdownRenderer.render(&endpoints, "http://localhost").unwrap();
        let second = MarkdownRenderer.render(&endpoints, "http://localhost").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_json_payload_is_kept() {
        assert_eq!(pretty_payload("not json"), "not json");
        assert_eq!(pretty_payload("[1]"), "[\n  1\n]");
    }
}
