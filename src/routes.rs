//! # Resource Routes
//!
//! URL templates with `{{ key }}` placeholders, and the pair of templates every model type
//! derives from its `base_url`: the index (collection) URL and the member URL.
//!
//! ```rust
//! use resource_model::routes::UrlTemplate;
//! use serde_json::json;
//!
//! let template = UrlTemplate::parse("/cars/{{ carId }}/parts");
//! let values = json!({"carId": 7}).as_object().cloned().unwrap();
//! assert_eq!(template.render(&values), "/cars/7/parts");
//! ```

use crate::model::{Model, Values};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expr(String),
}

/// A parsed URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UrlTemplate {
    /// Parses `source`. An unterminated `{{` is kept as literal text.
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            if start > 0 {
                parts.push(Part::Literal(rest[..start].to_owned()));
            }
            let key = rest[start + 2..start + 2 + len].trim();
            parts.push(Part::Expr(key.to_owned()));
            rest = &rest[start + 2 + len + 2..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_owned()));
        }

        Self {
            source: source.to_owned(),
            parts,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Keys referenced by the template, in order of appearance.
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Expr(key) => Some(key.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Interpolates `values`. Missing and null values render as the empty string.
    pub fn render(&self, values: &Values) -> String {
        let mut url = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => url.push_str(text),
                Part::Expr(key) => match values.get(key) {
                    None | Some(Value::Null) => {}
                    Some(Value::String(s)) => url.push_str(s),
                    Some(other) => url.push_str(&other.to_string()),
                },
            }
        }
        url
    }
}

/// The index and member URL templates of one model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoutes {
    index: UrlTemplate,
    member: UrlTemplate,
}

impl ResourceRoutes {
    pub fn new(base_url: &str, id_attribute: &str) -> Self {
        Self {
            index: UrlTemplate::parse(base_url),
            member: UrlTemplate::parse(&format!("{base_url}/{{{{{id_attribute}}}}}")),
        }
    }

    pub fn index(&self) -> &UrlTemplate {
        &self.index
    }

    pub fn member(&self) -> &UrlTemplate {
        &self.member
    }

    /// The collection URL when `model` is new, its member URL otherwise.
    pub fn url_for(&self, model: &Model) -> String {
        let values = model.to_transfer_object();
        if model.is_new() {
            self.index.render(&values)
        } else {
            self.member.render(&values)
        }
    }

    /// The collection URL for a query.
    pub fn index_url(&self, criteria: &Values) -> String {
        self.index.render(criteria)
    }

    /// The criteria not consumed by the index template.
    pub fn query_params(&self, criteria: &Values) -> Values {
        let consumed: Vec<&str> = self.index.expressions().collect();
        criteria
            .iter()
            .filter(|(key, _)| !consumed.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(value: Value) -> Values {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_and_render() {
        let template = UrlTemplate::parse("/cars/{{carId}}/parts/{{ id }}");
        assert_eq!(template.expressions().collect::<Vec<_>>(), ["carId", "id"]);
        assert_eq!(
            template.render(&values(json!({"carId": "abc", "id": 3}))),
            "/cars/abc/parts/3"
        );
        assert_eq!(template.render(&values(json!({"id": null}))), "/cars//parts/");
    }

    #[test]
    fn test_unterminated_expression_is_literal() {
        let template = UrlTemplate::parse("/cars/{{id");
        assert_eq!(template.expressions().count(), 0);
        assert_eq!(template.render(&Values::new()), "/cars/{{id");
    }

    #[test]
    fn test_resource_routes() {
        let routes = ResourceRoutes::new("/cars", "id");
        assert_eq!(routes.member().as_str(), "/cars/{{id}}");
        assert_eq!(routes.index_url(&Values::new()), "/cars");

        let nested = ResourceRoutes::new("/cars/{{carId}}/parts", "partNo");
        let criteria = values(json!({"carId": 1, "color": "red"}));
        assert_eq!(nested.index_url(&criteria), "/cars/1/parts");
        assert_eq!(
            Value::Object(nested.query_params(&criteria)),
            json!({"color": "red"})
        );
        assert_eq!(
            nested.member().render(&values(json!({"carId": 1, "partNo": "x9"}))),
            "/cars/1/parts/x9"
        );
    }
}
