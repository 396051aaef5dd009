//! Native matchers of the ground rules.

use contour_core::{Data, Error, MatchOutput, Node, Tag};
use contour_schema::Intrinsic;
use once_cell::sync::Lazy;
use regex::Regex;

const BASE64_PATTERN: &str = r"^[A-Za-z0-9+/_\-\s]*[=\s]*$";

static BASE64: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(BASE64_PATTERN));

/// Typed data of a scalar node; falls back to the raw text when the text
/// does not parse under its tag
#[must_use]
pub fn scalar_data(node: &Node) -> Data {
    let text = node.value();
    match node.tag() {
        Tag::Null => Data::Null,
        Tag::Bool => match text {
            "true" => Data::Bool(true),
            "false" => Data::Bool(false),
            _ => Data::Str(text.to_string()),
        },
        Tag::Int => text
            .parse::<i64>()
            .map_or_else(|_| Data::Str(text.to_string()), Data::Int),
        Tag::Float => parse_float(text).map_or_else(|| Data::Str(text.to_string()), Data::Float),
        _ => Data::Str(text.to_string()),
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | "+.inf" | ".Inf" | ".INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => text.parse().ok(),
    }
}

/// Match a content node against a ground rule
///
/// # Errors
///
/// Returns a content error when the node is not of the expected type
pub fn match_intrinsic(intrinsic: Intrinsic, node: &Node) -> Result<MatchOutput, Vec<Error>> {
    let reject = |expected: String| vec![Error::content(node, expected)];
    let tag = node.tag();

    let data = match intrinsic {
        Intrinsic::String if *tag == Tag::Str => Data::Str(node.value().to_string()),
        Intrinsic::Int if *tag == Tag::Int => match node.value().parse::<i64>() {
            Ok(n) => Data::Int(n),
            Err(_) => return Err(reject("a YAML integer (within the 64-bit signed range)".into())),
        },
        Intrinsic::Float if matches!(tag, Tag::Float | Tag::Int) => match parse_float(node.value()) {
            Some(f) => Data::Float(f),
            None => return Err(reject(intrinsic.expected().to_string())),
        },
        Intrinsic::Boolean if *tag == Tag::Bool => Data::Bool(node.value() == "true"),
        Intrinsic::NullType if *tag == Tag::Null => Data::Null,
        Intrinsic::Binary if matches!(tag, Tag::Str | Tag::Binary) => {
            let base64 = BASE64
                .as_ref()
                .map_err(|e| vec![Error::internal(format!("base64 pattern: {}", e))])?;
            if !base64.is_match(node.value()) {
                return Err(reject(format!("a base64 string matching /{}/", BASE64_PATTERN)));
            }
            Data::Str(node.value().to_string())
        }
        Intrinsic::Timestamp if matches!(tag, Tag::Str | Tag::Timestamp) => {
            if let Err(e) = chrono::DateTime::parse_from_rfc3339(node.value()) {
                return Err(reject(format!("{} (got error [{}])", intrinsic.expected(), e)));
            }
            Data::Str(node.value().to_string())
        }
        _ => return Err(reject(intrinsic.expected().to_string())),
    };

    Ok(MatchOutput::new(node.position().clone(), data))
}
