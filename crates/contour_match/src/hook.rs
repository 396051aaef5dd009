//! Builder invocation at rule boundaries.

use contour_core::{Error, MatchOutput};
use contour_schema::Rule;
use tracing::trace;

/// Run the rule's builder, if any, on a successful match
///
/// # Errors
///
/// Returns the builder's errors; a builder failing without an error is
/// reported as a rejection of the value
pub fn apply_builder(rule: &Rule, output: MatchOutput) -> Result<MatchOutput, Vec<Error>> {
    let Some(builder) = rule.builder() else {
        return Ok(output);
    };

    trace!(rule = rule.name(), "Invoking builder");
    match builder(&output) {
        Ok(data) => Ok(output.into_built(data)),
        Err(errors) if errors.is_empty() => Err(vec![output.reject("the builder rejected the value")]),
        Err(errors) => Err(errors),
    }
}
