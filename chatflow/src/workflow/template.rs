//! `{{variable}}` substitution in action parameters

use crate::workflow::VariableBag;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("placeholder pattern must compile")
    })
}

/// Replace every `{{name}}` with the variable of that name.
///
/// Lookup ignores case. Placeholders with no matching variable are left
/// verbatim, including their original spacing.
pub fn substitute_variables(input: &str, variables: &VariableBag) -> String {
    if !input.contains("{{") {
        return input.to_string();
    }

    placeholder_regex()
        .replace_all(input, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Apply [`substitute_variables`] to every parameter value
pub fn substitute_params(
    params: &HashMap<String, String>,
    variables: &VariableBag,
) -> HashMap<String, String> {
    params
        .iter()
        .map(|(key, value)| (key.clone(), substitute_variables(value, variables)))
        .collect()
}
