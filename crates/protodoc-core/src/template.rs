//! URI template tokenizer.
//!
//! Grammar:
//!
//! ```text
//! template := (literal | variable)*
//! variable := '{' name modifier* '}'
//! modifier := '*'   (matches several path segments)
//!           | '?'   (may be absent)
//! ```
//!
//! Each modifier may appear at most once per variable, in either order.

use serde::Serialize;

use crate::error::{ProtoDocError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathParam {
    pub name: String,
    pub multi_segment: bool,
    pub optional: bool,
    /// The variable exactly as written, braces included.
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(PathParam),
}

enum State {
    Literal,
    Name,
    Modifiers,
}

pub fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let invalid = |reason: String| ProtoDocError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    let mut segments = Vec::new();
    let mut state = State::Literal;
    let mut literal = String::new();
    let mut var = PathParam {
        name: String::new(),
        multi_segment: false,
        optional: false,
        placeholder: String::new(),
    };

    for (pos, c) in template.char_indices() {
        match state {
            State::Literal => match c {
                '{' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    var.placeholder.push(c);
                    state = State::Name;
                }
                '}' => return Err(invalid(format!("unmatched '}}' at offset {pos}"))),
                _ => literal.push(c),
            },
            State::Name | State::Modifiers => {
                var.placeholder.push(c);
                match c {
                    '{' => return Err(invalid(format!("nested '{{' at offset {pos}"))),
                    '}' => {
                        if var.name.is_empty() {
                            return Err(invalid(format!("empty variable name at offset {pos}")));
                        }
                        let done = std::mem::replace(
                            &mut var,
                            PathParam {
                                name: String::new(),
                                multi_segment: false,
                                optional: false,
                                placeholder: String::new(),
                            },
                        );
                        segments.push(Segment::Variable(done));
                        state = State::Literal;
                    }
                    '*' | '?' => {
                        if var.name.is_empty() {
                            return Err(invalid(format!(
                                "modifier '{c}' before variable name at offset {pos}"
                            )));
                        }
                        let flag = if c == '*' {
                            &mut var.multi_segment
                        } else {
                            &mut var.optional
                        };
                        if *flag {
                            return Err(invalid(format!(
                                "repeated modifier '{c}' on variable {}",
                                var.name
                            )));
                        }
                        *flag = true;
                        state = State::Modifiers;
                    }
                    _ => {
                        if matches!(state, State::Modifiers) {
                            return Err(invalid(format!(
                                "unexpected {c:?} after modifier at offset {pos}"
                            )));
                        }
                        var.name.push(c);
                    }
                }
            }
        }
    }

    if !matches!(state, State::Literal) {
        return Err(invalid("unclosed '{'".to_string()));
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Variables of `template`, left to right.
pub fn parse_path_params(template: &str) -> Result<Vec<PathParam>> {
    Ok(parse_template(template)?
        .into_iter()
        .filter_map(|s| match s {
            Segment::Variable(p) => Some(p),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Bare variable names of `template`, left to right, modifiers stripped.
pub fn path_param_names(template: &str) -> Result<Vec<String>> {
    Ok(parse_path_params(template)?
        .into_iter()
        .map(|p| p.name)
        .collect())
}
