//! Parsing of handler expressions: `<moduleRef>$<name>(<arg>, <arg>, ...)`.

use crate::error::DispatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerExpression {
    pub module: String,
    pub function: String,
    /// Argument tokens, kept as opaque text until evaluation time.
    pub arguments: Vec<String>,
}

/// Split a raw attribute value into a module reference and call description.
///
/// The value splits on the first `$`. The call part is matched as
/// `name(arguments)`; when it does not match, the whole part is taken as a
/// bare zero-argument function name.
pub fn parse_expression(value: &str) -> Result<HandlerExpression, DispatchError> {
    let (module, call) = value.split_once('$').ok_or_else(|| DispatchError::Expression {
        expression: value.to_string(),
    })?;

    let (function, arguments) = match call_parts(call) {
        Some((name, raw_arguments)) => (name.to_string(), tokenize_arguments(raw_arguments)),
        None => (call.to_string(), Vec::new()),
    };

    Ok(HandlerExpression {
        module: module.to_string(),
        function,
        arguments,
    })
}

/// Match `name(arguments)`: a word-character run, an opening parenthesis,
/// and everything up to the last closing parenthesis.
fn call_parts(call: &str) -> Option<(&str, &str)> {
    let open = call.find('(')?;
    let close = call.rfind(')')?;
    if close < open {
        return None;
    }

    let name_start = call[..open]
        .rfind(|c: char| !is_word(c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &call[name_start..open];
    if name.is_empty() {
        return None;
    }

    Some((name, &call[open + 1..close]))
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split an argument list on commas, honoring quoted runs and backslash
/// escapes.
///
/// A quote run opens on an unescaped `'` or `"` and closes only on the same
/// character; commas inside it are literal. An escaped character is taken
/// literally and the backslash dropped. Tokens are trimmed; a trailing
/// token that trims to nothing is dropped, interior empty tokens are kept.
pub fn tokenize_arguments(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in raw.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' => escaped = true,
            '"' | '\'' => {
                match quote {
                    None => quote = Some(ch),
                    Some(open) if open == ch => quote = None,
                    Some(_) => {}
                }
                current.push(ch);
            }
            ',' if quote.is_none() => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }

    tokens
}
