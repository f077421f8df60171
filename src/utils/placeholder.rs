use std::collections::HashMap;

/// Expands `${NAME}` tokens against the build context.
///
/// Unknown tokens are left in place so a missing variable shows up verbatim
/// in the upload target instead of silently disappearing.
pub fn resolve(input: &str, context: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(len) => {
                let name = &rest[start + 2..start + 2 + len];
                match context.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + len + 1]),
                }
                rest = &rest[start + 2 + len + 1..];
            }
            // Unterminated token, keep the tail as-is.
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> HashMap<String, String> {
        let mut ctx = HashMap::new();
        ctx.insert("BUILD_NUMBER".to_string(), "42".to_string());
        ctx.insert("JOB_NAME".to_string(), "demo".to_string());
        ctx
    }

    #[test]
    fn resolves_known_tokens() {
        assert_eq!(
            resolve("${JOB_NAME}-${BUILD_NUMBER}", &context()),
            "demo-42"
        );
    }

    #[test]
    fn keeps_unknown_tokens() {
        assert_eq!(resolve("v${GIT_COMMIT}", &context()), "v${GIT_COMMIT}");
    }

    #[test]
    fn passes_through_plain_strings() {
        assert_eq!(resolve("release-1.0", &context()), "release-1.0");
    }

    #[test]
    fn keeps_unterminated_token() {
        assert_eq!(resolve("oops-${BUILD", &context()), "oops-${BUILD");
    }
}
