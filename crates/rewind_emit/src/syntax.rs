//! Validator for the fixed statement grammar of emitted bodies.
//!
//! ```text
//! body      := guard stmt*
//! guard     := "type _ int"
//! stmt      := ["defer "] call | "expect(" int ", recover())"
//! call      := "step(" int ")" | "panic(" int ")" | "func() {" body "}()"
//! ```
//!
//! One statement per line, leading tabs ignored.

use crate::emitter::NOINLINE_GUARD;
use crate::error::{Error, Result};

/// Checks that `body` is a well-formed scope body.
///
/// # Errors
///
/// Returns [`Error::InvalidSyntax`] naming the first offending line.
pub fn validate_body(body: &str) -> Result<()> {
    let mut open = 0usize;
    let mut need_guard = true;
    let mut last = 0;

    for (index, raw) in body.lines().enumerate() {
        let line = index + 1;
        last = line;
        let fail = |reason| Error::InvalidSyntax {
            line,
            text: raw.to_string(),
            reason,
        };

        let text = raw.trim_start_matches('\t');
        if need_guard {
            if text != NOINLINE_GUARD {
                return Err(fail("body must start with the no-inline guard"));
            }
            need_guard = false;
            continue;
        }

        let (deferred, stmt) = text
            .strip_prefix("defer ")
            .map_or((false, text), |rest| (true, rest));

        if stmt == "func() {" {
            open += 1;
            need_guard = true;
        } else if stmt == "}()" {
            if deferred {
                return Err(fail("closing brace cannot be deferred"));
            }
            open = open
                .checked_sub(1)
                .ok_or_else(|| fail("unbalanced closing brace"))?;
        } else if let Some(arg) = call_arg(stmt, "step(", ")") {
            check_int(arg).map_err(fail)?;
        } else if let Some(arg) = call_arg(stmt, "panic(", ")") {
            check_int(arg).map_err(fail)?;
        } else if let Some(arg) = call_arg(stmt, "expect(", ", recover())") {
            if deferred {
                return Err(fail("a deferred expect(recover()) has no meaning"));
            }
            check_int(arg).map_err(fail)?;
        } else if stmt == NOINLINE_GUARD {
            return Err(fail("no-inline guard outside body start"));
        } else {
            return Err(fail("unknown statement"));
        }
    }

    if need_guard || open != 0 {
        return Err(Error::InvalidSyntax {
            line: last,
            text: String::new(),
            reason: "unterminated body",
        });
    }
    Ok(())
}

fn call_arg<'a>(stmt: &'a str, open: &str, close: &str) -> Option<&'a str> {
    stmt.strip_prefix(open)?.strip_suffix(close)
}

fn check_int(arg: &str) -> std::result::Result<(), &'static str> {
    arg.parse::<i64>()
        .map(|_| ())
        .map_err(|_| "argument is not an integer literal")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(body: &str) -> &'static str {
        match validate_body(body) {
            Err(Error::InvalidSyntax { reason, .. }) => reason,
            Ok(()) => "ok",
        }
    }

    #[test]
    fn accepts_nested_body() {
        let body = "type _ int\ndefer func() {\n\ttype _ int\n\texpect(1, recover())\n}()\nstep(1)\ndefer step(-1)\npanic(1)\n";
        assert_eq!(reason(body), "ok");
    }

    #[test]
    fn rejects_missing_guard() {
        assert_eq!(reason("step(1)\n"), "body must start with the no-inline guard");
        assert_eq!(
            reason("type _ int\nfunc() {\nstep(1)\n}()\n"),
            "body must start with the no-inline guard"
        );
    }

    #[test]
    fn rejects_deferred_expect() {
        assert_eq!(
            reason("type _ int\ndefer expect(0, recover())\n"),
            "a deferred expect(recover()) has no meaning"
        );
    }

    #[test]
    fn rejects_unbalanced_braces() {
        assert_eq!(reason("type _ int\n}()\n"), "unbalanced closing brace");
        assert_eq!(reason("type _ int\nfunc() {\ntype _ int\n"), "unterminated body");
    }

    #[test]
    fn rejects_non_literal_arguments() {
        assert_eq!(reason("type _ int\nstep(x)\n"), "argument is not an integer literal");
        assert_eq!(reason("type _ int\ngo step(1)\n"), "unknown statement");
    }

    #[test]
    fn rejects_empty_body() {
        assert_eq!(reason(""), "unterminated body");
    }
}
