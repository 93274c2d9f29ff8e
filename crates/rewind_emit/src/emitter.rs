//! Tree to Go source rendering.

use crate::error::Result;
use crate::runtime::support_source;
use crate::syntax;
use rewind_tree::{Action, Program, Scope};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Line every function body starts with. A local type declaration keeps the
/// Go compiler from inlining the literal, so each scope stays its own frame.
pub const NOINLINE_GUARD: &str = "type _ int";

/// Literal used for leaves the oracle never reached.
pub const UNREACHED: &str = "-1";

/// Emission options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitOptions {
    /// Have `step` and `expect` print each call before checking it.
    pub trace_calls: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { trace_calls: true }
    }
}

/// Renders stamped trees as Go source.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    options: EmitOptions,
}

impl Emitter {
    /// Creates an emitter with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an emitter with the given options.
    #[must_use]
    pub const fn with_options(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Renders the statements of one scope, unindented.
    #[must_use]
    pub fn emit_scope(&self, scope: &Scope) -> String {
        let mut out = String::new();
        write_scope(&mut out, scope, 0);
        out
    }

    /// Renders a complete program: `package main`, `func main()` holding the
    /// root scope, then the runtime support functions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidSyntax`] if the rendered body breaks
    /// the statement grammar.
    pub fn emit_program(&self, program: &Program) -> Result<String> {
        let mut body = String::new();
        write_scope(&mut body, &program.root, 1);
        syntax::validate_body(&body)?;

        let mut out = String::new();
        out.push_str("package main\n\nimport \"log\"\n\nfunc main() {\n");
        out.push_str(&body);
        out.push_str("}\n\n");
        out.push_str(&support_source(&self.options));

        debug!(bytes = out.len(), lines = out.lines().count(), "emitted program");
        Ok(out)
    }
}

fn write_scope(out: &mut String, scope: &Scope, depth: usize) {
    let indent = "\t".repeat(depth);
    out.push_str(&format!("{indent}{NOINLINE_GUARD}\n"));

    for entry in &scope.entries {
        let prefix = if entry.is_deferred() { "defer " } else { "" };
        match entry.action() {
            Action::Step { n } => {
                out.push_str(&format!("{indent}{prefix}step({})\n", literal(*n)));
            }
            Action::Signal { n } => {
                out.push_str(&format!("{indent}{prefix}panic({})\n", literal(*n)));
            }
            Action::Interception { n } => {
                out.push_str(&format!("{indent}{prefix}expect({}, recover())\n", literal(*n)));
            }
            Action::Scope(inner) => {
                out.push_str(&format!("{indent}{prefix}func() {{\n"));
                write_scope(out, inner, depth + 1);
                out.push_str(&format!("{indent}}}()\n"));
            }
        }
    }
}

fn literal(n: Option<u64>) -> String {
    n.map_or_else(|| UNREACHED.to_string(), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rewind_oracle::{simulate_program, Generator, GeneratorConfig};
    use rewind_tree::Entry;

    fn sample_program() -> Program {
        let mut program = Program::new();
        program.root.push(Entry::immediate(Action::step()));
        let mut cleanup = Scope::new();
        cleanup.push(Entry::immediate(Action::step()));
        program
            .root
            .push(Entry::deferred(Action::Scope(cleanup)).unwrap());
        program.root.push(Entry::immediate(Action::signal()));
        simulate_program(&mut program).unwrap();
        program
    }

    #[test]
    fn emit_scope_renders_stamps() {
        let text = Emitter::new().emit_scope(&sample_program().root);
        insta::assert_snapshot!(text, @r"
type _ int
defer func() {
	type _ int
	expect(1, recover())
}()
step(1)
defer func() {
	type _ int
	step(2)
}()
panic(1)
");
    }

    #[test]
    fn unreached_leaves_render_as_minus_one() {
        let mut scope = Scope::new();
        scope.push(Entry::immediate(Action::step()));
        scope.push(Entry::immediate(Action::interception()));

        let text = Emitter::new().emit_scope(&scope);
        assert!(text.contains("step(-1)"));
        assert!(text.contains("expect(-1, recover())"));
    }

    #[test]
    fn program_wraps_body_in_main() {
        let source = Emitter::new().emit_program(&sample_program()).unwrap();

        assert!(source.starts_with("package main\n"));
        assert!(source.contains("func main() {\n\ttype _ int\n\tdefer func() {\n"));
        assert!(source.contains("func step(want int) {"));
        assert!(source.contains("func expect(n int, err interface{}) {"));
        assert!(source.contains("println(\"step\", want)"));
    }

    #[test]
    fn quiet_runtime_omits_println() {
        let emitter = Emitter::with_options(EmitOptions { trace_calls: false });
        let source = emitter.emit_program(&sample_program()).unwrap();
        assert!(!source.contains("println"));
    }

    #[test]
    fn emission_is_deterministic() {
        let program = sample_program();
        let emitter = Emitter::new();
        assert_eq!(
            emitter.emit_program(&program).unwrap(),
            emitter.emit_program(&program).unwrap()
        );
    }

    proptest! {
        #[test]
        fn generated_programs_emit_valid_syntax(seed in any::<u64>()) {
            let mut program = Generator::new(ChaCha8Rng::seed_from_u64(seed), &GeneratorConfig::default())
                .unwrap()
                .generate()
                .unwrap();
            simulate_program(&mut program).unwrap();

            let result = Emitter::new().emit_program(&program);
            prop_assert!(result.is_ok(), "{:?}", result.err());
        }
    }
}
