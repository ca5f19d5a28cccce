//! Module wrapping for concatenated bundles.

/// Embeds one compiled module in a bundle under its logical name.
pub trait ModuleWrapper: Send + Sync {
    /// Wraps `content`. `original_path` is the pre-transpile path, used by
    /// runtimes to resolve relative requires.
    fn wrap(&self, original_path: &str, module_name: &str, content: &str) -> String;
}

/// Wraps modules in a `register(name, factory)` call.
///
/// ```text
/// /* src/app.ts */
/// register("src/app", function (define, require, module, exports) {
/// ...
/// });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterWrapper;

impl ModuleWrapper for RegisterWrapper {
    fn wrap(&self, original_path: &str, module_name: &str, content: &str) -> String {
        let mut out = String::with_capacity(content.len() + module_name.len() + 96);
        out.push_str("/* ");
        out.push_str(&original_path.replace("*/", "* /"));
        out.push_str(" */\n");
        out.push_str("register(\"");
        for c in module_name.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push_str("\", function (define, require, module, exports) {\n");
        out.push_str(content);
        if !content.is_empty() && !content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("});\n");
        out
    }
}
