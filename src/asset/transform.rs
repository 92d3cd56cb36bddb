//! On-the-fly source transformation for servable assets.
//!
//! Scripts get configured environment values substituted as literals and
//! are then minified with oxc; stylesheets are minified with lightningcss.
//! A source the minifier cannot parse is served as-is (after substitution)
//! rather than erroring.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::LazyLock;

/// Source language of a transformable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    Js,
    Ts,
    Css,
}

/// Map a file extension to its loader. Extensions outside this set are
/// served verbatim.
pub fn loader_for(ext: &str) -> Option<Loader> {
    match ext {
        "js" | "mjs" => Some(Loader::Js),
        "ts" => Some(Loader::Ts),
        "css" => Some(Loader::Css),
        _ => None,
    }
}

/// `import.meta.env.KEY` occurrences replaced during script transforms.
static ENV_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"import\.meta\.env\.([A-Za-z_$][A-Za-z0-9_$]*)").expect("env token regex")
});

/// Transform a source buffer for serving.
pub fn transform(source: &str, loader: Loader, env: &FxHashMap<String, Value>) -> String {
    match loader {
        Loader::Js | Loader::Ts => {
            let substituted = substitute_env(source, env);
            minify_script(&substituted, loader).unwrap_or(substituted)
        }
        Loader::Css => minify_css(source).unwrap_or_else(|| source.to_string()),
    }
}

/// Replace `import.meta.env.KEY` with the configured value as a JSON
/// literal. Unknown keys are left untouched.
fn substitute_env(source: &str, env: &FxHashMap<String, Value>) -> String {
    if env.is_empty() {
        return source.to_string();
    }
    ENV_TOKEN
        .replace_all(source, |caps: &Captures| match env.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Minify a script source as an ES module. Returns `None` on parse errors.
fn minify_script(source: &str, loader: Loader) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = match loader {
        Loader::Ts => SourceType::ts(),
        _ => SourceType::mjs(),
    };
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify a stylesheet source. Returns `None` on parse errors.
fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}
