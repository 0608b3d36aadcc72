//! # File classification
//!
//! Decides which changed files count towards an author's line totals.
//!
//! Files are included by default. A file is excluded as soon as any rule
//! matches its path: lock files, minified or bundled assets, source maps,
//! build output, vendored dependencies, generated code, documentation builds,
//! editor metadata, binary and media files, databases and logs.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::TallyError;

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;

/// Label used for files without an extension in the per-extension statistics
pub const NO_EXTENSION: &str = "(none)";

/// A named exclusion rule.
#[derive(Debug)]
pub struct ExclusionRule {
    /// Short name of the rule, used in log output
    pub name: &'static str,

    /// The compiled pattern, matched against the full repository-relative path
    pub pattern: Regex,
}

fn rule(name: &'static str, pattern: &str) -> ExclusionRule {
    ExclusionRule {
        name,
        pattern: Regex::new(pattern).expect("Failed to compile built-in exclusion rule"),
    }
}

lazy_static! {
    /// The built-in exclusion rules.
    ///
    /// Directory rules are anchored either at the start of the path or at a path
    /// segment boundary. Extension rules are anchored at the end of the path.
    pub static ref BUILT_IN_RULES: Vec<ExclusionRule> = vec![
        rule(
            "lock-file",
            r"(^|/)(package-lock\.json|npm-shrinkwrap\.json|yarn\.lock|pnpm-lock\.yaml|bun\.lockb|Cargo\.lock|Gemfile\.lock|composer\.lock|poetry\.lock|Pipfile\.lock|go\.sum|[^/]+\.lock)$",
        ),
        rule("minified-asset", r"(?i)\.min\.(js|css|mjs)$"),
        rule("bundled-asset", r"(?i)(\.bundle\.js|\.chunk\.js|\.chunk\.css)$"),
        rule("source-map", r"(?i)\.map$"),
        rule(
            "build-output",
            r"^(dist|build|out|target|obj|\.next|\.nuxt|\.output|\.svelte-kit|coverage)/",
        ),
        rule(
            "dependency-directory",
            r"(^|/)(node_modules|bower_components|vendor|jspm_packages|\.venv|venv|Pods)/",
        ),
        rule(
            "generated-file",
            r"(?i)((^|/)(__generated__|generated)/|\.generated\.|\.g\.dart$|\.pb\.go$|_pb2\.py$|\.pb\.(h|cc)$|\.designer\.cs$)",
        ),
        rule(
            "documentation-build",
            r"^(_site|site|docs/_build|docs/build|docs/\.vitepress/dist|docs/\.docusaurus)/",
        ),
        rule("editor-metadata", r"(^|/)\.(idea|vscode|vs|fleet)/"),
        rule(
            "binary-or-media",
            r"(?i)\.(png|jpe?g|gif|bmp|ico|svg|webp|avif|tiff?|psd|mp4|mov|avi|mkv|webm|flv|mp3|wav|ogg|flac|aac|m4a|pdf|zip|tar|gz|tgz|bz2|xz|rar|7z|jar|war|exe|dll|so|dylib|bin|o|a|lib|class|pyc|wasm|woff2?|ttf|eot|otf)$",
        ),
        rule("database-file", r"(?i)\.(db|sqlite|sqlite3|mdb|accdb)$"),
        rule("log-file", r"(?i)((^|/)logs/|\.log$)"),
    ];
}

/// Decides whether changed files count towards line totals.
///
/// # Examples
///
/// ```
/// use repo_tally_core::classifier::FileClassifier;
///
/// let classifier = FileClassifier::default();
///
/// assert!(classifier.should_include("src/index.js"));
/// assert!(!classifier.should_include("node_modules/a/b.js"));
/// ```
#[derive(Debug, Default)]
pub struct FileClassifier {
    extra_rules: Vec<Regex>,
}

impl FileClassifier {
    /// Creates a classifier with the built-in rules plus additional exclusion patterns.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::InvalidPattern` when an extra pattern is not a valid regular expression.
    pub fn new(extra_patterns: &[String]) -> Result<Self, TallyError> {
        let extra_rules = extra_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| TallyError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { extra_rules })
    }

    /// Returns the name of the first rule that excludes the path, if any.
    pub fn excluded_by(&self, path: &str) -> Option<&str> {
        if let Some(rule) = BUILT_IN_RULES.iter().find(|r| r.pattern.is_match(path)) {
            return Some(rule.name);
        }

        self.extra_rules
            .iter()
            .find(|r| r.is_match(path))
            .map(|r| r.as_str())
    }

    pub fn should_include(&self, path: &str) -> bool {
        self.excluded_by(path).is_none()
    }
}

/// The lower-cased extension of the file name, or [`NO_EXTENSION`].
///
/// Dot files such as `.gitignore` have no extension.
///
/// # Examples
///
/// ```
/// use repo_tally_core::classifier::{file_extension, NO_EXTENSION};
///
/// assert_eq!(file_extension("src/Main.RS"), "rs");
/// assert_eq!(file_extension("Makefile"), NO_EXTENSION);
/// ```
pub fn file_extension(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(index) if index > 0 && index + 1 < file_name.len() => {
            file_name[index + 1..].to_lowercase()
        }
        _ => NO_EXTENSION.to_string(),
    }
}
