//! Per-language signature extraction
//!
//! A closed, ordered list of (extension predicate, regex extractor) pairs,
//! evaluated top-down with first-match-wins dispatch. This is deliberately
//! shallow pattern matching, not parsing: it pulls class/function/method names
//! out of source text so the repository summary can mention them, nothing
//! more. Adding a language is a data change in `with_defaults`.

use regex::Regex;

/// One per-language extractor: extensions it claims plus labeled patterns
struct SignatureAnalyzer {
    language: &'static str,
    extensions: &'static [&'static str],
    /// (label, pattern with exactly one capture group)
    patterns: Vec<(&'static str, Regex)>,
}

impl SignatureAnalyzer {
    fn supports(&self, filename: &str) -> bool {
        self.extensions.iter().any(|ext| filename.ends_with(ext))
    }

    fn extract(&self, content: &str) -> String {
        let mut out = String::new();
        for (label, pattern) in &self.patterns {
            for capture in pattern.captures_iter(content) {
                out.push_str(label);
                out.push_str(": ");
                out.push_str(&capture[1]);
                out.push('\n');
            }
        }
        out
    }
}

/// Ordered registry of signature analyzers
pub struct AnalyzerRegistry {
    analyzers: Vec<SignatureAnalyzer>,
}

impl AnalyzerRegistry {
    /// Registry with the built-in analyzers (Java, Python, JS/TS, Rust)
    pub fn with_defaults() -> Self {
        let analyzers = vec![
            SignatureAnalyzer {
                language: "java",
                extensions: &[".java"],
                patterns: vec![
                    ("class", Regex::new(r"class\s+(\w+)").unwrap()),
                    (
                        "method",
                        Regex::new(r"(?:public|protected|private)\s+[\w<>\[\],\s]+\s(\w+)\s*\(")
                            .unwrap(),
                    ),
                ],
            },
            SignatureAnalyzer {
                language: "python",
                extensions: &[".py"],
                patterns: vec![
                    ("class", Regex::new(r"class\s+(\w+)").unwrap()),
                    ("function", Regex::new(r"def\s+(\w+)\(").unwrap()),
                ],
            },
            SignatureAnalyzer {
                language: "javascript",
                extensions: &[".js", ".ts"],
                patterns: vec![
                    ("class", Regex::new(r"class\s+(\w+)").unwrap()),
                    ("function", Regex::new(r"function\s+(\w+)\(").unwrap()),
                ],
            },
            SignatureAnalyzer {
                language: "rust",
                extensions: &[".rs"],
                patterns: vec![
                    ("struct", Regex::new(r"struct\s+(\w+)").unwrap()),
                    ("enum", Regex::new(r"enum\s+(\w+)").unwrap()),
                    ("function", Regex::new(r"fn\s+(\w+)").unwrap()),
                ],
            },
        ];
        Self { analyzers }
    }

    /// Extracted signatures for the file, or the unsupported-file marker
    pub fn analyze_file(&self, filename: &str, content: &str) -> String {
        match self.analyzers.iter().find(|a| a.supports(filename)) {
            Some(analyzer) => analyzer.extract(content),
            None => format!("unsupported file: {}", filename),
        }
    }

    /// Names of the registered languages, in dispatch order
    pub fn languages(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.language).collect()
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_signatures() {
        let registry = AnalyzerRegistry::with_defaults();
        let out = registry.analyze_file("x.py", "class Foo:\n    def bar(self):\n        pass\n");
        assert!(out.contains("class: Foo"));
        assert!(out.contains("function: bar"));
    }

    #[test]
    fn test_javascript_and_typescript() {
        let registry = AnalyzerRegistry::with_defaults();
        let src = "class Widget {}\nfunction render(props) {}\n";
        let js = registry.analyze_file("app.js", src);
        let ts = registry.analyze_file("app.ts", src);
        assert!(js.contains("class: Widget"));
        assert!(js.contains("function: render"));
        assert_eq!(js, ts);
    }

    #[test]
    fn test_java_signatures() {
        let registry = AnalyzerRegistry::with_defaults();
        let src = "public class Service {\n    public String fetchAll(int limit) { return null; }\n}\n";
        let out = registry.analyze_file("Service.java", src);
        assert!(out.contains("class: Service"));
        assert!(out.contains("method: fetchAll"));
    }

    #[test]
    fn test_rust_signatures() {
        let registry = AnalyzerRegistry::with_defaults();
        let src = "struct Config;\nenum Mode { A, B }\nfn main() {}\n";
        let out = registry.analyze_file("main.rs", src);
        assert!(out.contains("struct: Config"));
        assert!(out.contains("enum: Mode"));
        assert!(out.contains("function: main"));
    }

    #[test]
    fn test_unsupported_extension() {
        let registry = AnalyzerRegistry::with_defaults();
        let out = registry.analyze_file("notes.txt", "class Foo");
        assert_eq!(out, "unsupported file: notes.txt");
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let registry = AnalyzerRegistry::with_defaults();
        let out = registry.analyze_file("empty.py", "x = 1\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_dispatch_order() {
        let registry = AnalyzerRegistry::with_defaults();
        assert_eq!(
            registry.languages(),
            vec!["java", "python", "javascript", "rust"]
        );
    }
}
