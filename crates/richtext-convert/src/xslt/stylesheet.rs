//! Stylesheet file format and the compiled rule set.
//!
//! Stylesheets are declarative TOML rule files. A transform rule matches an
//! element by local name (with optional attribute conditions) and rewrites
//! it; an assert rule turns the stylesheet into a Schematron-style report
//! producer instead.

use std::collections::BTreeMap;

use richtext_core::Node;
use serde::Deserialize;

/// A parsed stylesheet file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stylesheet {
    /// Rules in document order.
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Parse a stylesheet from TOML text.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// One stylesheet rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Element local name to match; `*` matches any element.
    #[serde(rename = "match")]
    pub pattern: String,
    /// Attribute values that must all be present for the rule to match.
    #[serde(default)]
    pub when: BTreeMap<String, String>,
    /// New tag name for the element.
    #[serde(default)]
    pub rename: Option<String>,
    /// Attributes to set on the element.
    #[serde(default)]
    pub set_attrs: BTreeMap<String, String>,
    /// Attributes to remove from the element.
    #[serde(default)]
    pub drop_attrs: Vec<String>,
    /// Remove the element and its whole subtree.
    #[serde(default)]
    pub drop: bool,
    /// Replace the element with its children.
    #[serde(default)]
    pub unwrap: bool,
    /// Schematron-style assertion; presence switches the compiled template
    /// into report mode.
    #[serde(default)]
    pub assert: Option<Assert>,
}

impl Rule {
    /// Whether this rule matches the element.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        if self.pattern != "*" && self.pattern != node.local_name() {
            return false;
        }
        self.when
            .iter()
            .all(|(name, value)| node.attr(name) == Some(value))
    }
}

/// A Schematron-style assertion attached to a rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assert {
    /// Attribute that must be present and non-empty.
    #[serde(default)]
    pub require_attr: Option<String>,
    /// Child element (by local name) that must be present.
    #[serde(default)]
    pub require_child: Option<String>,
    /// Attribute that must be absent.
    #[serde(default)]
    pub forbid_attr: Option<String>,
    /// Message reported when the assertion fails.
    pub message: String,
}

impl Assert {
    /// Whether the element satisfies the assertion.
    #[must_use]
    pub fn holds(&self, node: &Node) -> bool {
        if let Some(name) = &self.require_attr {
            if node.attr(name).is_none_or(str::is_empty) {
                return false;
            }
        }
        if let Some(name) = &self.require_child {
            if node.child_named(name).is_none() {
                return false;
            }
        }
        if let Some(name) = &self.forbid_attr {
            if node.attr(name).is_some() {
                return false;
            }
        }
        true
    }
}

/// A rule with its import precedence.
///
/// Per the engine's native precedence rules the importing (base) stylesheet
/// outranks its imports, and a later import outranks an earlier one; ties go
/// to the later rule in document order.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// The rule itself.
    pub rule: Rule,
    /// Import precedence; the base stylesheet gets `u32::MAX`.
    pub precedence: u32,
}

/// A fully merged, ready-to-apply rule set.
#[derive(Debug, Clone, Default)]
pub struct CompiledTemplate {
    /// All rules from the base stylesheet and its imports.
    pub rules: Vec<CompiledRule>,
    /// Whether any rule carries an assertion.
    pub report_mode: bool,
}

impl CompiledTemplate {
    /// Build a template from the base stylesheet and its imports, lowest
    /// precedence first.
    #[must_use]
    pub fn merge(imports: Vec<Stylesheet>, base: Stylesheet) -> Self {
        let mut rules = Vec::new();
        for (index, import) in imports.into_iter().enumerate() {
            let precedence = u32::try_from(index).unwrap_or(u32::MAX - 1);
            rules.extend(
                import
                    .rules
                    .into_iter()
                    .map(|rule| CompiledRule { rule, precedence }),
            );
        }
        rules.extend(base.rules.into_iter().map(|rule| CompiledRule {
            rule,
            precedence: u32::MAX,
        }));

        let report_mode = rules.iter().any(|r| r.rule.assert.is_some());
        Self { rules, report_mode }
    }

    /// The winning rule for an element, if any.
    #[must_use]
    pub fn find(&self, node: &Node) -> Option<&Rule> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, compiled)| compiled.rule.matches(node))
            .max_by_key(|(order, compiled)| (compiled.precedence, *order))
            .map(|(_, compiled)| &compiled.rule)
    }

    /// Every failing assertion for an element, in rule order.
    pub fn failed_asserts<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Assert> {
        self.rules.iter().filter_map(move |compiled| {
            let assert = compiled.rule.assert.as_ref()?;
            (compiled.rule.matches(node) && !assert.holds(node)).then_some(assert)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sheet(raw: &str) -> Stylesheet {
        Stylesheet::parse(raw).unwrap()
    }

    #[test]
    fn parses_transform_rules() {
        let sheet = sheet(
            r#"
[[rule]]
match = "para"
rename = "p"

[[rule]]
match = "emphasis"
when = { role = "strong" }
rename = "strong"
drop_attrs = ["role"]
"#,
        );
        assert_eq!(sheet.rules.len(), 2);
        assert!(sheet.rules[1].matches(&Node::new("emphasis").with_attr("role", "strong")));
        assert!(!sheet.rules[1].matches(&Node::new("emphasis")));
    }

    #[test]
    fn base_rules_outrank_imports() {
        let base = sheet("[[rule]]\nmatch = \"para\"\nrename = \"base\"");
        let import = sheet("[[rule]]\nmatch = \"para\"\nrename = \"import\"");
        let template = CompiledTemplate::merge(vec![import], base);
        let rule = template.find(&Node::new("para")).unwrap();
        assert_eq!(rule.rename.as_deref(), Some("base"));
    }

    #[test]
    fn later_imports_outrank_earlier_ones() {
        let low = sheet("[[rule]]\nmatch = \"para\"\nrename = \"low\"");
        let high = sheet("[[rule]]\nmatch = \"para\"\nrename = \"high\"");
        let template = CompiledTemplate::merge(vec![low, high], Stylesheet::default());
        let rule = template.find(&Node::new("para")).unwrap();
        assert_eq!(rule.rename.as_deref(), Some("high"));
    }

    #[test]
    fn assert_rule_switches_report_mode() {
        let base = sheet(
            r#"
[[rule]]
match = "eztemplate"
assert = { require_attr = "name", message = "template without a name" }
"#,
        );
        let template = CompiledTemplate::merge(Vec::new(), base);
        assert!(template.report_mode);
        let bad = Node::new("eztemplate");
        assert_eq!(template.failed_asserts(&bad).count(), 1);
        let good = Node::new("eztemplate").with_attr("name", "factbox");
        assert_eq!(template.failed_asserts(&good).count(), 0);
    }
}
