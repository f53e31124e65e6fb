//! Equivalence classes derived from the rules of one specification field

use crate::model::specification::FieldRule;
use crate::model::specification::SpecField;
use crate::model::specification::Specification;
use std::collections::HashMap;
use std::collections::HashSet;

/// Primary key rule, enables the secondary data section
pub const RULE_PK: &str = "PK";
/// Field type rule, its value selects the type specific classes
pub const RULE_TYPE: &str = "TYPE";
/// Mandatory
pub const RULE_C1: &str = "C1";
/// Minimum
pub const RULE_C2: &str = "C2";
/// Maximum
pub const RULE_C3: &str = "C3";
/// Email
pub const RULE_C4: &str = "C4";
/// Regular expression
pub const RULE_C5: &str = "C5";

const PREDEFINED_RULES: [&str; 7] = [RULE_PK, RULE_TYPE, RULE_C1, RULE_C2, RULE_C3, RULE_C4, RULE_C5];

const EXTRA_VALID_STRINGS: [&str; 4] = ["naughty strings", "number", "float", "boolean"];

#[derive(Debug, Clone, PartialEq)]
pub struct ValidClass {
    pub name: String,
    pub comment: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorClass {
    pub name: String,
    pub comment: Vec<String>,
    pub severity: String,
}

/// Valid and error classes of one field in insertion order.
/// Assigning a class name twice replaces the entry at its first position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquivalenceClasses {
    pub valid: Vec<ValidClass>,
    pub error: Vec<ErrorClass>,
}

impl EquivalenceClasses {
    pub fn valid_class(&self, name: &str) -> Option<&ValidClass> {
        self.valid.iter().find(|class| class.name == name)
    }

    pub fn error_class(&self, name: &str) -> Option<&ErrorClass> {
        self.error.iter().find(|class| class.name == name)
    }

    fn set_valid(&mut self, name: &str, comment: Vec<String>) {
        let class = ValidClass {
            name: name.to_owned(),
            comment,
        };
        match self.valid.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => *existing = class,
            None => self.valid.push(class),
        }
    }

    fn set_error(&mut self, name: &str, comment: String, rule: &FieldRule) {
        let class = ErrorClass {
            name: name.to_owned(),
            comment: vec![comment],
            severity: rule.severity.clone(),
        };
        match self.error.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => *existing = class,
            None => self.error.push(class),
        }
    }

    fn push_valid_comment(&mut self, name: &str, comment: &str) {
        if let Some(class) = self.valid.iter_mut().find(|class| class.name == name) {
            class.comment.push(comment.to_owned());
        }
    }

    fn push_comment_to_all_valid(&mut self, comment: String) {
        for class in &mut self.valid {
            class.comment.push(comment.clone());
        }
    }
}

/// Equivalence classes of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldClasses {
    pub classes: EquivalenceClasses,
    /// Custom rules of the field which are missing in the rule table
    pub unknown_rules: Vec<String>,
}

/// Builds the equivalence classes for the rules of one field.
///
/// # Arguments
/// * `specification` - Source of the short descriptions of custom rules
/// * `field` - The field whose rules are converted
///
/// # Returns
/// The classes and the names of custom rules which could not be resolved
pub fn classes_for_rules(specification: &Specification, field: &SpecField) -> FieldClasses {
    let rules = field.rules_by_name();
    let mut classes = EquivalenceClasses::default();
    let mut unknown_rules = Vec::new();

    classes.set_valid("not null", vec!["Not Empty".to_owned()]);

    match rules.get(RULE_C1) {
        Some(rule) => classes.set_error(RULE_C1, "Mandatory Field".to_owned(), rule),
        None => classes.set_valid("null", vec!["Empty".to_owned()]),
    }
    if rules.contains_key(RULE_C2) {
        classes.set_valid("exactly min", Vec::new());
    }
    if rules.contains_key(RULE_C3) {
        classes.set_valid("exactly max", Vec::new());
    }
    if let Some(rule) = rules.get(RULE_C4) {
        classes.set_error(RULE_C4, "Must be valid email".to_owned(), rule);
        classes.push_valid_comment("not null", "Valid Email");
    }
    if let Some(rule) = rules.get(RULE_C5) {
        classes.set_error(RULE_C5, "Must match the given RegEx".to_owned(), rule);
        classes.push_valid_comment("not null", "Matches RegEx");
    }

    if let Some(type_rule) = rules.get(RULE_TYPE) {
        let field_type = type_rule.value.to_lowercase();
        match field_type.as_str() {
            "string" => {
                if !rules.contains_key(RULE_C4) && !rules.contains_key(RULE_C5) {
                    for name in EXTRA_VALID_STRINGS {
                        classes.set_valid(name, vec![name.to_owned()]);
                    }
                }
                add_limit_classes(&mut classes, &rules, " chars");
            }
            "date" => add_limit_classes(&mut classes, &rules, " date"),
            "integer" | "float" => add_limit_classes(&mut classes, &rules, ""),
            "boolean" => classes.set_error("boolean", "Not a boolean value".to_owned(), type_rule),
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    for rule in &field.rules {
        let name = rule.rule_name.to_uppercase();
        if PREDEFINED_RULES.contains(&name.as_str()) || !seen.insert(name.clone()) {
            continue;
        }
        // a later column with the same rule name holds the value in use
        let field_rule = rules.get(&name).copied().unwrap_or(rule);
        match specification.rule(&name) {
            Some(definition) => classes.set_error(&name, definition.short_desc.clone(), field_rule),
            None => unknown_rules.push(name),
        }
    }

    FieldClasses { classes, unknown_rules }
}

/// Translates minimum and maximum rules into error classes and valid comments.
fn add_limit_classes(classes: &mut EquivalenceClasses, rules: &HashMap<String, &FieldRule>, unit: &str) {
    if let Some(rule) = rules.get(RULE_C2) {
        classes.set_error(RULE_C2, format!("Fall below min {}{}", rule.value, unit), rule);
        classes.push_comment_to_all_valid(format!("Min {}{}", rule.value, unit));
    }
    if let Some(rule) = rules.get(RULE_C3) {
        classes.set_error(RULE_C3, format!("Exceeds max {}{}", rule.value, unit), rule);
        classes.push_comment_to_all_valid(format!("Max {}{}", rule.value, unit));
    }
}
