use std::collections::BTreeMap;
use std::collections::HashMap;

/// A rule value assigned to a field, with the severity of the rule column
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub rule_name: String,
    pub value: String,
    pub severity: String,
}

/// A field row of a specification sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SpecField {
    /// Display name
    pub name: String,
    pub internal_name: String,
    pub rules: Vec<FieldRule>,
}

impl SpecField {
    /// Returns the rules keyed by their upper-cased name, a later column wins.
    pub fn rules_by_name(&self) -> HashMap<String, &FieldRule> {
        self.rules
            .iter()
            .map(|rule| (rule.rule_name.to_uppercase(), rule))
            .collect()
    }
}

/// An entry of the rule section
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub short_desc: String,
    pub long_desc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specification {
    pub name: String,
    /// Field display names in declaration order
    pub field_order: Vec<String>,
    pub fields: HashMap<String, SpecField>,
    /// Severity names in declaration order
    pub severities: Vec<String>,
    pub rules: BTreeMap<String, Rule>,
}

impl Specification {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Adds a field. A field with the same name is replaced and keeps its position.
    pub fn add_field(&mut self, field: SpecField) {
        if !self.fields.contains_key(&field.name) {
            self.field_order.push(field.name.clone());
        }
        self.fields.insert(field.name.clone(), field);
    }

    /// Fields in declaration order
    pub fn fields_in_order(&self) -> impl Iterator<Item = &SpecField> {
        self.field_order.iter().filter_map(|name| self.fields.get(name))
    }

    /// Looks up a rule, ignoring the case of its name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .get(name)
            .or_else(|| self.rules.values().find(|rule| rule.name.eq_ignore_ascii_case(name)))
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rule(name).is_some()
    }
}
