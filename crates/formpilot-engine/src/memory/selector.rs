use super::tree::ElementSpec;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "memory/selector.pest"]
pub struct SelectorParser;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Pest error: {0}")]
    Pest(#[from] Box<pest::error::Error<Rule>>),
    #[error("Empty selector")]
    Empty,
    #[error("Unexpected rule: {0:?}")]
    UnexpectedRule(Rule),
}

impl From<pest::error::Error<Rule>> for SelectorError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        SelectorError::Pest(Box::new(err))
    }
}

/// A comma-separated group of selectors; matches if any member matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by descendant combinators, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<(AttributeOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    /// `=`
    Equals,
    /// `*=`
    Contains,
    /// `^=`
    StartsWith,
    /// `$=`
    EndsWith,
    /// `~=`
    Includes,
}

impl AttributeOp {
    pub fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            AttributeOp::Equals => actual == expected,
            AttributeOp::Contains => !expected.is_empty() && actual.contains(expected),
            AttributeOp::StartsWith => !expected.is_empty() && actual.starts_with(expected),
            AttributeOp::EndsWith => !expected.is_empty() && actual.ends_with(expected),
            AttributeOp::Includes => actual.split_whitespace().any(|word| word == expected),
        }
    }
}

pub fn parse_selector(input: &str) -> Result<SelectorList, SelectorError> {
    let mut pairs = SelectorParser::parse(Rule::selector_list, input)?;
    let list = pairs.next().ok_or(SelectorError::Empty)?;

    let mut selectors = Vec::new();
    for inner in list.into_inner() {
        match inner.as_rule() {
            Rule::complex => selectors.push(parse_complex(inner)?),
            Rule::EOI => {}
            other => return Err(SelectorError::UnexpectedRule(other)),
        }
    }

    if selectors.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(SelectorList { selectors })
}

fn parse_complex(pair: Pair<Rule>) -> Result<ComplexSelector, SelectorError> {
    let compounds = pair
        .into_inner()
        .map(parse_compound)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ComplexSelector { compounds })
}

fn parse_compound(pair: Pair<Rule>) -> Result<CompoundSelector, SelectorError> {
    let mut compound = CompoundSelector::default();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::tag => {
                let tag = part.as_str();
                if tag != "*" {
                    compound.tag = Some(tag.to_ascii_lowercase());
                }
            }
            Rule::id => compound.id = Some(part.as_str()[1..].to_string()),
            Rule::class => compound.classes.push(part.as_str()[1..].to_string()),
            Rule::attribute => compound.attributes.push(parse_attribute(part)?),
            other => return Err(SelectorError::UnexpectedRule(other)),
        }
    }
    Ok(compound)
}

fn parse_attribute(pair: Pair<Rule>) -> Result<AttributeSelector, SelectorError> {
    let mut name = String::new();
    let mut op = None;
    let mut value = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::attr_name => name = part.as_str().to_ascii_lowercase(),
            Rule::attr_op => {
                op = Some(match part.as_str() {
                    "*=" => AttributeOp::Contains,
                    "^=" => AttributeOp::StartsWith,
                    "$=" => AttributeOp::EndsWith,
                    "~=" => AttributeOp::Includes,
                    _ => AttributeOp::Equals,
                })
            }
            Rule::attr_value => {
                value = Some(
                    part.into_inner()
                        .next()
                        .map(|v| v.as_str().to_string())
                        .unwrap_or_default(),
                )
            }
            other => return Err(SelectorError::UnexpectedRule(other)),
        }
    }

    Ok(AttributeSelector {
        name,
        matcher: op.zip(value),
    })
}

impl ComplexSelector {
    /// Builds an element tree that this selector matches: one element per
    /// compound, nested outermost first. Ancestors default to `div`, the
    /// subject to `leaf_tag`.
    pub fn materialize(&self, leaf_tag: &str) -> ElementSpec {
        let mut compounds = self.compounds.iter().rev();
        let mut spec = match compounds.next() {
            Some(subject) => subject.materialize(leaf_tag),
            None => ElementSpec::new(leaf_tag),
        };
        for ancestor in compounds {
            spec = ancestor.materialize("div").child(spec);
        }
        spec
    }
}

impl CompoundSelector {
    pub fn materialize(&self, default_tag: &str) -> ElementSpec {
        let mut spec = ElementSpec::new(self.tag.as_deref().unwrap_or(default_tag));
        if let Some(id) = &self.id {
            spec = spec.id(id);
        }
        for class in &self.classes {
            spec = spec.class(class);
        }
        for attribute in &self.attributes {
            let value = attribute
                .matcher
                .as_ref()
                .map(|(_, v)| v.as_str())
                .unwrap_or("");
            spec = spec.attr(&attribute.name, value);
        }
        spec
    }
}
