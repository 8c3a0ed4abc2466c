//! Selector patterns for locating graphic elements
//!
//! A CSS subset, parsed with chumsky:
//!
//! - lists: `a, b`
//! - combinators: descendant (`g rect`) and child (`g > rect`)
//! - compounds: `g`, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`,
//!   `[attr~=value]`, `[attr^=value]`, `[attr$=value]`, `[attr*=value]`,
//!   `[attr|=value]`
//!
//! Matching runs right to left over a [`GraphicDocument`] tree.

use chumsky::prelude::*;
use std::fmt;

use crate::core::{ElementId, GraphicDocument, GraphicElement, Result, WalkthroughError};

type Extra<'src> = extra::Err<Rich<'src, char>>;

/// A parsed selector pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

/// Compounds joined by combinators: `g.node > rect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub parts: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute {
        name: String,
        test: Option<(AttrOp, String)>,
    },
}

/// Attribute value operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `=`
    Equals,
    /// `~=` whitespace-separated word
    Includes,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
    /// `|=` exact or followed by `-`
    DashMatch,
}

impl AttrOp {
    fn test(&self, actual: &str, expected: &str) -> bool {
        match self {
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => {
                !expected.is_empty() && actual.split_whitespace().any(|word| word == expected)
            }
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
            AttrOp::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }
}

impl Selector {
    /// Parse a selector pattern
    pub fn parse(pattern: &str) -> Result<Self> {
        selector_list()
            .parse(pattern)
            .into_result()
            .map(|alternatives| Self {
                source: pattern.to_string(),
                alternatives,
            })
            .map_err(|errors| WalkthroughError::invalid_selector(pattern, describe(&errors)))
    }

    /// The pattern this selector was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Comma-separated alternatives
    pub fn alternatives(&self) -> &[ComplexSelector] {
        &self.alternatives
    }

    /// Test one element of `document`
    pub fn matches(&self, document: &GraphicDocument, element: ElementId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches(document, element))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl ComplexSelector {
    fn new(first: Compound, rest: Vec<(Combinator, Compound)>) -> Self {
        let mut compounds = vec![first];
        let mut combinators = Vec::with_capacity(rest.len());
        for (combinator, compound) in rest {
            combinators.push(combinator);
            compounds.push(compound);
        }
        Self {
            compounds,
            combinators,
        }
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    pub fn combinators(&self) -> &[Combinator] {
        &self.combinators
    }

    fn matches(&self, document: &GraphicDocument, element: ElementId) -> bool {
        self.matches_at(document, element, self.compounds.len() - 1)
    }

    fn matches_at(&self, document: &GraphicDocument, element: ElementId, index: usize) -> bool {
        let Some(candidate) = document.element(element) else {
            return false;
        };
        if !self.compounds[index].matches(candidate) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => candidate
                .parent()
                .is_some_and(|parent| self.matches_at(document, parent, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = candidate.parent();
                while let Some(current) = ancestor {
                    if self.matches_at(document, current, index - 1) {
                        return true;
                    }
                    ancestor = document.element(current).and_then(GraphicElement::parent);
                }
                false
            }
        }
    }
}

impl Compound {
    pub fn matches(&self, element: &GraphicElement) -> bool {
        self.parts.iter().all(|part| part.matches(element))
    }
}

impl SimpleSelector {
    pub fn matches(&self, element: &GraphicElement) -> bool {
        match self {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(tag) => element.tag.eq_ignore_ascii_case(tag),
            SimpleSelector::Id(id) => element.id.as_deref() == Some(id.as_str()),
            SimpleSelector::Class(class) => element.has_class(class),
            SimpleSelector::Attribute { name, test } => match (element.attribute(name), test) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some((op, expected))) => op.test(&actual, expected),
            },
        }
    }
}

fn describe(errors: &[Rich<'_, char>]) -> String {
    errors
        .iter()
        .map(|error| {
            let offset = error.span().start;
            match error.found() {
                Some(found) => format!("unexpected '{}' at offset {}", found, offset),
                None => format!("unexpected end of pattern at offset {}", offset),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\r\n").repeated().ignored()
}

fn name_char<'src>() -> impl Parser<'src, &'src str, char, Extra<'src>> + Clone {
    any().filter(|c: &char| c.is_alphanumeric() || *c == '-' || *c == '_')
}

/// Name characters in any order (ids may start with a digit)
fn name<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    name_char().repeated().at_least(1).collect::<String>()
}

/// Identifier: must not start with a digit
fn identifier<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphabetic() || *c == '-' || *c == '_')
        .then(name_char().repeated().collect::<String>())
        .map(|(first, rest)| {
            let mut ident = String::with_capacity(rest.len() + 1);
            ident.push(first);
            ident.push_str(&rest);
            ident
        })
}

fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    none_of(quote)
        .repeated()
        .collect::<String>()
        .delimited_by(just(quote), just(quote))
}

fn attribute<'src>() -> impl Parser<'src, &'src str, SimpleSelector, Extra<'src>> + Clone {
    let op = choice((
        just("~=").to(AttrOp::Includes),
        just("^=").to(AttrOp::Prefix),
        just("$=").to(AttrOp::Suffix),
        just("*=").to(AttrOp::Substring),
        just("|=").to(AttrOp::DashMatch),
        just('=').to(AttrOp::Equals),
    ));
    let value = quoted('"').or(quoted('\'')).or(name());

    identifier()
        .then(op.padded_by(whitespace()).then(value).or_not())
        .padded_by(whitespace())
        .delimited_by(just('['), just(']'))
        .map(|(name, test)| SimpleSelector::Attribute { name, test })
}

fn compound<'src>() -> impl Parser<'src, &'src str, Compound, Extra<'src>> + Clone {
    let id = just('#').ignore_then(name()).map(SimpleSelector::Id);
    let class = just('.').ignore_then(identifier()).map(SimpleSelector::Class);
    let subclass = choice((id, class, attribute()));

    let element = identifier()
        .map(SimpleSelector::Type)
        .or(just('*').to(SimpleSelector::Universal));

    let with_element = element
        .then(subclass.clone().repeated().collect::<Vec<_>>())
        .map(|(first, mut rest)| {
            rest.insert(0, first);
            rest
        });
    let bare = subclass.repeated().at_least(1).collect::<Vec<_>>();

    with_element.or(bare).map(|parts| Compound { parts })
}

fn combinator<'src>() -> impl Parser<'src, &'src str, Combinator, Extra<'src>> + Clone {
    let child = just('>').padded_by(whitespace()).to(Combinator::Child);
    let descendant = one_of(" \t\r\n")
        .repeated()
        .at_least(1)
        .to(Combinator::Descendant);
    child.or(descendant)
}

fn selector_list<'src>() -> impl Parser<'src, &'src str, Vec<ComplexSelector>, Extra<'src>> {
    let complex = compound()
        .then(combinator().then(compound()).repeated().collect::<Vec<_>>())
        .map(|(first, rest)| ComplexSelector::new(first, rest));

    complex
        .padded_by(whitespace())
        .separated_by(just(','))
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(end())
}
