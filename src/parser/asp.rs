//! Parser for the restricted ASP rule language (spec §6 source-AST boundary).
//!
//! Mirrors `clausy`'s `parser::model` idiom (a `pest`-derived grammar plus a
//! `parse_pair`/`parse_children` tree walk), but the tree is walked into
//! [crate::source] nodes rather than directly into a formula representation,
//! since here the walk feeds the rule translator (§4.3), not a solver.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::Location;
use crate::source::{
    AggregateElement, BinaryOperator, BodyLiteral, External, HeadLiteral, Literal, Rule as SourceRule, ShowSignature,
    Sign, Statement, Symbol, Term, UnaryOperator,
};
use crate::source::ComparisonOperator;

#[derive(Parser)]
#[grammar = "parser/asp.pest"]
struct AspParser;

fn location(file_name: &str, pair: &Pair<Rule>) -> Location {
    let span = pair.as_span();
    let (line_start, col_start) = span.start_pos().line_col();
    let (line_end, col_end) = span.end_pos().line_col();
    Location { file: file_name.to_string(), line_start, col_start, line_end, col_end }
}

/// Parses a whole program into its top-level statements.
pub(crate) fn parse_program(content: &str, file_name: &str) -> Result<Vec<Statement>, String> {
    let mut pairs = AspParser::parse(Rule::program, content).map_err(|e| e.to_string())?;
    let program = pairs.next().expect("program rule always produces exactly one pair");

    let mut statements = Vec::new();
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::show_directive => statements.push(Statement::Show(parse_signature_directive(pair, file_name))),
            Rule::external_directive => {
                let signature = parse_signature_directive(pair, file_name);
                statements.push(Statement::External(External {
                    name: signature.name,
                    arity: signature.arity,
                    location: signature.location,
                }));
            }
            Rule::rule => statements.push(Statement::Rule(parse_rule(pair, file_name))),
            Rule::EOI => (),
            _ => unreachable!("unexpected top-level pair {:?}", pair.as_rule()),
        }
    }
    Ok(statements)
}

fn parse_signature_directive(pair: Pair<Rule>, file_name: &str) -> ShowSignature {
    let loc = location(file_name, &pair);
    let signature = pair.into_inner().next().expect("directive always carries a signature");
    let mut inner = signature.into_inner();
    let name = inner.next().expect("signature has a name").as_str().to_string();
    let arity: usize = inner.next().expect("signature has an arity").as_str().parse().expect("arity is a number");
    ShowSignature { name, arity, location: loc }
}

fn parse_rule(pair: Pair<Rule>, file_name: &str) -> SourceRule {
    let loc = location(file_name, &pair);
    let mut head = None;
    let mut body = Vec::new();
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::head => head = Some(parse_head(child, file_name)),
            Rule::body => body = parse_body(child, file_name),
            _ => unreachable!("unexpected child of rule: {:?}", child.as_rule()),
        }
    }
    SourceRule { head, body, location: loc }
}

fn parse_head(pair: Pair<Rule>, file_name: &str) -> HeadLiteral {
    let inner = pair.into_inner().next().expect("head always wraps a disjunction or choice");
    match inner.as_rule() {
        Rule::disjunction_head => parse_disjunction_head(inner, file_name),
        Rule::choice_head => parse_choice_head(inner, file_name),
        _ => unreachable!("unexpected head shape: {:?}", inner.as_rule()),
    }
}

fn parse_disjunction_head(pair: Pair<Rule>, file_name: &str) -> HeadLiteral {
    let mut atoms: Vec<HeadLiteral> = pair.into_inner().map(|atom| parse_atom_as_head_literal(atom, file_name)).collect();
    if atoms.len() == 1 {
        atoms.remove(0)
    } else {
        HeadLiteral::Disjunction(atoms)
    }
}

fn parse_atom_as_head_literal(pair: Pair<Rule>, file_name: &str) -> HeadLiteral {
    let loc = location(file_name, &pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("atom has a name").as_str().to_string();
    let args = inner.next().map(|list| parse_term_list(list, file_name)).unwrap_or_default();
    HeadLiteral::Literal { name, args, location: loc }
}

fn parse_choice_head(pair: Pair<Rule>, file_name: &str) -> HeadLiteral {
    let loc = location(file_name, &pair);
    let elements = pair.into_inner().map(|element| parse_choice_element(element, file_name)).collect();
    HeadLiteral::Aggregate { lower_guard: None, elements, upper_guard: None, location: loc }
}

fn parse_choice_element(pair: Pair<Rule>, file_name: &str) -> AggregateElement {
    let mut inner = pair.into_inner();
    let name = inner.next().expect("choice element has a name").as_str().to_string();
    let mut args = Vec::new();
    let mut condition = Vec::new();
    for child in inner {
        match child.as_rule() {
            Rule::term_list => args = parse_term_list(child, file_name),
            Rule::body_literal => condition.push(parse_body_literal(child, file_name)),
            _ => unreachable!("unexpected child of choice_element: {:?}", child.as_rule()),
        }
    }
    AggregateElement { name, args, condition }
}

fn parse_body(pair: Pair<Rule>, file_name: &str) -> Vec<BodyLiteral> {
    pair.into_inner().map(|literal| parse_body_literal(literal, file_name)).collect()
}

fn parse_body_literal(pair: Pair<Rule>, file_name: &str) -> BodyLiteral {
    let loc = location(file_name, &pair);
    let mut inner = pair.into_inner();
    let sign_pair = inner.next().expect("body_literal always has a sign, even if empty");
    let sign = parse_sign(sign_pair);
    let literal_pair = inner.next().expect("body_literal always has an inner literal");
    let literal = match literal_pair.as_rule() {
        Rule::comparison => parse_comparison(literal_pair, file_name),
        Rule::boolean_literal => Literal::Boolean(literal_pair.as_str() == "#true"),
        Rule::atom => {
            let mut atom_inner = literal_pair.into_inner();
            let name = atom_inner.next().expect("atom has a name").as_str().to_string();
            let args = atom_inner.next().map(|list| parse_term_list(list, file_name)).unwrap_or_default();
            Literal::Predicate { name, args }
        }
        _ => unreachable!("unexpected body literal shape: {:?}", literal_pair.as_rule()),
    };
    BodyLiteral { sign, literal, location: loc }
}

fn parse_sign(pair: Pair<Rule>) -> Sign {
    match pair.as_str().split_whitespace().count() {
        0 => Sign::None,
        1 => Sign::Negation,
        _ => Sign::DoubleNegation,
    }
}

fn parse_comparison(pair: Pair<Rule>, file_name: &str) -> Literal {
    let mut inner = pair.into_inner();
    let left = parse_term(inner.next().expect("comparison has a left term"), file_name);
    let operator = parse_comparison_operator(inner.next().expect("comparison has an operator"));
    let right = parse_term(inner.next().expect("comparison has a right term"), file_name);
    Literal::Comparison(operator, left, right)
}

fn parse_comparison_operator(pair: Pair<Rule>) -> ComparisonOperator {
    match pair.as_str() {
        "=" => ComparisonOperator::Equal,
        "!=" => ComparisonOperator::NotEqual,
        "<" => ComparisonOperator::Less,
        "<=" => ComparisonOperator::LessEqual,
        ">" => ComparisonOperator::Greater,
        ">=" => ComparisonOperator::GreaterEqual,
        other => unreachable!("unexpected comparison operator: {other}"),
    }
}

fn parse_term_list(pair: Pair<Rule>, file_name: &str) -> Vec<Term> {
    pair.into_inner().map(|term| parse_term(term, file_name)).collect()
}

fn parse_term(pair: Pair<Rule>, file_name: &str) -> Term {
    let mut inner = pair.into_inner();
    let additive = parse_additive_term(inner.next().expect("term always has an additive_term"), file_name);
    match inner.next() {
        Some(to) => Term::Interval(Box::new(additive), Box::new(parse_additive_term(to, file_name))),
        None => additive,
    }
}

fn parse_additive_term(pair: Pair<Rule>, file_name: &str) -> Term {
    let mut inner = pair.into_inner();
    let mut acc = parse_multiplicative_term(inner.next().expect("additive_term has at least one operand"), file_name);
    loop {
        let Some(operator_pair) = inner.next() else { break };
        let operator = match operator_pair.as_str() {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            other => unreachable!("unexpected additive operator: {other}"),
        };
        let rhs = parse_multiplicative_term(inner.next().expect("additive operator has a right operand"), file_name);
        acc = Term::BinaryOperation(operator, Box::new(acc), Box::new(rhs));
    }
    acc
}

fn parse_multiplicative_term(pair: Pair<Rule>, file_name: &str) -> Term {
    let mut inner = pair.into_inner();
    let mut acc = parse_unary_term(inner.next().expect("multiplicative_term has at least one operand"), file_name);
    loop {
        let Some(operator_pair) = inner.next() else { break };
        let operator = match operator_pair.as_str() {
            "**" => BinaryOperator::Power,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "\\" => BinaryOperator::Modulo,
            other => unreachable!("unexpected multiplicative operator: {other}"),
        };
        let rhs = parse_unary_term(inner.next().expect("multiplicative operator has a right operand"), file_name);
        acc = Term::BinaryOperation(operator, Box::new(acc), Box::new(rhs));
    }
    acc
}

fn parse_unary_term(pair: Pair<Rule>, file_name: &str) -> Term {
    if pair.as_str().starts_with('-') {
        let inner = pair.into_inner().next().expect("negated unary_term wraps another unary_term");
        Term::UnaryOperation(UnaryOperator::Minus, Box::new(parse_unary_term(inner, file_name)))
    } else {
        parse_primary_term(pair.into_inner().next().expect("unary_term falls through to a primary_term"), file_name)
    }
}

fn parse_primary_term(pair: Pair<Rule>, file_name: &str) -> Term {
    let pair = if pair.as_rule() == Rule::primary_term {
        pair.into_inner().next().expect("primary_term always wraps exactly one alternative")
    } else {
        pair
    };
    match pair.as_rule() {
        Rule::term => parse_term(pair, file_name),
        Rule::absolute_value_term => {
            let inner = pair.into_inner().next().expect("absolute_value_term wraps a term");
            Term::UnaryOperation(UnaryOperator::AbsoluteValue, Box::new(parse_term(inner, file_name)))
        }
        Rule::pool => Term::Pool(pair.into_inner().map(|p| parse_primary_term(p, file_name)).collect()),
        Rule::function_term => parse_function_term(pair, file_name),
        Rule::variable => Term::Variable(pair.as_str().to_string()),
        Rule::number => Term::Symbol(Symbol::Number(pair.as_str().parse().expect("number token is a valid i64"))),
        Rule::string => {
            let raw = pair.as_str();
            Term::Symbol(Symbol::String(raw[1..raw.len() - 1].to_string()))
        }
        Rule::special_integer => match pair.as_str() {
            "#inf" => Term::Symbol(Symbol::Infimum),
            "#sup" => Term::Symbol(Symbol::Supremum),
            other => unreachable!("unexpected special integer: {other}"),
        },
        _ => unreachable!("unexpected primary_term shape: {:?}", pair.as_rule()),
    }
}

fn parse_function_term(pair: Pair<Rule>, file_name: &str) -> Term {
    let mut external = false;
    let mut name = None;
    let mut args = Vec::new();
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::external_marker => external = true,
            Rule::identifier => name = Some(child.as_str().to_string()),
            Rule::term_list => args = parse_term_list(child, file_name),
            _ => unreachable!("unexpected child of function_term: {:?}", child.as_rule()),
        }
    }
    let name = name.expect("function_term always carries a name");
    if args.is_empty() && !external {
        Term::Symbol(Symbol::Function(name))
    } else {
        Term::Function(name, args, external)
    }
}
