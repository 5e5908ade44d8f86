//! Formula declarations: `effect ~ cause1 + cause2`

use crate::error::FormulaError;

/// One parsed `effect ~ causes` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Left-hand side
    pub effect: String,
    /// Right-hand side terms, in written order
    pub causes: Vec<String>,
}

/// Parse a single formula
pub fn parse_formula(input: &str) -> Result<Relation, FormulaError> {
    let text = input.trim();
    let mut parts = text.split('~');
    let (Some(lhs), Some(rhs)) = (parts.next(), parts.next()) else {
        return Err(FormulaError::MissingTilde(text.to_string()));
    };
    if parts.next().is_some() {
        return Err(FormulaError::MultipleTildes(text.to_string()));
    }

    let effect = lhs.trim();
    if effect.is_empty() || effect.contains('+') || effect.split_whitespace().count() != 1 {
        return Err(FormulaError::BadEffect(text.to_string()));
    }

    let causes = rhs
        .split('+')
        .map(str::trim)
        .map(|term| {
            if term.is_empty() {
                Err(FormulaError::EmptyTerm(text.to_string()))
            } else {
                Ok(term.to_string())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Relation {
        effect: effect.to_string(),
        causes,
    })
}

/// Parse several formulas separated by newlines or `;`, skipping blank entries
pub fn parse_formulas(input: &str) -> Result<Vec<Relation>, FormulaError> {
    input
        .split(['\n', ';'])
        .filter(|line| !line.trim().is_empty())
        .map(parse_formula)
        .collect()
}
