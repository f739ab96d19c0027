use crate::errors::{Result, UserFacingError};

/// Evaluates an arithmetic expression, rejecting results that aren't finite numbers
pub(super) fn evaluate(expression: &str) -> Result<f64> {
    match meval::eval_str(expression) {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(value) => {
            tracing::debug!("Expression '{expression}' evaluated to {value}");
            Err(UserFacingError::InvalidExpression.into())
        }
        Err(err) => {
            tracing::debug!("Couldn't evaluate '{expression}': {err}");
            Err(UserFacingError::InvalidExpression.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(1 + 2) / 4").unwrap(), 0.75);
        assert_eq!(evaluate("-(3 - 5)").unwrap(), 2.0);
    }

    #[test]
    fn test_evaluate_invalid() {
        for expression in ["2 +", "1 / 0", "()", "4 ) ("] {
            assert!(
                matches!(
                    evaluate(expression),
                    Err(AppError::UserFacing(UserFacingError::InvalidExpression))
                ),
                "{expression} should be invalid"
            );
        }
    }
}
