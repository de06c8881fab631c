use super::ApiError;
use super::types::{CredentialsForm, DashboardForm};
use crate::domain::Symbol;
use crate::services::PositionRequest;

const POSITION_REQUIRED: &str = "Symbol, shares, and average price are required";

/// Treats absent and blank fields alike.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn validate_symbol(raw: Option<&str>) -> Result<Symbol, ApiError> {
    raw.unwrap_or_default()
        .parse::<Symbol>()
        .map_err(|e| ApiError::validation(e.to_string()))
}

/// Parses a strictly positive, finite decimal.
fn positive_amount(raw: Option<&str>) -> Option<f64> {
    non_empty(raw)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn optional_text(raw: Option<&str>) -> Option<String> {
    non_empty(raw).map(|v| v.trim().to_string())
}

pub fn validate_position(form: &DashboardForm) -> Result<PositionRequest, ApiError> {
    if non_empty(form.symbol.as_deref()).is_none() {
        return Err(ApiError::validation(POSITION_REQUIRED));
    }
    let symbol = validate_symbol(form.symbol.as_deref())?;

    let (Some(shares), Some(avg_price)) = (
        positive_amount(form.shares.as_deref()),
        positive_amount(form.avg_price.as_deref()),
    ) else {
        return Err(ApiError::validation(POSITION_REQUIRED));
    };

    Ok(PositionRequest {
        symbol,
        shares,
        avg_price,
        company_name: optional_text(form.company_name.as_deref()),
        notes: optional_text(form.notes.as_deref()),
    })
}

pub fn validate_position_id(raw: Option<&str>) -> Result<i32, ApiError> {
    let raw = non_empty(raw).ok_or_else(|| ApiError::validation("Portfolio ID is required"))?;

    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(format!(
            "Invalid portfolio ID: {}. ID must be a positive integer",
            raw.trim()
        ))),
    }
}

pub fn validate_login(form: &CredentialsForm) -> Result<(String, String), ApiError> {
    match (
        non_empty(form.email.as_deref()),
        non_empty(form.password.as_deref()),
    ) {
        (Some(email), Some(_)) => Ok((
            email.trim().to_string(),
            form.password.clone().unwrap_or_default(),
        )),
        _ => Err(ApiError::validation("Email and password are required")),
    }
}

pub fn validate_registration(
    form: &CredentialsForm,
) -> Result<(String, String, String), ApiError> {
    match (
        non_empty(form.email.as_deref()),
        non_empty(form.username.as_deref()),
        non_empty(form.password.as_deref()),
    ) {
        (Some(email), Some(username), Some(_)) => Ok((
            email.trim().to_string(),
            username.trim().to_string(),
            form.password.clone().unwrap_or_default(),
        )),
        _ => Err(ApiError::validation("All fields are required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_form(symbol: &str, shares: &str, avg_price: &str) -> DashboardForm {
        DashboardForm {
            action: Some("add_to_portfolio".to_string()),
            symbol: Some(symbol.to_string()),
            shares: Some(shares.to_string()),
            avg_price: Some(avg_price.to_string()),
            ..DashboardForm::default()
        }
    }

    #[test]
    fn test_validate_symbol() {
        assert_eq!(validate_symbol(Some(" msft ")).unwrap().as_str(), "MSFT");
        assert!(validate_symbol(None).is_err());
        assert!(validate_symbol(Some("")).is_err());
        assert!(validate_symbol(Some("not a ticker")).is_err());
    }

    #[test]
    fn test_validate_position() {
        let position = validate_position(&position_form("aapl", "10", "150.25")).unwrap();
        assert_eq!(position.symbol.as_str(), "AAPL");
        assert!((position.shares - 10.0).abs() < f64::EPSILON);
        assert!(position.company_name.is_none());

        assert!(validate_position(&position_form("", "10", "150")).is_err());
        assert!(validate_position(&position_form("AAPL", "0", "150")).is_err());
        assert!(validate_position(&position_form("AAPL", "10", "-1")).is_err());
        assert!(validate_position(&position_form("AAPL", "ten", "150")).is_err());
        assert!(validate_position(&position_form("AAPL", "inf", "150")).is_err());
    }

    #[test]
    fn test_validate_position_id() {
        assert_eq!(validate_position_id(Some("12")).unwrap(), 12);
        assert!(validate_position_id(None).is_err());
        assert!(validate_position_id(Some(" ")).is_err());
        assert!(validate_position_id(Some("abc")).is_err());
        assert!(validate_position_id(Some("0")).is_err());
    }

    #[test]
    fn test_validate_credentials() {
        let form = CredentialsForm {
            email: Some("trader@example.com".to_string()),
            password: Some("Secret123".to_string()),
            ..CredentialsForm::default()
        };
        assert!(validate_login(&form).is_ok());
        assert!(validate_registration(&form).is_err());

        let empty = CredentialsForm::default();
        assert!(validate_login(&empty).is_err());
    }
}
