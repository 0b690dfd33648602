pub mod black_scholes;
pub mod heatmap;

/// European option variant. Selects which sign-flipped terms the engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Every way a pricing computation can be refused.
/// The engine never returns a partial result alongside one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    #[error("missing parameter: {0}")]
    Missing(&'static str),

    #[error("{field} is not a number: {value:?}")]
    Malformed { field: &'static str, value: String },

    #[error("{field} must be {requirement}, got {value}")]
    OutOfDomain {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

pub type ComputationResult<T> = Result<T, ComputationError>;

/// Raw pricing inputs as they arrive on the query string.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PricingParams {
    pub stock_price: Option<String>,
    pub strike_price: Option<String>,
    pub time_to_expiry: Option<String>,
    pub risk_free_rate: Option<String>,
    pub volatility: Option<String>,
}

/// Validated Black-Scholes-Merton inputs. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRequest {
    pub spot: f64,
    pub strike: f64,
    /// Years.
    pub time_to_expiry: f64,
    /// Continuously compounded, annualized decimal. May be negative.
    pub risk_free_rate: f64,
    /// Annualized decimal.
    pub volatility: f64,
    pub option_type: OptionType,
}

impl PricingRequest {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> ComputationResult<Self> {
        let req = Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            volatility,
            option_type,
        };
        req.validate()?;
        Ok(req)
    }

    /// Domain checks: ln(S/K) and the division by sigma*sqrt(T) must be defined.
    pub fn validate(&self) -> ComputationResult<()> {
        require_positive("stock_price", self.spot)?;
        require_positive("strike_price", self.strike)?;
        require_positive("time_to_expiry", self.time_to_expiry)?;
        require_finite("risk_free_rate", self.risk_free_rate)?;
        require_positive("volatility", self.volatility)
    }

    /// Parse and validate the five transport fields.
    pub fn from_params(params: &PricingParams, option_type: OptionType) -> ComputationResult<Self> {
        Self::new(
            parse_field("stock_price", params.stock_price.as_deref())?,
            parse_field("strike_price", params.strike_price.as_deref())?,
            parse_field("time_to_expiry", params.time_to_expiry.as_deref())?,
            parse_field("risk_free_rate", params.risk_free_rate.as_deref())?,
            parse_field("volatility", params.volatility.as_deref())?,
            option_type,
        )
    }

    /// Same inputs, different variant.
    #[inline]
    pub fn with_option_type(self, option_type: OptionType) -> Self {
        Self { option_type, ..self }
    }
}

/// First- and second-order sensitivities, each rounded to 4 decimals.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    /// Per calendar day.
    pub theta: f64,
    /// Per 1 percentage point of volatility.
    pub vega: f64,
    /// Per 1 percentage point of rate.
    pub rho: f64,
}

/// Risk-neutral probabilities, each rounded to 4 decimals.
/// Puts carry no `delta_prob`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Probabilities {
    pub in_the_money: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_prob: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PricingResult {
    pub option_type: OptionType,
    /// Rounded to 2 decimals.
    pub price: f64,
    pub greeks: Greeks,
    pub probabilities: Probabilities,
}

/// Round half away from zero to `places` decimal digits.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn parse_field(field: &'static str, raw: Option<&str>) -> ComputationResult<f64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ComputationError::Missing(field))?;

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ComputationError::Malformed {
            field,
            value: raw.to_string(),
        }),
    }
}

fn require_finite(field: &'static str, value: f64) -> ComputationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ComputationError::OutOfDomain {
            field,
            requirement: "finite",
            value,
        })
    }
}

fn require_positive(field: &'static str, value: f64) -> ComputationResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ComputationError::OutOfDomain {
            field,
            requirement: "positive and finite",
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(s: &str, k: &str, t: &str, r: &str, v: &str) -> PricingParams {
        PricingParams {
            stock_price: Some(s.into()),
            strike_price: Some(k.into()),
            time_to_expiry: Some(t.into()),
            risk_free_rate: Some(r.into()),
            volatility: Some(v.into()),
        }
    }

    #[test]
    fn test_parses_valid_params() {
        let req = PricingRequest::from_params(&params("100", "95.5", "0.25", "-0.01", " 0.3 "), OptionType::Put)
            .expect("valid params");
        assert_eq!(req.spot, 100.0);
        assert_eq!(req.strike, 95.5);
        assert_eq!(req.time_to_expiry, 0.25);
        assert_eq!(req.risk_free_rate, -0.01);
        assert_eq!(req.volatility, 0.3);
        assert_eq!(req.option_type, OptionType::Put);
    }

    #[test]
    fn test_missing_and_blank_fields() {
        let mut p = params("100", "100", "1", "0.05", "0.2");
        p.volatility = None;
        assert_eq!(
            PricingRequest::from_params(&p, OptionType::Call),
            Err(ComputationError::Missing("volatility"))
        );

        let mut p = params("100", "100", "1", "0.05", "0.2");
        p.stock_price = Some("   ".into());
        assert_eq!(
            PricingRequest::from_params(&p, OptionType::Call),
            Err(ComputationError::Missing("stock_price"))
        );
    }

    #[test]
    fn test_non_numeric_fields() {
        for bad in ["abc", "NaN", "inf", "1.2.3"] {
            let err = PricingRequest::from_params(&params("100", bad, "1", "0.05", "0.2"), OptionType::Call)
                .unwrap_err();
            assert!(
                matches!(err, ComputationError::Malformed { field: "strike_price", .. }),
                "{bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_domain_rejection() {
        let cases = [
            ("0", "100", "1", "0.2", "stock_price"),
            ("100", "0", "1", "0.2", "strike_price"),
            ("100", "100", "0", "0.2", "time_to_expiry"),
            ("100", "100", "-1", "0.2", "time_to_expiry"),
            ("100", "100", "1", "0", "volatility"),
            ("100", "100", "1", "-0.2", "volatility"),
        ];
        for (s, k, t, v, field) in cases {
            let err = PricingRequest::from_params(&params(s, k, t, "0.05", v), OptionType::Call).unwrap_err();
            match err {
                ComputationError::OutOfDomain { field: f, .. } => assert_eq!(f, field),
                other => panic!("expected domain error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(10.450583, 2), 10.45);
        assert_eq!(round_to(0.636831, 4), 0.6368);
        assert_eq!(round_to(-0.363169, 4), -0.3632);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_put_probabilities_omit_delta_prob() {
        let p = Probabilities {
            in_the_money: 0.4404,
            delta_prob: None,
        };
        let json = serde_json::to_value(p).expect("serialize");
        assert_eq!(json, serde_json::json!({ "in_the_money": 0.4404 }));
    }
}
