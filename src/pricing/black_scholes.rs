use super::{
    round_to, ComputationResult, Greeks, OptionType, PricingRequest, PricingResult, Probabilities,
};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

const DAYS_PER_YEAR: f64 = 365.0;
/// Vega and rho are quoted per 1 percentage point.
const PERCENT: f64 = 100.0;

/// Closed-form Black-Scholes-Merton pricing for European options.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
///
/// Call = S*Phi(d1) - K*e^(-rT)*Phi(d2)
/// Put  = K*e^(-rT)*Phi(-d2) - S*Phi(-d1)
///
/// Holds nothing but the standard normal, so one instance can be shared
/// across any number of tasks.
#[derive(Debug, Clone)]
pub struct BlackScholesEngine {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

/// Intermediate terms common to both variants. Full precision.
#[derive(Debug, Clone, Copy)]
struct SharedTerms {
    d1: f64,
    d2: f64,
    sqrt_t: f64,
    /// e^(-rT)
    discount: f64,
    /// phi(d1)
    pdf_d1: f64,
}

impl BlackScholesEngine {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    /// Price the request and derive its Greeks and probabilities.
    /// Fails without a partial result if the inputs are outside the model's domain.
    pub fn price(&self, req: &PricingRequest) -> ComputationResult<PricingResult> {
        req.validate()?;

        let terms = self.shared_terms(req);
        let s = req.spot;
        let k = req.strike;
        let r = req.risk_free_rate;
        let t = req.time_to_expiry;
        let sigma = req.volatility;

        // +1 for calls, -1 for puts: put-call parity applied term by term.
        let sign = match req.option_type {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        };

        let cdf_d1 = self.normal.cdf(sign * terms.d1);
        let cdf_d2 = self.normal.cdf(sign * terms.d2);
        let discounted_strike = k * terms.discount;

        let price = sign * (s * cdf_d1 - discounted_strike * cdf_d2);
        let delta = sign * cdf_d1;
        let gamma = terms.pdf_d1 / (s * sigma * terms.sqrt_t);
        let theta = (-s * terms.pdf_d1 * sigma / (2.0 * terms.sqrt_t)
            - sign * r * discounted_strike * cdf_d2)
            / DAYS_PER_YEAR;
        let vega = s * terms.pdf_d1 * terms.sqrt_t / PERCENT;
        let rho = sign * discounted_strike * t * cdf_d2 / PERCENT;

        let delta_prob = match req.option_type {
            OptionType::Call => Some(round_to(cdf_d1, 4)),
            OptionType::Put => None,
        };

        Ok(PricingResult {
            option_type: req.option_type,
            price: round_to(price, 2),
            greeks: Greeks {
                delta: round_to(delta, 4),
                gamma: round_to(gamma, 4),
                theta: round_to(theta, 4),
                vega: round_to(vega, 4),
                rho: round_to(rho, 4),
            },
            probabilities: Probabilities {
                in_the_money: round_to(cdf_d2, 4),
                delta_prob,
            },
        })
    }

    #[inline]
    pub fn call(&self, req: &PricingRequest) -> ComputationResult<PricingResult> {
        self.price(&req.with_option_type(OptionType::Call))
    }

    #[inline]
    pub fn put(&self, req: &PricingRequest) -> ComputationResult<PricingResult> {
        self.price(&req.with_option_type(OptionType::Put))
    }

    #[inline]
    fn shared_terms(&self, req: &PricingRequest) -> SharedTerms {
        let sqrt_t = req.time_to_expiry.sqrt();
        let sigma_sqrt_t = req.volatility * sqrt_t;
        let d1 = ((req.spot / req.strike).ln()
            + (req.risk_free_rate + 0.5 * req.volatility * req.volatility) * req.time_to_expiry)
            / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;

        SharedTerms {
            d1,
            d2,
            sqrt_t,
            discount: (-req.risk_free_rate * req.time_to_expiry).exp(),
            pdf_d1: self.normal.pdf(d1),
        }
    }
}

impl Default for BlackScholesEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ComputationError;

    fn request(spot: f64, strike: f64, t: f64, r: f64, sigma: f64) -> PricingRequest {
        PricingRequest::new(spot, strike, t, r, sigma, OptionType::Call).expect("valid request")
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected} +/- {tol}, got {actual}"
        );
    }

    #[test]
    fn test_textbook_atm_call_and_put() {
        let engine = BlackScholesEngine::new();
        let req = request(100.0, 100.0, 1.0, 0.05, 0.20);

        let call = engine.call(&req).expect("call");
        assert_eq!(call.option_type, OptionType::Call);
        assert_eq!(call.price, 10.45);
        assert_eq!(call.greeks.delta, 0.6368);
        assert_close(call.greeks.gamma, 0.0188, 1e-4);
        assert_close(call.greeks.theta, -0.0176, 1e-4);
        assert_close(call.greeks.vega, 0.3752, 1e-4);
        assert_close(call.greeks.rho, 0.5323, 1e-4);
        assert_close(call.probabilities.in_the_money, 0.5596, 1e-4);
        assert_eq!(call.probabilities.delta_prob, Some(0.6368));

        let put = engine.put(&req).expect("put");
        assert_eq!(put.option_type, OptionType::Put);
        assert_eq!(put.price, 5.57);
        assert_eq!(put.greeks.delta, -0.3632);
        assert_close(put.greeks.theta, -0.0045, 1e-4);
        assert_close(put.greeks.rho, -0.4189, 1e-4);
        assert_close(put.probabilities.in_the_money, 0.4404, 1e-4);
        assert_eq!(put.probabilities.delta_prob, None);
    }

    #[test]
    fn test_put_call_parity() {
        let engine = BlackScholesEngine::new();
        let cases = [
            (100.0, 100.0, 1.0, 0.05, 0.20),
            (42.0, 40.0, 0.5, 0.10, 0.20),
            (250.0, 300.0, 2.0, -0.01, 0.45),
            (10.0, 7.5, 0.1, 0.0, 0.9),
        ];
        for (s, k, t, r, sigma) in cases {
            let req = request(s, k, t, r, sigma);
            let call = engine.call(&req).expect("call").price;
            let put = engine.put(&req).expect("put").price;
            let forward_gap = s - k * (-r * t).exp();
            // Prices are rounded to cents, so parity holds to within one cent.
            assert_close(call - put, forward_gap, 0.01 + 1e-6);
        }
    }

    #[test]
    fn test_put_call_parity_full_precision() {
        let engine = BlackScholesEngine::new();
        let req = request(87.0, 93.0, 0.75, 0.03, 0.35);
        let terms = engine.shared_terms(&req);
        let call = req.spot * engine.normal.cdf(terms.d1)
            - req.strike * terms.discount * engine.normal.cdf(terms.d2);
        let put = req.strike * terms.discount * engine.normal.cdf(-terms.d2)
            - req.spot * engine.normal.cdf(-terms.d1);
        assert_close(call - put, req.spot - req.strike * terms.discount, 1e-6);
    }

    #[test]
    fn test_delta_bounds() {
        let engine = BlackScholesEngine::new();
        for spot in [1.0, 50.0, 100.0, 150.0, 1000.0] {
            for sigma in [0.01, 0.2, 1.5] {
                let req = request(spot, 100.0, 0.5, 0.03, sigma);
                let call = engine.call(&req).expect("call").greeks.delta;
                let put = engine.put(&req).expect("put").greeks.delta;
                assert!((0.0..=1.0).contains(&call), "call delta {call}");
                assert!((-1.0..=0.0).contains(&put), "put delta {put}");
            }
        }
    }

    #[test]
    fn test_gamma_and_vega_match_across_variants() {
        let engine = BlackScholesEngine::new();
        let req = request(120.0, 100.0, 0.3, 0.02, 0.35);
        let call = engine.call(&req).expect("call");
        let put = engine.put(&req).expect("put");
        assert_eq!(call.greeks.gamma, put.greeks.gamma);
        assert_eq!(call.greeks.vega, put.greeks.vega);
    }

    #[test]
    fn test_monotone_in_spot() {
        let engine = BlackScholesEngine::new();
        let mut last_call = f64::NEG_INFINITY;
        let mut last_put = f64::INFINITY;
        for i in 1..=40 {
            let req = request(i as f64 * 5.0, 100.0, 1.0, 0.05, 0.25);
            let call = engine.call(&req).expect("call").price;
            let put = engine.put(&req).expect("put").price;
            assert!(call >= last_call, "call price fell at spot {}", i * 5);
            assert!(put <= last_put, "put price rose at spot {}", i * 5);
            last_call = call;
            last_put = put;
        }
    }

    #[test]
    fn test_at_the_money_zero_rate() {
        let engine = BlackScholesEngine::new();
        let req = request(100.0, 100.0, 0.5, 0.0, 0.3);
        let call = engine.call(&req).expect("call");
        let put = engine.put(&req).expect("put");
        assert_eq!(call.price, put.price);
    }

    #[test]
    fn test_boundary_rejection() {
        let engine = BlackScholesEngine::new();
        let valid = request(100.0, 100.0, 1.0, 0.05, 0.2);
        let bad = [
            PricingRequest { time_to_expiry: 0.0, ..valid },
            PricingRequest { volatility: 0.0, ..valid },
            PricingRequest { spot: 0.0, ..valid },
            PricingRequest { strike: 0.0, ..valid },
            PricingRequest { spot: f64::NAN, ..valid },
        ];
        for req in bad {
            for option_type in [OptionType::Call, OptionType::Put] {
                let err = engine.price(&req.with_option_type(option_type)).unwrap_err();
                assert!(matches!(err, ComputationError::OutOfDomain { .. }), "{req:?} gave {err:?}");
            }
        }
    }

    #[test]
    fn test_rounding_contract() {
        let engine = BlackScholesEngine::new();
        let req = request(73.31, 80.17, 0.42, 0.037, 0.283);
        for result in [engine.call(&req).expect("call"), engine.put(&req).expect("put")] {
            assert_eq!(round_to(result.price, 2), result.price);
            let g = result.greeks;
            for v in [g.delta, g.gamma, g.theta, g.vega, g.rho, result.probabilities.in_the_money] {
                assert_eq!(round_to(v, 4), v);
            }
        }
    }

    #[test]
    fn test_deep_itm_call_approaches_forward_intrinsic() {
        let engine = BlackScholesEngine::new();
        let req = request(200.0, 100.0, 1.0, 0.05, 0.1);
        let call = engine.call(&req).expect("call");
        let intrinsic = 200.0 - 100.0 * (-0.05f64).exp();
        assert_close(call.price, intrinsic, 0.01);
        assert_eq!(call.greeks.delta, 1.0);
        assert_eq!(call.probabilities.in_the_money, 1.0);
    }
}
