// crates/kyc-verify/src/aggregator.rs
//
// Verdict aggregation for the KYC oracle.
//
// Combines one or two normalized source results into a single verdict:
//   final_verified = AND of every configured source
//   risk_score     = sum(floor(risk_i * weight_i)) then locality adjustment,
//                    clamped to [0, 100]
//   classification = truth table over (identity verified, financial verified)
//
// All trust policy lives in the constants below. Weights are integer
// percentages so the floor is exact.

use kyc_core::{
    Classification, CombinedVerdict, KycError, SourceKind, SourceResult, MAX_RISK_SCORE,
};

/// Weight of the identity source when both sources are configured.
pub const IDENTITY_WEIGHT_PERCENT: u32 = 40;

/// Weight of the financial source when both sources are configured.
pub const FINANCIAL_WEIGHT_PERCENT: u32 = 60;

/// Weight of the only source in a single-source configuration.
pub const SINGLE_SOURCE_WEIGHT_PERCENT: u32 = 100;

/// Subtracted from the weighted score for local residents.
pub const LOCAL_RESIDENT_DISCOUNT: u32 = 10;

/// Added to the weighted score when the subject is not known to be a local
/// resident (including when no identity source is configured).
pub const NON_RESIDENT_SURCHARGE: u32 = 15;

/// `floor(risk * weight_percent / 100)`.
pub fn weighted_score(risk_score: u8, weight_percent: u32) -> u32 {
    u32::from(risk_score) * weight_percent / 100
}

/// Apply the residency adjustment and clamp into `[0, 100]`.
pub fn apply_locality(score: u32, is_local_resident: bool) -> u8 {
    let adjusted = if is_local_resident {
        score.saturating_sub(LOCAL_RESIDENT_DISCOUNT)
    } else {
        score.saturating_add(NON_RESIDENT_SURCHARGE)
    };
    adjusted.min(u32::from(MAX_RISK_SCORE)) as u8
}

/// Two-source aggregation: identity is the first source, financial the second.
pub fn combine(identity: &SourceResult, financial: &SourceResult) -> Result<CombinedVerdict, KycError> {
    aggregate(&[identity.clone(), financial.clone()])
}

/// Single-source aggregation.
pub fn combine_single(result: &SourceResult) -> Result<CombinedVerdict, KycError> {
    aggregate(std::slice::from_ref(result))
}

/// Aggregate the results of every configured source, in any order.
///
/// Fails when no result is given, when a provider appears twice, when a
/// result's attributes do not match its provider, or when a risk score is
/// outside `[0, 100]`.
pub fn aggregate(results: &[SourceResult]) -> Result<CombinedVerdict, KycError> {
    let mut identity: Option<&SourceResult> = None;
    let mut financial: Option<&SourceResult> = None;

    for result in results {
        if result.risk_score > MAX_RISK_SCORE {
            return Err(KycError::Aggregation(format!(
                "{} source risk score {} exceeds {}",
                result.source, result.risk_score, MAX_RISK_SCORE
            )));
        }

        let slot = match result.source {
            SourceKind::Identity => {
                if result.identity().is_none() {
                    return Err(KycError::Aggregation(
                        "identity source result carries non-identity attributes".to_string(),
                    ));
                }
                &mut identity
            }
            SourceKind::Financial => {
                if result.financial().is_none() {
                    return Err(KycError::Aggregation(
                        "financial source result carries non-financial attributes".to_string(),
                    ));
                }
                &mut financial
            }
        };

        if slot.is_some() {
            return Err(KycError::Aggregation(format!(
                "duplicate result for {} source",
                result.source
            )));
        }
        *slot = Some(result);
    }

    let base = match (identity, financial) {
        (Some(id), Some(fin)) => {
            weighted_score(id.risk_score, IDENTITY_WEIGHT_PERCENT)
                + weighted_score(fin.risk_score, FINANCIAL_WEIGHT_PERCENT)
        }
        (Some(only), None) | (None, Some(only)) => {
            weighted_score(only.risk_score, SINGLE_SOURCE_WEIGHT_PERCENT)
        }
        (None, None) => {
            return Err(KycError::Aggregation(
                "no source results to aggregate".to_string(),
            ))
        }
    };

    let identity_attrs = identity.and_then(|r| r.identity()).cloned();
    let financial_attrs = financial.and_then(|r| r.financial()).cloned();

    let is_local_resident = identity_attrs
        .as_ref()
        .map(|attrs| attrs.is_local_resident)
        .unwrap_or(false);

    let identity_verified = identity.map(|r| r.verified);
    let financial_verified = financial.map(|r| r.verified);

    let final_verified =
        identity_verified.unwrap_or(true) && financial_verified.unwrap_or(true);

    let classification = Classification::from_flags(
        identity_verified.unwrap_or(false),
        financial_verified.unwrap_or(false),
    );

    Ok(CombinedVerdict {
        final_verified,
        risk_score: apply_locality(base, is_local_resident),
        identity_verified,
        financial_verified,
        classification,
        identity: identity_attrs,
        financial: financial_attrs,
        used_default: results.iter().any(|r| r.defaulted),
    })
}
