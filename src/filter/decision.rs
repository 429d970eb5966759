//! The `Decision` sum type replacing "exceptions as control flow" in the
//! confidence ladder (REDESIGN FLAGS). The conservative fold — reject on
//! `Uncertain` — happens once, at the pipeline boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decision {
    Viable(String),
    NotViable(String),
    Uncertain(i32, String),
}

#[derive(Debug, Clone)]
pub enum RejectionReason {
    HardExcluded(String),
    NotViable(String),
    LowConfidence(i32),
    Unavailable,
}

impl Decision {
    /// Applies the conservative policy: accept iff VIABLE with confidence
    /// ≥ 70; reject iff NOT_VIABLE with confidence ≥ 70; anything else is
    /// rejected as `LowConfidence`.
    pub fn fold(self) -> Result<(), RejectionReason> {
        match self {
            Decision::Viable(_) => Ok(()),
            Decision::NotViable(reason) => Err(RejectionReason::NotViable(reason)),
            Decision::Uncertain(confidence, _) => Err(RejectionReason::LowConfidence(confidence)),
        }
    }

    /// Parses the model's `DECISION=...\nCONFIDENCE=...\nREASON=...` reply.
    /// Anything unparseable is treated as `Uncertain(0, ..)` — conservative
    /// default per §4.6 step 3.
    pub fn parse(raw: &str) -> Decision {
        let mut decision = None;
        let mut confidence: i32 = 0;
        let mut reason = String::new();

        for line in raw.lines() {
            let line = line.trim();
            if let Some(value) = line.strip_prefix("DECISION=") {
                decision = Some(value.trim().to_uppercase());
            } else if let Some(value) = line.strip_prefix("CONFIDENCE=") {
                confidence = value.trim().parse().unwrap_or(0);
            } else if let Some(value) = line.strip_prefix("REASON=") {
                reason = value.trim().to_string();
            }
        }

        match decision.as_deref() {
            Some("VIABLE") if confidence >= 70 => Decision::Viable(reason),
            Some("NOT_VIABLE") if confidence >= 70 => Decision::NotViable(reason),
            _ => Decision::Uncertain(confidence, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_viable_high_confidence() {
        let raw = "DECISION=VIABLE\nCONFIDENCE=85\nREASON=clear B2B SaaS offering";
        let decision = Decision::parse(raw);
        assert!(matches!(decision, Decision::Viable(_)));
        assert!(decision.fold().is_ok());
    }

    #[test]
    fn low_confidence_defaults_to_conservative_rejection() {
        let raw = "DECISION=VIABLE\nCONFIDENCE=40\nREASON=unclear";
        let decision = Decision::parse(raw);
        match decision.fold() {
            Err(RejectionReason::LowConfidence(c)) => assert_eq!(c, 40),
            _ => panic!("expected LowConfidence rejection"),
        }
    }

    #[test]
    fn unparseable_reply_is_conservatively_uncertain() {
        let decision = Decision::parse("not a structured reply");
        assert!(decision.fold().is_err());
    }
}
