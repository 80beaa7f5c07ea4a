use serde::{Deserialize, Serialize};

/// Result of one scoring pass. Recomputed from scratch every time, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsAnalysis {
    /// 0 – 100
    pub score: u8,
    /// Matched dictionary/selected keywords in discovery order, at most 15.
    pub keywords: Vec<String>,
    pub suggestions: Vec<String>,
    /// Job-description terms absent from the resume, at most 10.
    pub missing_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsWork,
}

impl AtsAnalysis {
    pub fn band(&self) -> ScoreBand {
        match self.score {
            s if s >= 80 => ScoreBand::Excellent,
            s if s >= 60 => ScoreBand::Good,
            _ => ScoreBand::NeedsWork,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_score(score: u8) -> AtsAnalysis {
        AtsAnalysis {
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(with_score(80).band(), ScoreBand::Excellent);
        assert_eq!(with_score(79).band(), ScoreBand::Good);
        assert_eq!(with_score(60).band(), ScoreBand::Good);
        assert_eq!(with_score(59).band(), ScoreBand::NeedsWork);
        assert_eq!(with_score(0).band(), ScoreBand::NeedsWork);
    }

    #[test]
    fn test_serializes_missing_keywords_camel_case() {
        let json = serde_json::to_value(with_score(10)).unwrap();
        assert!(json.get("missingKeywords").is_some());
        assert_eq!(json["score"], 10);
    }
}
