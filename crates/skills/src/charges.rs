//! Criminal charge extraction from case text.
//!
//! Besides the skill itself this module converts the extracted `charges`
//! metadata into typed [`Charge`] records for pleading assembly. That
//! conversion is best-effort: unrecognized class strings fall back to the
//! lowest tier of their kind rather than being rejected.

use crate::parse::{self, FallbackPolicy};
use lexskill_core::{Classification, Skill, SkillConfig, SkillResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

pub const NAME: &str = "charge_extraction";

pub const UNCERTAIN_REASON: &str = "Charge extraction uncertain";

const FALLBACK: FallbackPolicy = FallbackPolicy {
    classification: Classification::Red,
    missing_summary: "Failed to parse charge extraction response",
    invalid_summary: "Invalid JSON in response",
    reason: "AI response parsing failed",
};

/// Offense class, most serious first within each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeClass {
    FelonyA,
    FelonyB,
    FelonyC,
    FelonyD,
    FelonyE,
    MisdemeanorA,
    MisdemeanorB,
    MisdemeanorC,
    MisdemeanorD,
    Infraction,
}

impl ChargeClass {
    /// Map a free-text class such as "Class B Felony".
    ///
    /// Case-insensitive substring match on "felony"/"misdemeanor", then on
    /// "class a".."class d". A felony with no recognized letter is Class E,
    /// a misdemeanor Class D; anything else is an infraction.
    pub fn from_label(label: &str) -> Self {
        let s = label.to_lowercase();
        if s.contains("felony") {
            if s.contains("class a") {
                Self::FelonyA
            } else if s.contains("class b") {
                Self::FelonyB
            } else if s.contains("class c") {
                Self::FelonyC
            } else if s.contains("class d") {
                Self::FelonyD
            } else {
                Self::FelonyE
            }
        } else if s.contains("misdemeanor") {
            if s.contains("class a") {
                Self::MisdemeanorA
            } else if s.contains("class b") {
                Self::MisdemeanorB
            } else if s.contains("class c") {
                Self::MisdemeanorC
            } else {
                Self::MisdemeanorD
            }
        } else {
            Self::Infraction
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FelonyA => "Class A Felony",
            Self::FelonyB => "Class B Felony",
            Self::FelonyC => "Class C Felony",
            Self::FelonyD => "Class D Felony",
            Self::FelonyE => "Class E Felony",
            Self::MisdemeanorA => "Class A Misdemeanor",
            Self::MisdemeanorB => "Class B Misdemeanor",
            Self::MisdemeanorC => "Class C Misdemeanor",
            Self::MisdemeanorD => "Class D Misdemeanor",
            Self::Infraction => "Infraction",
        }
    }

    pub fn is_felony(&self) -> bool {
        matches!(
            self,
            Self::FelonyA | Self::FelonyB | Self::FelonyC | Self::FelonyD | Self::FelonyE
        )
    }
}

impl fmt::Display for ChargeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One count, ready for a pleading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub count_number: u32,
    pub description: String,
    pub classification: ChargeClass,
    pub statute: Option<String>,
}

/// Convert the `charges` metadata of an extraction result into records.
///
/// Entries that are not objects are skipped. A missing count number is the
/// entry's position among converted charges, 1-based.
pub fn charges_from_result(result: &SkillResult) -> Vec<Charge> {
    let Some(entries) = result.meta("charges").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut charges: Vec<Charge> = Vec::with_capacity(entries.len());
    for entry in entries.iter().filter_map(Value::as_object) {
        let count_number = entry
            .get("count_number")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(charges.len() as u32 + 1);
        charges.push(Charge {
            count_number,
            description: parse::opt_str_field(entry, "description")
                .unwrap_or_else(|| "Unknown charge".into()),
            classification: ChargeClass::from_label(&parse::str_field(entry, "classification")),
            statute: parse::opt_str_field(entry, "statute"),
        });
    }
    charges
}

pub struct ChargeExtractionSkill {
    config: SkillConfig,
}

impl ChargeExtractionSkill {
    pub fn new() -> Self {
        Self {
            config: SkillConfig::new(NAME, "Extract criminal charges from case text").with_max_tokens(2048),
        }
    }
}

impl Default for ChargeExtractionSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl Skill for ChargeExtractionSkill {
    fn config(&self) -> &SkillConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SkillConfig {
        &mut self.config
    }

    fn system_prompt(&self) -> String {
        format!(
            r#"You are a legal document analyst specializing in Missouri criminal law.
You extract structured charge information from case descriptions, police reports,
and other legal documents.

{disclaimer}

## Missouri Charge Classification Reference

**Felonies (most to least serious):**
- Class A Felony: Murder, severe violent crimes
- Class B Felony: Serious violent crimes, major drug distribution
- Class C Felony: Significant crimes (assault, drug delivery)
- Class D Felony: Mid-level crimes (theft over threshold, some drug offenses)
- Class E Felony: Lower-level felonies (some property crimes)

**Misdemeanors:**
- Class A Misdemeanor: Most serious (DWI, assault 4th degree)
- Class B Misdemeanor: Mid-level (minor theft, trespass)
- Class C Misdemeanor: Minor offenses
- Class D Misdemeanor: Least serious

**Infractions:** Traffic violations, minor ordinance violations

## Common Missouri Charges

| Charge | Classification | Statute |
|--------|---------------|---------|
| DWI (1st offense) | Class B Misdemeanor | RSMo 577.010 |
| DWI (2nd offense) | Class A Misdemeanor | RSMo 577.010 |
| DWI (Chronic offender) | Class E Felony | RSMo 577.010 |
| Driving While Revoked | Class D Felony | RSMo 302.321 |
| Possession of Controlled Substance | Class D Felony | RSMo 579.015 |
| Delivery of Controlled Substance | Class C Felony | RSMo 579.020 |
| Unlawful Possession of Firearm | Class D Felony | RSMo 571.070 |
| Tampering with Physical Evidence | Class A Misdemeanor | RSMo 575.100 |
| Assault 4th Degree | Class A Misdemeanor | RSMo 565.056 |
| Stealing | Class A/B/C/D (by value) | RSMo 570.030 |

## Extraction Process

1. **Identify all charges** mentioned in the text
2. **Determine classification** based on statute reference or charge description
3. **Extract statutory reference** if provided (RSMo section)
4. **Number the counts** in order of appearance or severity
5. **Flag uncertainties** when classification is unclear

{escalation}
## Output Format

Respond with a JSON object:
```json
{{
  "charges": [
    {{
      "count_number": 1,
      "description": "Full charge description as it should appear in pleading",
      "short_description": "Brief name for the charge",
      "classification": "Class X Felony|Class X Misdemeanor|Infraction",
      "statute": "RSMo XXX.XXX or null if unknown",
      "confidence": "high|medium|low",
      "notes": "Any special notes about this charge"
    }}
  ],
  "extraction_notes": "Any overall notes about the extraction",
  "uncertainties": ["List of anything that needs human verification"],
  "classification": "GREEN|YELLOW|RED"
}}
```

## Classification Rules

**GREEN**: All charges clearly identified with high confidence
**YELLOW**: Some charges have medium confidence or missing statute references
**RED**: Unable to determine charges or significant uncertainty
"#,
            disclaimer = self.config.disclaimer(),
            escalation = self.config.escalation_section("extraction", &[]),
        )
    }

    fn parse_response(&self, response: &str) -> SkillResult {
        parse::parse_with(NAME, response, &FALLBACK, |data| {
            let classification =
                parse::classification_field(data, "classification", Classification::Yellow)?;

            let mut result = SkillResult::new(classification);
            result.summary = parse::str_field(data, "extraction_notes");
            result.issues = parse::array_field(data, "uncertainties")
                .into_iter()
                .map(|u| json!({ "uncertainty": u }))
                .collect();
            if classification == Classification::Red {
                result.escalate(UNCERTAIN_REASON);
            }
            result
                .metadata
                .insert("charges".into(), Value::Array(parse::array_field(data, "charges")));
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_mapping_fallbacks() {
        assert_eq!(ChargeClass::from_label("Felony"), ChargeClass::FelonyE);
        assert_eq!(ChargeClass::from_label("Class B Felony"), ChargeClass::FelonyB);
        assert_eq!(ChargeClass::from_label("class a felony"), ChargeClass::FelonyA);
        assert_eq!(ChargeClass::from_label("CLASS D FELONY"), ChargeClass::FelonyD);
        assert_eq!(ChargeClass::from_label("Class A Misdemeanor"), ChargeClass::MisdemeanorA);
        assert_eq!(ChargeClass::from_label("misdemeanor"), ChargeClass::MisdemeanorD);
        assert_eq!(ChargeClass::from_label("Class D Misdemeanor"), ChargeClass::MisdemeanorD);
        assert_eq!(ChargeClass::from_label("Infraction"), ChargeClass::Infraction);
        assert_eq!(ChargeClass::from_label(""), ChargeClass::Infraction);
        assert_eq!(ChargeClass::from_label("Class A/B/C/D (by value)"), ChargeClass::Infraction);
    }

    #[test]
    fn labels() {
        assert_eq!(ChargeClass::FelonyE.to_string(), "Class E Felony");
        assert_eq!(ChargeClass::MisdemeanorB.label(), "Class B Misdemeanor");
        assert!(ChargeClass::FelonyC.is_felony());
        assert!(!ChargeClass::Infraction.is_felony());
    }

    #[test]
    fn red_forces_escalation() {
        let result = ChargeExtractionSkill::new().parse_response(
            r#"{"charges": [], "extraction_notes": "Narrative too vague", "uncertainties": ["No statute cited"], "classification": "RED"}"#,
        );
        assert_eq!(result.classification, Classification::Red);
        assert!(result.escalation_required);
        assert_eq!(result.escalation_reason.as_deref(), Some(UNCERTAIN_REASON));
        assert_eq!(result.summary, "Narrative too vague");
        assert_eq!(result.issues, vec![json!({"uncertainty": "No statute cited"})]);
        assert!(result.recommendations.is_empty());
        assert!(result.score.is_none());
    }

    #[test]
    fn green_does_not_escalate() {
        let result = ChargeExtractionSkill::new()
            .parse_response(r#"{"charges": [], "classification": "GREEN", "escalation_required": true}"#);
        assert!(!result.escalation_required);
        assert!(result.escalation_reason.is_none());
    }

    #[test]
    fn unparseable_response_is_red() {
        let result = ChargeExtractionSkill::new().parse_response("Count 1: DWI");
        assert_eq!(result.classification, Classification::Red);
        assert_eq!(result.summary, "Failed to parse charge extraction response");
        assert_eq!(result.escalation_reason.as_deref(), Some("AI response parsing failed"));

        let result = ChargeExtractionSkill::new().parse_response("{charges: []}");
        assert_eq!(result.summary, "Invalid JSON in response");
        assert_eq!(result.classification, Classification::Red);
    }

    #[test]
    fn converts_charges_to_records() {
        let result = ChargeExtractionSkill::new().parse_response(
            r#"{
                "charges": [
                    {"count_number": 1, "description": "Driving While Intoxicated", "classification": "Class B Misdemeanor", "statute": "RSMo 577.010"},
                    {"description": "Driving While Revoked", "classification": "Felony"},
                    "not an object",
                    {"classification": "infraction", "statute": null}
                ],
                "classification": "YELLOW"
            }"#,
        );
        let charges = charges_from_result(&result);
        assert_eq!(charges.len(), 3);

        assert_eq!(charges[0].count_number, 1);
        assert_eq!(charges[0].classification, ChargeClass::MisdemeanorB);
        assert_eq!(charges[0].statute.as_deref(), Some("RSMo 577.010"));

        assert_eq!(charges[1].count_number, 2);
        assert_eq!(charges[1].classification, ChargeClass::FelonyE);
        assert!(charges[1].statute.is_none());

        assert_eq!(charges[2].count_number, 3);
        assert_eq!(charges[2].description, "Unknown charge");
        assert_eq!(charges[2].classification, ChargeClass::Infraction);
    }

    #[test]
    fn no_charges_metadata() {
        let result = SkillResult::new(Classification::Green);
        assert!(charges_from_result(&result).is_empty());
    }
}
