//! OpenAI implementation of the Ai trait.
//!
//! Uses the chat completions API with strict `json_schema` output for
//! both stages: a cheap model for the Stage-1 bulk screen and a
//! stronger one for the Stage-2 gate. Estimated spend is accumulated
//! across the run from returned token usage.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AiError, AiResult};
use crate::traits::ai::Ai;
use crate::types::card::JobCard;
use crate::types::decision::{CardProfile, GateDecision, ScreenDecision, WorkMode};
use crate::types::description::JobDescription;
use crate::types::preferences::Preferences;

/// Description text beyond this many characters is truncated before
/// prompting.
const MAX_JD_CHARS: usize = 12_000;

/// USD per 1M input/output tokens. Unknown models estimate as zero.
const PRICING: &[(&str, f64, f64)] = &[
    ("gpt-4.1-mini", 0.4, 1.6),
    ("gpt-5-mini", 0.25, 2.0),
];

/// OpenAI-backed language-model collaborator.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    screen_model: String,
    gate_model: String,
    base_url: String,
    spent_usd: Mutex<f64>,
}

impl OpenAiClient {
    /// Create a client with the given API key and default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            screen_model: "gpt-4.1-mini".to_string(),
            gate_model: "gpt-5-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            spent_usd: Mutex::new(0.0),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> AiResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| AiError::Api {
            status: 0,
            message: "OPENAI_API_KEY not set".to_string(),
        })?;
        Ok(Self::new(api_key))
    }

    /// Set the Stage-1 model (default: gpt-4.1-mini).
    pub fn with_screen_model(mut self, model: impl Into<String>) -> Self {
        self.screen_model = model.into();
        self
    }

    /// Set the Stage-2 model (default: gpt-5-mini).
    pub fn with_gate_model(mut self, model: impl Into<String>) -> Self {
        self.gate_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Verify the key against the models endpoint without spending
    /// tokens. Used by the CLI preflight.
    pub async fn verify_key(&self) -> AiResult<()> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(AiError::Api {
                status: response.status().as_u16(),
                message: "API key rejected".to_string(),
            });
        }
        Ok(())
    }

    /// Structured-output chat completion; returns the raw JSON text.
    async fn generate_structured(
        &self,
        model: &str,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> AiResult<String> {
        let request = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema,
                },
            },
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| AiError::SchemaViolation {
            reason: format!("unparseable completion envelope: {e}"),
        })?;

        if let Some(usage) = &chat.usage {
            self.record_usage(model, usage);
        }

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::SchemaViolation {
                reason: "completion carried no choices".to_string(),
            })
    }

    fn record_usage(&self, model: &str, usage: &Usage) {
        if let Some((_, input, output)) = PRICING.iter().find(|(m, _, _)| *m == model) {
            let cost = (usage.prompt_tokens as f64 / 1_000_000.0) * input
                + (usage.completion_tokens as f64 / 1_000_000.0) * output;
            *self.spent_usd.lock().unwrap() += cost;
        }
    }

    fn gate_rules(preferences: &Preferences) -> String {
        let mut rules = vec![
            "- If the role is not a full-time position: `isFit` = \"no\", `reason` = \"NOT_FULLTIME\"".to_string(),
            "- If the role strictly requires a PhD with no alternative: `isFit` = \"no\", `reason` = \"PHD_REQUIRED\"".to_string(),
            "- If the posting states it is open to internal candidates only: `isFit` = \"no\", `reason` = \"INTERNAL_ONLY\"".to_string(),
        ];
        if preferences.requires_sponsorship {
            rules.push(
                "- If the role explicitly states that no visa sponsorship is available: `isFit` = \"no\", `reason` = \"NO_SPONSORSHIP\"".to_string(),
            );
            rules.push(
                "- If the role requires citizenship or a security clearance: `isFit` = \"no\", `reason` = \"US_CITIZEN_ONLY\"".to_string(),
            );
        }
        if let Some(max_years) = preferences.max_experience_years {
            rules.push(format!(
                "- If the role requires a minimum of more than {max_years} years of work experience \
                 and cannot substitute graduate study: `isFit` = \"no\", `reason` = \"YEAR_EXCEED_MIN - \" + a brief reason"
            ));
        }
        if let Some(mode) = preferences.work_mode {
            rules.push(format!(
                "- If the role's stated work mode is not {}: `isFit` = \"no\", `reason` = \"PREFERENCE_VIOLATE - work mode\"",
                mode.label()
            ));
        }
        rules.push(
            "- If the role does not match the user's preferences: `isFit` = \"no\", `reason` = \"PREFERENCE_VIOLATE - \" + a brief reason".to_string(),
        );
        rules.join("\n")
    }
}

/// Cut at a char boundary at or below `max` bytes.
fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Connection-level failures are fatal for the run; a timeout is that
/// call's failure only.
fn map_transport_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::Unreachable(Box::new(e))
    }
}

#[async_trait]
impl Ai for OpenAiClient {
    async fn screen_batch(
        &self,
        cards: &[JobCard],
        preferences: &Preferences,
    ) -> AiResult<Vec<ScreenDecision>> {
        let system = "You extract fields from job listings and decide relevance. \
Use ONLY the provided text; do not infer beyond it. Output valid JSON only.\n\n\
# Field extraction\n\
- `positionTitle`: the official title as written; the shortest if several appear.\n\
- `employerName`: the employer name as written, or null.\n\
- `location`: only the geographic part, excluding work-mode phrases, or null.\n\
- `salary`: exact salary text if explicitly stated, else null.\n\
- `remote`: \"Hybrid\", \"Remote\", \"On-site\", or null.\n\n\
# Relevance decision\n\
- If the position is obviously unrelated to the user's target roles, `pass` = \"no\".\n\
- Otherwise `pass` = \"yes\".";

        let listing_text = cards
            .iter()
            .map(JobCard::prompt_text)
            .collect::<Vec<_>>()
            .join("\n---\n");
        let user = format!(
            "There are {count} job listings. Return the required JSON for all {count} entries, in input order.\n\n\
# User's target roles: {roles}\n\n# Job listings:\n{listing_text}",
            count = cards.len(),
            roles = preferences.roles_text(),
        );

        let item_schema = json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["positionTitle", "pass", "employerName", "location", "salary", "remote"],
            "properties": {
                "positionTitle": {"type": "string"},
                "employerName": {"type": ["string", "null"]},
                "location": {"type": ["string", "null"]},
                "pass": {"type": "string", "enum": ["yes", "no"]},
                "salary": {"type": ["string", "null"]},
                "remote": {"type": ["string", "null"], "enum": ["Hybrid", "Remote", "On-site", null]}
            }
        });
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["listings"],
            "properties": {
                "listings": {"type": "array", "items": item_schema}
            }
        });

        let raw = self
            .generate_structured(&self.screen_model, system, &user, "JobListingPreScreen", schema)
            .await?;

        let parsed: ScreenResponse =
            serde_json::from_str(&raw).map_err(|e| AiError::SchemaViolation {
                reason: format!("pre-screen output did not match schema: {e}"),
            })?;

        Ok(parsed
            .listings
            .into_iter()
            .map(ScreenItem::into_decision)
            .collect())
    }

    async fn gate_check(
        &self,
        card: &JobCard,
        description: &JobDescription,
        preferences: &Preferences,
    ) -> AiResult<GateDecision> {
        let system = format!(
            "You are an experienced recruiter. Use only the data provided; do not infer, guess, \
or use outside knowledge. Output only what the schema requires.\n\n\
# Task\n\
1. Extract core technical skills from the job description.\n\
2. Decide fit using the rules below in order; stop at the first rule that applies.\n\n\
# Skill extraction\n\
- `technicalSkills`: unique, concrete hard skills explicitly named (canonical names, \
no soft skills or domains); [] if none.\n\n\
# Fit decision (ONLY these rules, in order)\n{rules}\n\n\
If several rejection rules match, give only the first. Keep the reason succinct. \
Otherwise `isFit` = \"yes\" and `reason` = null.",
            rules = Self::gate_rules(preferences),
        );

        let body = truncate_at_boundary(&description.body, MAX_JD_CHARS);
        let user = format!(
            "Only use the data below. Apply the fit rules in order.\n\n\
# User preferences:\n{prefs}\n\n# positionTitle: {title}\n\n# Job description:\n{body}",
            prefs = preferences.preferences_text(),
            title = card.title,
        );

        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["technicalSkills", "isFit", "reason"],
            "properties": {
                "technicalSkills": {
                    "type": "array",
                    "items": {"type": "string", "minLength": 1}
                },
                "isFit": {"type": "string", "enum": ["yes", "no"]},
                "reason": {"type": ["string", "null"]}
            }
        });

        let raw = self
            .generate_structured(&self.gate_model, &system, &user, "JobDescriptionGate", schema)
            .await?;

        let parsed: GateResponse =
            serde_json::from_str(&raw).map_err(|e| AiError::SchemaViolation {
                reason: format!("gate output did not match schema: {e}"),
            })?;

        Ok(match parsed.is_fit {
            YesNo::Yes => GateDecision::passed(parsed.technical_skills),
            YesNo::No => GateDecision::gated_out(
                parsed
                    .reason
                    .unwrap_or_else(|| "PREFERENCE_VIOLATE".to_string()),
            )
            .with_skills(parsed.technical_skills),
        })
    }

    fn estimated_cost(&self) -> f64 {
        *self.spent_usd.lock().unwrap()
    }
}

// Wire types

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
enum YesNo {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
}

#[derive(Debug, Deserialize)]
struct ScreenResponse {
    listings: Vec<ScreenItem>,
}

#[derive(Debug, Deserialize)]
struct ScreenItem {
    #[serde(rename = "positionTitle")]
    position_title: String,
    #[serde(rename = "employerName")]
    employer_name: Option<String>,
    location: Option<String>,
    salary: Option<String>,
    remote: Option<WorkMode>,
    pass: YesNo,
}

impl ScreenItem {
    fn into_decision(self) -> ScreenDecision {
        let profile = CardProfile {
            title: self.position_title,
            employer: self.employer_name,
            location: self.location,
            salary: self.salary,
            work_mode: self.remote,
        };
        match self.pass {
            YesNo::Yes => ScreenDecision::shortlisted(profile),
            YesNo::No => ScreenDecision::rejected(profile),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GateResponse {
    #[serde(rename = "technicalSkills")]
    technical_skills: Vec<String>,
    #[serde(rename = "isFit")]
    is_fit: YesNo,
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_models() {
        let ai = OpenAiClient::new("sk-test")
            .with_screen_model("gpt-4.1-mini")
            .with_gate_model("gpt-5-mini")
            .with_base_url("https://proxy.example.com/v1");
        assert_eq!(ai.screen_model, "gpt-4.1-mini");
        assert_eq!(ai.gate_model, "gpt-5-mini");
        assert_eq!(ai.base_url, "https://proxy.example.com/v1");
        assert_eq!(ai.estimated_cost(), 0.0);
    }

    #[test]
    fn usage_accumulates_known_model_pricing() {
        let ai = OpenAiClient::new("sk-test");
        ai.record_usage(
            "gpt-4.1-mini",
            &Usage {
                prompt_tokens: 1_000_000,
                completion_tokens: 1_000_000,
            },
        );
        assert!((ai.estimated_cost() - 2.0).abs() < 1e-9);

        // Unknown models do not panic and do not bill.
        ai.record_usage(
            "mystery-model",
            &Usage {
                prompt_tokens: 5,
                completion_tokens: 5,
            },
        );
        assert!((ai.estimated_cost() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn screen_item_maps_to_decision() {
        let raw = r#"{"listings":[
            {"positionTitle":"Data Scientist II","employerName":"Acme","location":"Boston, MA",
             "salary":null,"remote":"Hybrid","pass":"yes"},
            {"positionTitle":"Line Cook","employerName":null,"location":null,
             "salary":null,"remote":null,"pass":"no"}
        ]}"#;
        let parsed: ScreenResponse = serde_json::from_str(raw).unwrap();
        let decisions: Vec<ScreenDecision> = parsed
            .listings
            .into_iter()
            .map(ScreenItem::into_decision)
            .collect();

        assert!(decisions[0].is_shortlisted());
        assert_eq!(decisions[0].profile.work_mode, Some(WorkMode::Hybrid));
        assert!(!decisions[1].is_shortlisted());
    }

    #[test]
    fn malformed_screen_output_is_a_schema_violation() {
        let err = serde_json::from_str::<ScreenResponse>("{\"nope\": 1}")
            .map_err(|e| AiError::SchemaViolation {
                reason: e.to_string(),
            })
            .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "héllo wörld";
        let cut = truncate_at_boundary(text, 2);
        assert!(text.starts_with(cut));
        assert!(cut.len() <= 2);
        assert_eq!(truncate_at_boundary("short", 100), "short");
    }

    #[test]
    fn gate_rules_reflect_preferences() {
        let prefs = Preferences {
            target_roles: vec!["Data Scientist".into()],
            preferences: vec!["full-time".into()],
            max_experience_years: Some(4),
            requires_sponsorship: true,
            work_mode: Some(WorkMode::Remote),
        };
        let rules = OpenAiClient::gate_rules(&prefs);
        assert!(rules.contains("NO_SPONSORSHIP"));
        assert!(rules.contains("more than 4 years"));
        assert!(rules.contains("not Remote"));

        let loose = Preferences {
            target_roles: vec!["Data Scientist".into()],
            preferences: vec!["anything".into()],
            max_experience_years: None,
            requires_sponsorship: false,
            work_mode: None,
        };
        let rules = OpenAiClient::gate_rules(&loose);
        assert!(!rules.contains("NO_SPONSORSHIP"));
        assert!(!rules.contains("YEAR_EXCEED_MIN"));
    }
}
