// Narrator module: turns an analysis record into popup-ready text.

use crate::marketplace;
use crate::model::{AnalysisRecord, NarrateError};

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const COMPLETIONS_MODEL: &str = "gpt-3.5-turbo";

/// The four text components the popup renders, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub header: String,
    pub first_phrase: String,
    pub second_phrase: String,
    pub third_phrase: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct Narrator {
    client: Client,
    api_key: Option<String>,
}

impl Narrator {
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("❗ Failed to create HTTP client");

        Self { client, api_key }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generates the four-component recommendation text for a record.
    pub async fn narrate(
        &self,
        record: &AnalysisRecord,
        marketplace: &str,
    ) -> Result<GeneratedText, NarrateError> {
        let Some(api_key) = &self.api_key else {
            return Err(NarrateError::Disabled);
        };

        let body = json!({
            "model": COMPLETIONS_MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful assistant that generates clear, concise pricing recommendations."
                },
                {
                    "role": "user",
                    "content": build_prompt(record, marketplace)
                }
            ],
            "temperature": 0.7,
            "max_tokens": 200
        });

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NarrateError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NarrateError::Api(format!("status {status}")));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| NarrateError::MalformedResponse(e.to_string()))?;
        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| NarrateError::MalformedResponse("no choices".into()))?;

        Ok(parse_components(content))
    }
}

/// Builds the generation prompt from the record's numbers, formatted in the
/// marketplace's currency style.
pub fn build_prompt(record: &AnalysisRecord, mp: &str) -> String {
    let context = &record.current_price_context;
    let drops = &record.price_drops;
    let activity = &record.recent_activity;
    let volatility = &record.volatility_metrics;
    let floor = &record.lowest_price_metrics;

    let last_drop_line = match drops.days_since_last_drop {
        Some(days) => format!("{days} days ago"),
        None => "none in the window".to_string(),
    };
    let last_change_line = match &activity.last_change {
        Some(change) => format!(
            "{} ({:.1}% {:?}) {} days ago",
            marketplace::format_price(change.amount.abs(), mp),
            change.percentage,
            change.direction,
            change.days_ago
        )
        .to_lowercase(),
        None => "no change recorded".to_string(),
    };

    format!(
        r#"### Task:
Generate the following components for a product pricing popup based on the provided inputs:
1. **Header**: A short, clear, and action-oriented statement that explains the meter score. The output should align with the meter:
   - High Score (70%-100%): Encourage buying now.
   - Mid Score (40%-69%): Suggest it's an okay deal.
   - Low Score (0%-39%): Strongly recommend waiting.
2. **First Phrase**: Explain with numbers why the meter score was assigned. Avoid explicitly mentioning the current price but compare it to the lowest price, usual price, or max price to justify the score.
3. **Second Phrase**: Reinforce the meter score using additional insights such as price trends, stability, or historical context.
4. **Third Phrase (CTA)**: Tie the explanation to a specific call-to-action. Adapt the tone based on the meter score:
   - High Score: Encourage buying but offer tracking as optional.
   - Mid Score: Not a bad price but recommend tracking to find a better deal soon.
   - Low Score: Strongly urge tracking to avoid overpaying.

### Inputs:
Current Price Context:
- Meter Score: {score}%
- Current Price: {current}
- Usual Price: {usual} ({usual_pct}% of the time)
- Lowest Price: {lowest}
- Highest Price: {highest}

Price Drops:
- Total: {drop_total}
- Average Drop: {drop_avg}
- Last Drop: {last_drop}

Recent Activity:
- Stable for: {stable_days} days
- Last Change: {last_change}

Volatility Metrics:
- Total Price Changes in 90 Days: {total_changes}
- Price Range: {range_min} - {range_max}

Time at Lowest Price:
- Stayed at {floor_price} for {floor_days} days on average, across {floor_periods} period(s)

### Instructions:
- Keep sentences concise and clear (3rd-grade reading level).
- Ensure the tone and flow are cohesive across all four components.
- Base the outputs strictly on the provided inputs and meter score logic.
- Return the response in this format:
  - Header: [Your text]
  - First Phrase: [Your text]
  - Second Phrase: [Your text]
  - Third Phrase: [Your text]
"#,
        score = record.meter_score.score,
        current = marketplace::format_price(context.current_price, mp),
        usual = marketplace::format_price(context.usual_price.price, mp),
        usual_pct = context.usual_price.percentage_of_time,
        lowest = marketplace::format_price(context.lowest_price, mp),
        highest = marketplace::format_price(context.highest_price, mp),
        drop_total = drops.total,
        drop_avg = marketplace::format_price(drops.average_drop, mp),
        last_drop = last_drop_line,
        stable_days = activity.stable_days,
        last_change = last_change_line,
        total_changes = volatility.total_changes,
        range_min = marketplace::format_price(volatility.price_range.min, mp),
        range_max = marketplace::format_price(volatility.price_range.max, mp),
        floor_price = marketplace::format_price(floor.price, mp),
        floor_days = floor.average_duration_days,
        floor_periods = floor.number_of_periods,
    )
}

/// Extracts the four labeled lines out of a completion. Missing components
/// fall back to safe defaults rather than failing the whole narration.
fn parse_components(content: &str) -> GeneratedText {
    let extract = |label: &str| -> Option<String> {
        content
            .lines()
            .map(str::trim)
            .map(|line| line.trim_start_matches("- "))
            .find(|line| line.starts_with(label))
            .map(|line| line[label.len()..].trim().to_string())
            .filter(|text| !text.is_empty())
    };

    GeneratedText {
        header: extract("Header:").unwrap_or_else(|| "Price analysis unavailable".to_string()),
        first_phrase: extract("First Phrase:").unwrap_or_default(),
        second_phrase: extract("Second Phrase:").unwrap_or_default(),
        third_phrase: extract("Third Phrase:").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::PriceAnalyzer;
    use crate::model::{Channel, ChannelSeries, PricePoint};
    use crate::utils::DAY_MS;

    fn sample_record() -> AnalysisRecord {
        let channels = vec![ChannelSeries {
            channel: Channel::Amazon,
            points: vec![
                PricePoint {
                    timestamp: 20 * DAY_MS,
                    price: 25.0,
                },
                PricePoint {
                    timestamp: 60 * DAY_MS,
                    price: 19.99,
                },
            ],
        }];
        PriceAnalyzer::default()
            .analyze(&channels, 100 * DAY_MS)
            .unwrap()
    }

    #[test]
    fn prompt_contains_the_record_numbers() {
        let record = sample_record();
        let prompt = build_prompt(&record, "amazon.com");

        assert!(prompt.contains(&format!("Meter Score: {}%", record.meter_score.score)));
        assert!(prompt.contains("Current Price: $19.99"));
        assert!(prompt.contains("Usual Price: $25.00"));
        assert!(prompt.contains("Lowest Price: $19.99"));
        assert!(prompt.contains("Highest Price: $25.00"));
    }

    #[test]
    fn prompt_formats_in_marketplace_currency() {
        let record = sample_record();
        let prompt = build_prompt(&record, "amazon.de");

        assert!(prompt.contains("Current Price: 19.99 €"));
    }

    #[test]
    fn components_parse_out_of_a_completion() {
        let content = "Header: Buy it now!\n\
                       First Phrase: It sits at the lowest price seen.\n\
                       Second Phrase: The price has been stable.\n\
                       Third Phrase: Grab it, or track it if unsure.";
        let text = parse_components(content);

        assert_eq!(text.header, "Buy it now!");
        assert_eq!(text.third_phrase, "Grab it, or track it if unsure.");
    }

    #[test]
    fn dash_prefixed_components_parse_too() {
        let content = "- Header: Wait for a drop.\n- First Phrase: Above usual.";
        let text = parse_components(content);

        assert_eq!(text.header, "Wait for a drop.");
        assert_eq!(text.first_phrase, "Above usual.");
    }

    #[test]
    fn missing_header_falls_back() {
        let text = parse_components("nothing useful here");
        assert_eq!(text.header, "Price analysis unavailable");
        assert!(text.first_phrase.is_empty());
    }

    #[test]
    fn narrator_without_key_is_disabled() {
        let narrator = Narrator::new(None);
        assert!(!narrator.is_enabled());
    }
}
