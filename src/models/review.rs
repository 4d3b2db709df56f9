//! Review records extracted from a single game's review page.

use serde::{Deserialize, Serialize};

/// A score widget value.
///
/// The site renders scores as text ("92", "8,5"). Numeric text is kept as a
/// number; anything else ("--", "N/A") is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Number(f64),
    Text(String),
}

impl Score {
    /// Parse widget text, accepting both `.` and `,` as decimal separator.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.replace(',', ".").parse::<f64>() {
            Ok(n) if n.is_finite() => Score::Number(n),
            _ => Score::Text(trimmed.to_string()),
        }
    }
}

/// Flat key-value record for one reviewed game.
///
/// Field declaration order is the serialized order; absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReviewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// ISO date as published by the site (`itemprop="releaseDate"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_score: Option<Score>,
}

impl GameReviewRecord {
    /// Names of the fields that are present, in serialized order.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.platform.is_some() {
            fields.push("platform");
        }
        if self.studio.is_some() {
            fields.push("studio");
        }
        if self.publisher.is_some() {
            fields.push("publisher");
        }
        if self.genre.is_some() {
            fields.push("genre");
        }
        if self.release_date.is_some() {
            fields.push("releaseDate");
        }
        if self.critic_score.is_some() {
            fields.push("criticScore");
        }
        if self.user_score.is_some() {
            fields.push("userScore");
        }
        fields
    }
}

/// All reviews matching one query, in search-result order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSearchResult {
    pub reviews: Vec<GameReviewRecord>,
}

/// Outcome of a review lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewLookup {
    Found(ReviewSearchResult),
    /// No search results rendered within the wait budget ("not reviewed yet").
    SearchTimeout,
}

impl ReviewLookup {
    /// Convert into the wire shape, where a timeout is `null`.
    pub fn into_option(self) -> Option<ReviewSearchResult> {
        match self {
            ReviewLookup::Found(result) => Some(result),
            ReviewLookup::SearchTimeout => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_parses_decimal_comma() {
        assert_eq!(Score::parse(" 8,5 "), Score::Number(8.5));
        assert_eq!(Score::parse("92"), Score::Number(92.0));
        assert_eq!(Score::parse("--"), Score::Text("--".to_string()));
    }

    #[test]
    fn record_omits_absent_fields() {
        let record = GameReviewRecord {
            name: Some("Celeste".to_string()),
            critic_score: Some(Score::Number(92.0)),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"Celeste","criticScore":92.0}"#);
    }

    #[test]
    fn record_serializes_in_fixed_order() {
        let record = GameReviewRecord {
            user_score: Some(Score::Text("8.5".to_string())),
            name: Some("Celeste".to_string()),
            release_date: Some("2018-01-25".to_string()),
            platform: Some("PC".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        let name = json.find("\"name\"").unwrap();
        let platform = json.find("\"platform\"").unwrap();
        let release = json.find("\"releaseDate\"").unwrap();
        let user = json.find("\"userScore\"").unwrap();
        assert!(name < platform && platform < release && release < user);
    }

    #[test]
    fn timeout_serializes_as_null() {
        let json = serde_json::to_string(&ReviewLookup::SearchTimeout.into_option()).unwrap();
        assert_eq!(json, "null");
    }
}
