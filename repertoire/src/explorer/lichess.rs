//! Lichess opening explorer client.
//!
//! `GET {base}/lichess?variant=standard&speeds=…&ratings=…&fen=…`
//!
//! The explorer only accepts fixed rating buckets, so a repertoire's target
//! rating is snapped to the bucket at or below it.

use serde::Deserialize;
use std::time::Duration;

use super::{FetchError, MoveStats, PositionStats, StatsProvider};

pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.lichess.ovh";

pub const DEFAULT_SPEEDS: &[&str] = &["rapid"];

const RATING_BUCKETS: [u32; 9] = [0, 1000, 1200, 1400, 1600, 1800, 2000, 2200, 2500];

/// Highest explorer rating bucket not above `rating`.
pub fn rating_bucket(rating: u32) -> u32 {
    RATING_BUCKETS
        .iter()
        .rev()
        .copied()
        .find(|&bucket| bucket <= rating)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    white: u64,
    black: u64,
    draws: u64,
    #[serde(default)]
    moves: Vec<ExplorerMove>,
    opening: Option<ExplorerOpening>,
}

#[derive(Debug, Deserialize)]
struct ExplorerMove {
    uci: Option<String>,
    san: String,
    white: u64,
    black: u64,
    draws: u64,
}

#[derive(Debug, Deserialize)]
struct ExplorerOpening {
    eco: Option<String>,
    name: String,
}

impl From<ExplorerResponse> for PositionStats {
    fn from(resp: ExplorerResponse) -> Self {
        Self {
            white: resp.white,
            black: resp.black,
            draws: resp.draws,
            moves: resp
                .moves
                .into_iter()
                .map(|m| MoveStats {
                    san: m.san,
                    uci: m.uci,
                    white: m.white,
                    black: m.black,
                    draws: m.draws,
                })
                .collect(),
            opening: resp.opening.map(|o| match o.eco {
                Some(eco) => format!("{eco} {}", o.name),
                None => o.name,
            }),
        }
    }
}

/// [`StatsProvider`] backed by the Lichess opening explorer.
#[derive(Clone)]
pub struct LichessExplorer {
    client: reqwest::Client,
    base_url: String,
    speeds: Vec<String>,
}

impl LichessExplorer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("repertoire/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            speeds: DEFAULT_SPEEDS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Restrict statistics to these time controls (`blitz`, `rapid`, ...).
    pub fn with_speeds<I, S>(mut self, speeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let speeds: Vec<String> = speeds
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.trim().is_empty())
            .collect();
        if !speeds.is_empty() {
            self.speeds = speeds;
        }
        self
    }

    fn request(&self, position: &str, rating: u32) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/lichess", self.base_url))
            .query(&[
                ("variant", "standard".to_string()),
                ("speeds", self.speeds.join(",")),
                ("ratings", rating_bucket(rating).to_string()),
                ("fen", position.to_string()),
            ])
    }
}

impl StatsProvider for LichessExplorer {
    async fn fetch_stats(&self, position: &str, rating: u32) -> Result<PositionStats, FetchError> {
        let resp = self.request(position, rating).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let body: ExplorerResponse = resp.json().await?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::STARTING_FEN;

    const SAMPLE: &str = r#"{
        "white": 1200, "draws": 150, "black": 1000,
        "moves": [
            {"uci": "e2e4", "san": "e4", "averageRating": 1610,
             "white": 600, "draws": 60, "black": 500, "game": null},
            {"uci": "d2d4", "san": "d4", "averageRating": 1605,
             "white": 400, "draws": 50, "black": 350, "game": null}
        ],
        "topGames": [],
        "opening": null
    }"#;

    #[test]
    fn test_parse_explorer_payload() {
        let resp: ExplorerResponse = serde_json::from_str(SAMPLE).unwrap();
        let stats = PositionStats::from(resp);
        assert_eq!((stats.white, stats.black, stats.draws), (1200, 1000, 150));
        assert_eq!(stats.moves.len(), 2);
        assert_eq!(stats.moves[0].san, "e4");
        assert_eq!(stats.moves[0].uci.as_deref(), Some("e2e4"));
        assert!(stats.opening.is_none());
    }

    #[test]
    fn test_parse_opening_name() {
        let json = r#"{"white": 1, "draws": 0, "black": 0, "moves": [],
            "opening": {"eco": "C50", "name": "Italian Game"}}"#;
        let stats = PositionStats::from(serde_json::from_str::<ExplorerResponse>(json).unwrap());
        assert_eq!(stats.opening.as_deref(), Some("C50 Italian Game"));
    }

    #[test]
    fn test_rating_buckets() {
        assert_eq!(rating_bucket(400), 0);
        assert_eq!(rating_bucket(1000), 1000);
        assert_eq!(rating_bucket(1650), 1600);
        assert_eq!(rating_bucket(2400), 2200);
        assert_eq!(rating_bucket(3000), 2500);
    }

    #[test]
    fn test_request_url() {
        let explorer = LichessExplorer::new("https://explorer.example/", Duration::from_secs(1))
            .unwrap()
            .with_speeds(["blitz", "rapid"]);
        let request = explorer.request(STARTING_FEN, 1650).build().unwrap();
        let url = request.url();

        assert_eq!(url.path(), "/lichess");
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("variant".into(), "standard".into())));
        assert!(query.contains(&("speeds".into(), "blitz,rapid".into())));
        assert!(query.contains(&("ratings".into(), "1600".into())));
        assert!(query.contains(&("fen".into(), STARTING_FEN.into())));
    }

    #[test]
    fn test_blank_speeds_keep_default() {
        let explorer = LichessExplorer::new(DEFAULT_EXPLORER_URL, Duration::from_secs(1))
            .unwrap()
            .with_speeds([" "]);
        assert_eq!(explorer.speeds, vec!["rapid"]);
    }
}
