//! Music record client module
//!
//! Fetches the configured user's weekly listening record from the
//! external music service and reduces it to the list the sidebar widget
//! renders. The serialized payload is cached and refreshed once it is
//! older than the configured expiry; the rest of the server treats it as
//! an opaque JSON string.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::ServerError;
use crate::logger;

const RECORD_URL: &str = "https://music.163.com/api/v1/play/record";

/// Client for the external music service
pub struct MusicClient {
    client: reqwest::Client,
    uid: u64,
    expire: Duration,
    cache: RwLock<Option<CachedRecord>>,
}

struct CachedRecord {
    fetched_at: Instant,
    body: String,
}

#[derive(Deserialize)]
struct RecordResponse {
    #[serde(rename = "weekData", default)]
    week_data: Vec<RecordEntry>,
}

#[derive(Deserialize)]
struct RecordEntry {
    song: Song,
}

#[derive(Deserialize)]
struct Song {
    id: i64,
    name: String,
    #[serde(rename = "ar", default)]
    artists: Vec<Artist>,
}

#[derive(Deserialize)]
struct Artist {
    name: String,
}

impl MusicClient {
    pub fn new(uid: u64, expire: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            uid,
            expire,
            cache: RwLock::new(None),
        }
    }

    /// Current record list as a JSON string.
    ///
    /// Serves the cached copy while it is fresh. On upstream failure a
    /// stale copy is served if one exists, otherwise an empty list; the
    /// failure never reaches the router.
    pub async fn record(&self) -> String {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.expire {
                    return cached.body.clone();
                }
            }
        }

        match self.fetch().await {
            Ok(body) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CachedRecord {
                    fetched_at: Instant::now(),
                    body: body.clone(),
                });
                body
            }
            Err(e) => {
                logger::log_warning(&format!("Music record fetch failed: {e}"));
                let cache = self.cache.read().await;
                cache
                    .as_ref()
                    .map_or_else(|| "[]".to_string(), |cached| cached.body.clone())
            }
        }
    }

    async fn fetch(&self) -> Result<String, ServerError> {
        let response = self
            .client
            .get(RECORD_URL)
            .query(&[("uid", self.uid.to_string()), ("type", "1".to_string())])
            .send()
            .await?
            .error_for_status()?;
        let record: RecordResponse = response.json().await?;
        Ok(record_list_json(&record))
    }
}

/// Reduce the raw play record to `[{id, name, artistName}]`
fn record_list_json(record: &RecordResponse) -> String {
    let list: Vec<serde_json::Value> = record
        .week_data
        .iter()
        .map(|entry| {
            serde_json::json!({
                "id": entry.song.id,
                "name": entry.song.name,
                "artistName": entry
                    .song
                    .artists
                    .iter()
                    .map(|artist| artist.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" / "),
            })
        })
        .collect();
    serde_json::to_string(&list).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_list_mapping() {
        let raw = r#"{
            "weekData": [
                { "playCount": 12, "song": { "id": 42, "name": "Song A",
                    "ar": [{ "name": "Artist 1" }, { "name": "Artist 2" }] } },
                { "playCount": 3, "song": { "id": 7, "name": "Song B", "ar": [] } }
            ]
        }"#;
        let record: RecordResponse = serde_json::from_str(raw).unwrap();
        let json = record_list_json(&record);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], 42);
        assert_eq!(parsed[0]["artistName"], "Artist 1 / Artist 2");
        assert_eq!(parsed[1]["name"], "Song B");
    }

    #[test]
    fn test_empty_record_maps_to_empty_list() {
        let record: RecordResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(record_list_json(&record), "[]");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_refetch() {
        let client = MusicClient::new(1, Duration::from_secs(3600));
        {
            let mut cache = client.cache.write().await;
            *cache = Some(CachedRecord {
                fetched_at: Instant::now(),
                body: "[{\"id\":1}]".to_string(),
            });
        }
        assert_eq!(client.record().await, "[{\"id\":1}]");
    }
}
