//! External key-value store over a Redis-compatible REST API
//! (Upstash / Vercel KV).
//!
//! Each command is POSTed to the base URL as a JSON array, e.g.
//! `["SET", "weather", "<json>", "EX", "1800"]`, and answered with either
//! `{"result": ...}` or `{"error": "..."}`.

use async_trait::async_trait;
use common::Error;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::store::{CacheEntry, CacheStore};

/// REST client for the shared KV store.
#[derive(Debug, Clone)]
pub struct KvStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl KvStore {
    pub fn new(base_url: &str, token: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| Error::Kv(format!("failed to build KV HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Run one command and return its `result` field.
    async fn command(&self, args: Value) -> Result<Value, Error> {
        let resp = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|e| Error::Kv(format!("HTTP error: {}", e)))?;

        let status = resp.status().as_u16();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::Kv(format!("invalid reply (status {}): {}", status, e)))?;

        if status != 200 {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::Kv(format!("status {}: {}", status, message)));
        }

        parse_reply(body)
    }
}

/// Extract `result` from a KV reply, surfacing `error` replies.
pub fn parse_reply(body: Value) -> Result<Value, Error> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(Error::Kv(message.to_string()));
    }
    match body {
        Value::Object(mut map) => Ok(map.remove("result").unwrap_or(Value::Null)),
        other => Err(Error::Kv(format!("unexpected reply: {}", other))),
    }
}

/// Decode a stored envelope. Values normally come back as the JSON string we
/// wrote; some proxies hand back the decoded object instead.
pub fn decode_entry(result: Value) -> Result<Option<CacheEntry>, Error> {
    match result {
        Value::Null => Ok(None),
        Value::String(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::Kv(format!("corrupt entry: {}", e))),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(|e| Error::Kv(format!("corrupt entry: {}", e))),
    }
}

#[async_trait]
impl CacheStore for KvStore {
    fn name(&self) -> &'static str {
        "kv"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let result = self.command(json!(["GET", key])).await?;
        decode_entry(result)
    }

    async fn set(&self, key: &str, entry: CacheEntry, retain_secs: u64) -> Result<(), Error> {
        let encoded = serde_json::to_string(&entry)?;
        // Redis rejects EX 0.
        let ex = retain_secs.max(1).to_string();
        self.command(json!(["SET", key, encoded, "EX", &ex])).await?;
        debug!("[Cache KV] SET \"{}\" (EX {}s)", key, ex);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        info!("[Cache KV] clear ignored on shared store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_result() {
        let result = parse_reply(json!({"result": "OK"})).unwrap();
        assert_eq!(result, json!("OK"));

        let missing = parse_reply(json!({"result": null})).unwrap();
        assert!(missing.is_null());
    }

    #[test]
    fn test_parse_reply_error() {
        let err = parse_reply(json!({"error": "WRONGPASS invalid token"})).unwrap_err();
        assert!(err.to_string().contains("WRONGPASS"));
    }

    #[test]
    fn test_decode_entry_from_string() {
        let entry = CacheEntry {
            data: json!({"level": 2}),
            expires_at_ms: 42,
        };
        let raw = Value::String(serde_json::to_string(&entry).unwrap());
        assert_eq!(decode_entry(raw).unwrap(), Some(entry));
    }

    #[test]
    fn test_decode_entry_from_object_and_null() {
        let decoded = decode_entry(json!({"data": [1, 2], "expires_at_ms": 7})).unwrap();
        assert_eq!(decoded.unwrap().data, json!([1, 2]));
        assert_eq!(decode_entry(Value::Null).unwrap(), None);
    }

    #[test]
    fn test_decode_entry_corrupt() {
        assert!(decode_entry(json!("not json")).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = KvStore::new("https://kv.example.com/", "t").unwrap();
        assert_eq!(store.base_url, "https://kv.example.com");
    }

    mod over_http {
        use super::*;
        use crate::{CacheManager, FetchOptions};
        use axum::extract::State;
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::post;
        use axum::{Json, Router};
        use std::collections::HashMap;
        use std::sync::{Arc, Mutex};

        const TOKEN: &str = "secret-token";

        /// In-process stand-in for the KV REST endpoint. Records every
        /// command it accepts.
        #[derive(Clone, Default)]
        struct FakeKv {
            data: Arc<Mutex<HashMap<String, String>>>,
            commands: Arc<Mutex<Vec<Value>>>,
        }

        impl FakeKv {
            fn commands(&self) -> Vec<Value> {
                self.commands.lock().unwrap().clone()
            }
        }

        async fn handle(
            State(kv): State<FakeKv>,
            headers: HeaderMap,
            Json(command): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            let bearer = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if bearer != format!("Bearer {}", TOKEN) {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "WRONGPASS invalid token"})),
                );
            }

            kv.commands.lock().unwrap().push(command.clone());
            let args: Vec<String> = command
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();

            let mut data = kv.data.lock().unwrap();
            let result = match args.first().map(String::as_str) {
                Some("GET") => data.get(&args[1]).cloned().map_or(Value::Null, Value::String),
                Some("SET") => {
                    data.insert(args[1].clone(), args[2].clone());
                    json!("OK")
                }
                Some("DEL") => json!(data.remove(&args[1]).map_or(0, |_| 1)),
                _ => return (StatusCode::OK, Json(json!({"error": "ERR unknown command"}))),
            };
            (StatusCode::OK, Json(json!({ "result": result })))
        }

        async fn spawn_kv() -> (String, FakeKv) {
            let kv = FakeKv::default();
            let app = Router::new().route("/", post(handle)).with_state(kv.clone());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            (format!("http://{}", addr), kv)
        }

        #[tokio::test]
        async fn test_set_sends_ex_command() {
            let (url, kv) = spawn_kv().await;
            let store = KvStore::new(&url, TOKEN).unwrap();
            let entry = CacheEntry {
                data: json!({"level": 2}),
                expires_at_ms: 42,
            };

            store.set("vigilance", entry.clone(), 0).await.unwrap();

            let encoded = serde_json::to_string(&entry).unwrap();
            assert_eq!(
                kv.commands(),
                vec![json!(["SET", "vigilance", encoded, "EX", "1"])]
            );
            assert_eq!(store.get("vigilance").await.unwrap(), Some(entry));
            assert_eq!(store.get("missing").await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_wrong_token_is_an_error() {
            let (url, kv) = spawn_kv().await;
            let store = KvStore::new(&url, "wrong").unwrap();

            let err = store.get("weather").await.unwrap_err();
            let message = err.to_string();
            assert!(message.contains("401"), "{}", message);
            assert!(message.contains("WRONGPASS"), "{}", message);
            assert!(kv.commands().is_empty());
        }

        #[tokio::test]
        async fn test_error_reply_with_200_is_an_error() {
            let (url, _kv) = spawn_kv().await;
            let store = KvStore::new(&url, TOKEN).unwrap();

            let err = store.command(json!(["FLUSHALL"])).await.unwrap_err();
            assert!(err.to_string().contains("unknown command"));
        }

        #[tokio::test]
        async fn test_manager_round_trip_over_kv() {
            let (url, kv) = spawn_kv().await;
            let cache = CacheManager::new(Arc::new(KvStore::new(&url, TOKEN).unwrap()), 60);
            assert!(cache.is_kv_available());

            cache.set("air_quality", &json!({"97101": 2}), 180).await;
            let hit: Option<Value> = cache.get("air_quality").await;
            assert_eq!(hit, Some(json!({"97101": 2})));

            cache.invalidate("air_quality").await;
            assert!(cache.get::<Value>("air_quality").await.is_none());

            let commands = kv.commands();
            assert_eq!(commands[0][4], "240");
            assert_eq!(commands.last().unwrap(), &json!(["DEL", "air_quality"]));
        }

        #[tokio::test]
        async fn test_stale_served_after_failed_fetch_over_kv() {
            let (url, kv) = spawn_kv().await;
            let cache = CacheManager::new(Arc::new(KvStore::new(&url, TOKEN).unwrap()), 60);
            cache.set("weather", &json!({"temperature": 29.5}), 0).await;

            let value: Value = cache
                .get_or_fetch(
                    "weather",
                    || async { Err(Error::OpenMeteo("down".into())) },
                    FetchOptions::ttl(900),
                )
                .await
                .unwrap();

            assert_eq!(value, json!({"temperature": 29.5}));
            // Only the seeding SET: the failed fetch wrote nothing back.
            let sets = kv
                .commands()
                .into_iter()
                .filter(|c| c[0] == "SET")
                .count();
            assert_eq!(sets, 1);
        }
    }
}
