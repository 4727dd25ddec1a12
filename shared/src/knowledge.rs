//! Knowledge document loading with a short-lived in-memory cache.
//!
//! The provider never fails: a fetch that errors out or comes back empty
//! degrades to a fixed fallback document so the conversation can proceed
//! with generic context.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Maximum age of a cached document before it must be refetched.
pub fn staleness_window() -> Duration {
    Duration::minutes(5)
}

/// Served when the remote fetch fails or returns an empty body.
pub const FALLBACK_KNOWLEDGE: &str = "\
DESARROLLADOR FULL-STACK - INFORMACIÓN POR DEFECTO

HABILIDADES TÉCNICAS:
- Frontend: React, Next.js, TypeScript, JavaScript, Tailwind CSS
- Backend: Node.js, Express, Python, FastAPI
- Bases de datos: PostgreSQL, MongoDB, Supabase
- Mobile: React Native, Expo
- Herramientas: Git, Docker, AWS, Vercel, Netlify

EXPERIENCIA:
- Desarrollo web y móvil en startups y empresas tecnológicas
- Proyectos freelance para clientes internacionales

NOTA: Esta es información por defecto. Verifica que el archivo
knowledge-base.txt esté disponible en la carpeta public/.
";

/// Compiled-in document for deployments that skip the remote fetch.
pub const EMBEDDED_KNOWLEDGE: &str = "\
DESARROLLADOR FULL-STACK

HABILIDADES TÉCNICAS:
- Frontend: React, Next.js, TypeScript, JavaScript, Tailwind CSS
- Backend: Node.js, Express, Python, FastAPI
- Bases de datos: PostgreSQL, MongoDB, Supabase
- Mobile: React Native, Expo
- Herramientas: Git, Docker, AWS, Vercel, Netlify

PROYECTOS DESTACADOS:
- Plataforma de e-commerce con carrito, pagos y panel de administración
- Dashboard de analytics en tiempo real para métricas de negocio
- Aplicación móvil de gestión de tareas con sincronización en la nube

EXPERIENCIA:
- Desarrollo web y móvil en startups y empresas tecnológicas
- Proyectos freelance para clientes internacionales

CONTACTO:
- Formulario de contacto del portafolio o correo electrónico
";

/// Where a returned document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeOrigin {
    Remote,
    Embedded,
    Fallback,
}

/// A knowledge document handed to the chat handler. Never empty.
#[derive(Debug, Clone)]
pub struct KnowledgeText {
    pub content: String,
    pub fetched_at: DateTime<Utc>,
    pub origin: KnowledgeOrigin,
}

impl KnowledgeText {
    fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            content: FALLBACK_KNOWLEDGE.to_string(),
            fetched_at: now,
            origin: KnowledgeOrigin::Fallback,
        }
    }
}

/// True when a document fetched at `fetched_at` has outlived `window`.
pub fn is_stale(now: DateTime<Utc>, fetched_at: DateTime<Utc>, window: Duration) -> bool {
    now.signed_duration_since(fetched_at) >= window
}

/// Fetches the raw knowledge document.
#[async_trait]
pub trait FetchKnowledge: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// HTTP fetcher for the deployed site's knowledge-base.txt.
pub struct HttpFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl FetchKnowledge for HttpFetcher {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::UpstreamKnowledge(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamKnowledge(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::UpstreamKnowledge(format!("body read failed: {}", e)))
    }
}

struct CachedDocument {
    content: String,
    fetched_at: DateTime<Utc>,
}

enum Backing {
    Remote(Box<dyn FetchKnowledge>),
    Embedded,
}

/// Serves the knowledge document, refreshing a process-wide cache at most
/// once per staleness window.
pub struct KnowledgeProvider {
    backing: Backing,
    cache: RwLock<Option<CachedDocument>>,
    window: Duration,
}

impl KnowledgeProvider {
    /// Provider backed by a remote fetch with caching and fallback.
    pub fn remote(fetcher: impl FetchKnowledge + 'static) -> Self {
        Self {
            backing: Backing::Remote(Box::new(fetcher)),
            cache: RwLock::new(None),
            window: staleness_window(),
        }
    }

    /// Provider serving the compiled-in document.
    pub fn embedded() -> Self {
        Self {
            backing: Backing::Embedded,
            cache: RwLock::new(None),
            window: staleness_window(),
        }
    }

    /// Get the current knowledge document.
    pub async fn get(&self) -> KnowledgeText {
        self.get_at(Utc::now()).await
    }

    /// Get the current knowledge document, deciding staleness against `now`.
    pub async fn get_at(&self, now: DateTime<Utc>) -> KnowledgeText {
        let fetcher = match &self.backing {
            Backing::Embedded => {
                return KnowledgeText {
                    content: EMBEDDED_KNOWLEDGE.to_string(),
                    fetched_at: now,
                    origin: KnowledgeOrigin::Embedded,
                }
            }
            Backing::Remote(fetcher) => fetcher,
        };

        {
            let cache = self.cache.read().await;
            if let Some(doc) = cache.as_ref() {
                if !is_stale(now, doc.fetched_at, self.window) {
                    debug!("serving knowledge document from cache");
                    return KnowledgeText {
                        content: doc.content.clone(),
                        fetched_at: doc.fetched_at,
                        origin: KnowledgeOrigin::Remote,
                    };
                }
            }
        }

        // Overlapping misses may fetch twice; the write is idempotent and the
        // last writer wins.
        match fetcher.fetch().await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(size = text.len(), "knowledge document refreshed");
                let mut cache = self.cache.write().await;
                *cache = Some(CachedDocument {
                    content: text.clone(),
                    fetched_at: now,
                });
                KnowledgeText {
                    content: text,
                    fetched_at: now,
                    origin: KnowledgeOrigin::Remote,
                }
            }
            Ok(_) => {
                warn!("knowledge document was empty, using fallback");
                KnowledgeText::fallback(now)
            }
            Err(e) => {
                warn!(error = %e, "knowledge fetch failed, using fallback");
                KnowledgeText::fallback(now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct ScriptedFetcher {
        calls: Arc<AtomicUsize>,
        responses: Mutex<VecDeque<Result<String>>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<String>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let fetcher = Self {
                calls: calls.clone(),
                responses: Mutex::new(responses.into()),
            };
            (fetcher, calls)
        }
    }

    #[async_trait]
    impl FetchKnowledge for ScriptedFetcher {
        async fn fetch(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::UpstreamKnowledge("script exhausted".to_string())))
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_is_stale_boundaries() {
        let window = staleness_window();
        assert!(!is_stale(at(0), at(0), window));
        assert!(!is_stale(at(299), at(0), window));
        assert!(is_stale(at(300), at(0), window));
        assert!(is_stale(at(301), at(0), window));
    }

    #[tokio::test]
    async fn test_cache_hit_within_window_fetches_once() {
        let (fetcher, calls) = ScriptedFetcher::new(vec![Ok("doc v1".to_string())]);
        let provider = KnowledgeProvider::remote(fetcher);

        let first = provider.get_at(at(0)).await;
        let second = provider.get_at(at(60)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.content, "doc v1");
        assert_eq!(second.content, first.content);
        assert_eq!(second.fetched_at, first.fetched_at);
        assert_eq!(second.origin, KnowledgeOrigin::Remote);
    }

    #[tokio::test]
    async fn test_refetch_after_window() {
        let (fetcher, calls) =
            ScriptedFetcher::new(vec![Ok("doc v1".to_string()), Ok("doc v2".to_string())]);
        let provider = KnowledgeProvider::remote(fetcher);

        provider.get_at(at(0)).await;
        let refreshed = provider.get_at(at(301)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.content, "doc v2");
        assert_eq!(refreshed.fetched_at, at(301));
    }

    #[tokio::test]
    async fn test_failed_fetch_returns_fallback() {
        let (fetcher, _) = ScriptedFetcher::new(vec![Err(Error::UpstreamKnowledge(
            "HTTP 503".to_string(),
        ))]);
        let provider = KnowledgeProvider::remote(fetcher);

        let text = provider.get_at(at(0)).await;
        assert_eq!(text.origin, KnowledgeOrigin::Fallback);
        assert!(!text.content.trim().is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_returns_fallback() {
        let (fetcher, _) = ScriptedFetcher::new(vec![Ok("   \n".to_string())]);
        let provider = KnowledgeProvider::remote(fetcher);

        let text = provider.get_at(at(0)).await;
        assert_eq!(text.origin, KnowledgeOrigin::Fallback);
        assert!(!text.content.trim().is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_poison_cache() {
        let (fetcher, calls) = ScriptedFetcher::new(vec![
            Err(Error::UpstreamKnowledge("HTTP 503".to_string())),
            Ok("doc v1".to_string()),
        ]);
        let provider = KnowledgeProvider::remote(fetcher);

        let degraded = provider.get_at(at(0)).await;
        assert_eq!(degraded.origin, KnowledgeOrigin::Fallback);

        // The failed attempt left the cache empty, so the next call fetches.
        let recovered = provider.get_at(at(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(recovered.origin, KnowledgeOrigin::Remote);
        assert_eq!(recovered.content, "doc v1");
    }

    #[tokio::test]
    async fn test_embedded_never_fetches() {
        let provider = KnowledgeProvider::embedded();
        let text = provider.get_at(at(0)).await;
        assert_eq!(text.origin, KnowledgeOrigin::Embedded);
        assert!(text.content.contains("PROYECTOS"));
    }
}
