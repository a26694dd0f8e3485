//! CORS policy built from the configured origin list.

use axum::http::{HeaderValue, Method, header, request::Parts};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// One entry of the allowed-origins list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPattern {
  /// `*`: any origin.
  Any,
  /// A literal origin such as `http://localhost:3000`.
  Exact(String),
  /// `scheme://*.suffix`: any single or nested subdomain of `suffix`.
  Subdomain { scheme: String, suffix: String },
}

impl OriginPattern {
  pub fn parse(s: &str) -> Self {
    let s = s.trim().trim_end_matches('/');
    if s == "*" {
      return Self::Any;
    }
    if let Some((scheme, host)) = s.split_once("://")
      && let Some(rest) = host.strip_prefix('*')
      && rest.starts_with('.')
    {
      return Self::Subdomain {
        scheme: format!("{}://", scheme.to_ascii_lowercase()),
        suffix: rest.to_ascii_lowercase(),
      };
    }
    Self::Exact(s.to_ascii_lowercase())
  }

  pub fn matches(&self, origin: &str) -> bool {
    let origin = origin.to_ascii_lowercase();
    match self {
      Self::Any => true,
      Self::Exact(o) => *o == origin,
      Self::Subdomain { scheme, suffix } => origin
        .strip_prefix(scheme.as_str())
        .and_then(|host| host.strip_suffix(suffix.as_str()))
        .is_some_and(|label| !label.is_empty() && !label.contains('/')),
    }
  }
}

/// Build a [`CorsLayer`] that admits exactly the configured origins.
pub fn layer(allowed_origins: &[String]) -> CorsLayer {
  let patterns: Vec<OriginPattern> =
    allowed_origins.iter().map(|s| OriginPattern::parse(s)).collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::predicate(
      move |origin: &HeaderValue, _: &Parts| {
        origin
          .to_str()
          .is_ok_and(|o| patterns.iter().any(|p| p.matches(o)))
      },
    ))
    .allow_methods([Method::GET, Method::POST, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE])
    .allow_credentials(true)
}
