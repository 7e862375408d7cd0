//! `ActingActor` extractor: reads the actor the gateway authenticated.
//!
//! The gateway in front of DocVault authenticates callers and forwards
//! `x-actor-id`, `x-actor-kind` and, when acting inside a company
//! workspace, `x-company-id`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use docvault_core::error::AppError;
use docvault_core::types::{Actor, ActorId, ActorKind};
use docvault_service::RequestContext;

/// Header naming the actor id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header naming the actor kind.
pub const ACTOR_KIND_HEADER: &str = "x-actor-kind";
/// Header naming the company workspace.
pub const COMPANY_ID_HEADER: &str = "x-company-id";

/// Request context of the calling actor.
#[derive(Debug, Clone)]
pub struct ActingActor(pub RequestContext);

impl ActingActor {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for ActingActor {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ActingActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, ACTOR_ID_HEADER)?
            .ok_or_else(|| AppError::unauthenticated("Missing x-actor-id header"))?;
        let kind = header(parts, ACTOR_KIND_HEADER)?
            .ok_or_else(|| AppError::unauthenticated("Missing x-actor-kind header"))?;

        let id = parse_id(ACTOR_ID_HEADER, id)?;
        let kind: ActorKind = kind
            .parse()
            .map_err(|_| AppError::unauthenticated(format!("Invalid x-actor-kind '{kind}'")))?;

        let mut ctx = RequestContext::new(Actor::new(id, kind));
        if let Some(company) = header(parts, COMPANY_ID_HEADER)? {
            ctx = ctx.in_company(parse_id(COMPANY_ID_HEADER, company)?);
        }

        Ok(ActingActor(ctx))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, AppError> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()))
            .map_err(|_| AppError::unauthenticated(format!("Header {name} is not valid text"))),
    }
}

fn parse_id(name: &str, raw: &str) -> Result<ActorId, AppError> {
    raw.parse::<ActorId>()
        .map_err(|_| AppError::unauthenticated(format!("Invalid {name} '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use docvault_core::error::ErrorKind;

    async fn extract(headers: &[(&str, &str)]) -> Result<ActingActor, AppError> {
        let mut builder = Request::builder().uri("/api/nodes");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        ActingActor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_actor_and_company() {
        let actor = extract(&[
            ("x-actor-id", "7"),
            ("x-actor-kind", "freelancer"),
            ("x-company-id", "900"),
        ])
        .await
        .unwrap();
        assert_eq!(actor.actor, Actor::new(ActorId(7), ActorKind::Freelancer));
        assert_eq!(actor.company_context, Some(ActorId(900)));

        let personal = extract(&[("x-actor-id", "42"), ("x-actor-kind", "pf")]).await.unwrap();
        assert!(!personal.has_company());
    }

    #[tokio::test]
    async fn test_missing_or_invalid_headers_are_unauthenticated() {
        for headers in [
            vec![],
            vec![("x-actor-id", "42")],
            vec![("x-actor-id", "abc"), ("x-actor-kind", "pf")],
            vec![("x-actor-id", "42"), ("x-actor-kind", "robot")],
            vec![("x-actor-id", "42"), ("x-actor-kind", "pf"), ("x-company-id", "x")],
        ] {
            let err = extract(&headers).await.unwrap_err();
            assert!(err.is(ErrorKind::Unauthenticated), "{headers:?}");
        }
    }
}
