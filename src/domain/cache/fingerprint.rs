//! Request fingerprinting
//!
//! A fingerprint identifies a cacheable request: same user, semantically
//! identical prompt, same stability-relevant context, same endpoint, same
//! model. It reuses the retrieval layer's context normalization so the
//! cache and the retrieval engine agree on which fields matter.

use sha2::{Digest, Sha256};

use crate::domain::retrieval::RetrievalContext;

use super::entry::Endpoint;

/// Delimiter between fingerprint components. Explicit delimiters keep
/// `("ab", "c")` and `("a", "bc")` from colliding.
const DELIMITER: char = '\u{1f}';

/// Deterministic SHA-256 fingerprint generator
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter;

impl Fingerprinter {
    pub fn new() -> Self {
        Self
    }

    /// Derives the fingerprint for a request.
    ///
    /// The prompt is normalized (trim + casefold) so trivially reworded
    /// whitespace/case variants share an entry. Only the context's stable
    /// fields participate; volatile fields never reach the digest. If
    /// normalization ever fails internally, the error path degrades to a
    /// unique key so the failure costs a cache miss, never a false hit.
    pub fn fingerprint(
        &self,
        user_id: &str,
        prompt: &str,
        context: &RetrievalContext,
        endpoint: Endpoint,
        model_id: &str,
    ) -> String {
        match self.try_fingerprint(user_id, prompt, context, endpoint, model_id) {
            Ok(fp) => fp,
            Err(message) => {
                tracing::warn!(%message, "fingerprint normalization failed, degrading to always-miss key");
                fallback_key()
            }
        }
    }

    // No step in here can currently fail; the Err path above is the
    // standing contract for when normalization gains fallible pieces
    // (locale-aware casefolding, configurable field sets): a failure must
    // cost a miss, never a false hit.
    fn try_fingerprint(
        &self,
        user_id: &str,
        prompt: &str,
        context: &RetrievalContext,
        endpoint: Endpoint,
        model_id: &str,
    ) -> Result<String, String> {
        let normalized_prompt = normalize_prompt(prompt);

        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update([DELIMITER as u8]);
        hasher.update(normalized_prompt.as_bytes());

        for (name, value) in context.stable_fields() {
            hasher.update([DELIMITER as u8]);
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }

        hasher.update([DELIMITER as u8]);
        hasher.update(endpoint.as_str().as_bytes());
        hasher.update([DELIMITER as u8]);
        hasher.update(model_id.as_bytes());

        Ok(hex::encode(hasher.finalize()))
    }
}

/// Trim plus Unicode-aware casefold (lowercase covers the prompt languages
/// this assistant serves).
fn normalize_prompt(prompt: &str) -> String {
    prompt.trim().to_lowercase()
}

/// Unique always-miss key. Shaped so it can never collide with a real
/// SHA-256 hex fingerprint or with another fallback.
fn fallback_key() -> String {
    format!("miss-{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(
        user: &str,
        prompt: &str,
        ctx: &RetrievalContext,
        endpoint: Endpoint,
        model: &str,
    ) -> String {
        Fingerprinter::new().fingerprint(user, prompt, ctx, endpoint, model)
    }

    #[test]
    fn test_identical_inputs_yield_identical_fingerprints() {
        let ctx = RetrievalContext::new().with_goal("strength");

        let a = fp("user-1", "How do I squat?", &ctx, Endpoint::CoachChat, "coach-v2");
        let b = fp("user-1", "How do I squat?", &ctx, Endpoint::CoachChat, "coach-v2");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // sha-256 hex
    }

    #[test]
    fn test_prompt_is_trimmed_and_casefolded() {
        let ctx = RetrievalContext::new();

        let a = fp("user-1", "  How do I SQUAT?  ", &ctx, Endpoint::CoachChat, "coach-v2");
        let b = fp("user-1", "how do i squat?", &ctx, Endpoint::CoachChat, "coach-v2");

        assert_eq!(a, b);
    }

    #[test]
    fn test_volatile_context_fields_do_not_change_fingerprint() {
        let stable = RetrievalContext::new().with_goal("strength");
        let noisy = RetrievalContext::new()
            .with_goal("strength")
            .with_extra("request_timestamp", "2026-08-23T09:41:00Z")
            .with_extra("session_id", "abc");

        let a = fp("user-1", "plan my week", &stable, Endpoint::WorkoutPlan, "coach-v2");
        let b = fp("user-1", "plan my week", &noisy, Endpoint::WorkoutPlan, "coach-v2");

        assert_eq!(a, b);
    }

    #[test]
    fn test_each_component_changes_fingerprint() {
        let ctx = RetrievalContext::new().with_goal("strength");
        let base = fp("user-1", "plan my week", &ctx, Endpoint::WorkoutPlan, "coach-v2");

        assert_ne!(base, fp("user-2", "plan my week", &ctx, Endpoint::WorkoutPlan, "coach-v2"));
        assert_ne!(base, fp("user-1", "plan my month", &ctx, Endpoint::WorkoutPlan, "coach-v2"));
        assert_ne!(base, fp("user-1", "plan my week", &ctx, Endpoint::CoachChat, "coach-v2"));
        assert_ne!(base, fp("user-1", "plan my week", &ctx, Endpoint::WorkoutPlan, "coach-v3"));

        let other_ctx = RetrievalContext::new().with_goal("endurance");
        assert_ne!(base, fp("user-1", "plan my week", &other_ctx, Endpoint::WorkoutPlan, "coach-v2"));
    }

    #[test]
    fn test_fallback_keys_never_collide() {
        let a = fallback_key();
        let b = fallback_key();

        assert_ne!(a, b);
        assert!(a.starts_with("miss-"));
        // Distinct shape from a sha-256 hex digest
        assert_ne!(a.len(), 64);
    }

    #[test]
    fn test_delimiters_prevent_component_bleed() {
        let ctx = RetrievalContext::new();

        let a = fp("user-1", "ab", &ctx, Endpoint::CoachChat, "m");
        let b = fp("user-1a", "b", &ctx, Endpoint::CoachChat, "m");

        assert_ne!(a, b);
    }
}
