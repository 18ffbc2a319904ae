// ABOUTME: Stateless document number generator service
// ABOUTME: Previews, atomic increments, resets, and two-phase reservations

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use kiln_core::{DocumentTemplate, GenerationContext};

use crate::error::{NumberingError, NumberingResult};
use crate::policy;
use crate::render::render;
use crate::store::TemplateStore;
use crate::token::{parse_format, validate_format, Token};

/// How many times an increment re-reads and retries after a lost
/// compare-and-swap before surfacing `ConcurrentModification`
pub const MAX_CAS_ATTEMPTS: usize = 3;

/// A rendered preview of the next document number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedNumber {
    pub document_number: String,
    pub next_sequence: i64,
}

/// A preview whose result doubles as a commit token.
///
/// Committing succeeds only while `sequence` is still the next value for the
/// template, so a reservation can never issue a duplicate number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberReservation {
    pub template_id: String,
    pub document_number: String,
    pub sequence: i64,
}

/// Document number generator.
///
/// Logically stateless per call; every operation runs to completion within
/// one request against the backing store.
pub struct NumberGenerator {
    store: Arc<dyn TemplateStore>,
}

impl NumberGenerator {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Computes the next document number without persisting anything.
    ///
    /// Safe to call repeatedly: two previews without an intervening
    /// increment return identical results.
    pub async fn preview(
        &self,
        template_id: &str,
        context: &GenerationContext,
    ) -> NumberingResult<GeneratedNumber> {
        let template = self.store.load(template_id).await?;
        let tokens = self.parse_template(&template)?;
        require_context(&tokens, context)?;

        let next_sequence = template.last_number + 1;
        let document_number = render(&tokens, template.document_type, context, next_sequence);

        Ok(GeneratedNumber {
            document_number,
            next_sequence,
        })
    }

    /// Previews the next number and wraps it as a commit token.
    pub async fn reserve(
        &self,
        template_id: &str,
        context: &GenerationContext,
    ) -> NumberingResult<NumberReservation> {
        let generated = self.preview(template_id, context).await?;

        Ok(NumberReservation {
            template_id: template_id.to_string(),
            document_number: generated.document_number,
            sequence: generated.next_sequence,
        })
    }

    /// Claims a reserved sequence value with a single compare-and-swap.
    ///
    /// No retry and no reset-policy evaluation: the reserved number is
    /// already printed on a document, so if the counter has moved the only
    /// correct outcome is a stale-reservation failure.
    pub async fn commit(&self, reservation: &NumberReservation) -> NumberingResult<i64> {
        if reservation.sequence < 1 {
            return Err(NumberingError::validation(
                "sequence",
                "reserved sequence must be at least 1",
            ));
        }

        let swapped = self
            .store
            .compare_and_swap_last_number(
                &reservation.template_id,
                reservation.sequence - 1,
                reservation.sequence,
            )
            .await?;

        if swapped {
            debug!(
                template_id = %reservation.template_id,
                sequence = reservation.sequence,
                "committed reserved document number"
            );
            Ok(reservation.sequence)
        } else {
            Err(NumberingError::StaleReservation(reservation.sequence))
        }
    }

    /// Advances the sequence counter, applying the template's reset policy.
    ///
    /// Called only after a document using the number has been durably
    /// created. Retries the read-modify-write a bounded number of times when
    /// a concurrent increment wins the swap. Returns the new `last_number`.
    pub async fn increment(
        &self,
        template_id: &str,
        issued_date: Option<NaiveDate>,
    ) -> NumberingResult<i64> {
        let issued_date = issued_date.unwrap_or_else(|| Utc::now().date_naive());

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let template = self.store.load(template_id).await?;
            let base = policy::resolve_base(
                template.reset_policy,
                template.last_number,
                template.updated_at,
                issued_date,
            );
            let next = base + 1;

            let swapped = self
                .store
                .compare_and_swap_last_number(template_id, template.last_number, next)
                .await?;

            if swapped {
                debug!(template_id, last_number = next, "sequence advanced");
                return Ok(next);
            }

            warn!(
                template_id,
                attempt, "lost sequence compare-and-swap, retrying"
            );
        }

        Err(NumberingError::ConcurrentModification)
    }

    /// Administrative reset: `last_number` back to 0, regardless of policy.
    /// Idempotent; resetting an already-zero counter is a plain success.
    pub async fn reset(&self, template_id: &str) -> NumberingResult<i64> {
        self.store.reset_last_number(template_id).await?;
        debug!(template_id, "sequence reset to 0");
        Ok(0)
    }

    fn parse_template(&self, template: &DocumentTemplate) -> NumberingResult<Vec<Token>> {
        // Formats are validated at write time; a failure here means the
        // stored record predates validation or was edited out of band.
        validate_format(&template.format)?;
        Ok(parse_format(&template.format))
    }
}

fn require_context(tokens: &[Token], context: &GenerationContext) -> NumberingResult<()> {
    if tokens.contains(&Token::CompanyCode) && context.company_code.trim().is_empty() {
        return Err(NumberingError::validation(
            "company_code",
            "company code is required by this format",
        ));
    }

    if tokens.contains(&Token::BranchCode) && context.branch_code.trim().is_empty() {
        return Err(NumberingError::validation(
            "branch_code",
            "branch code is required by this format",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use kiln_core::{DocumentType, ResetPolicy};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory template store for exercising the generator without a
    /// database. The mutex makes the swap atomic, matching the contract.
    struct MemoryTemplateStore {
        templates: Mutex<HashMap<String, DocumentTemplate>>,
    }

    impl MemoryTemplateStore {
        fn with(templates: Vec<DocumentTemplate>) -> Arc<Self> {
            let map = templates.into_iter().map(|t| (t.id.clone(), t)).collect();
            Arc::new(Self {
                templates: Mutex::new(map),
            })
        }

        fn last_number(&self, id: &str) -> i64 {
            self.templates.lock().unwrap()[id].last_number
        }
    }

    #[async_trait]
    impl TemplateStore for MemoryTemplateStore {
        async fn load(&self, template_id: &str) -> NumberingResult<DocumentTemplate> {
            self.templates
                .lock()
                .unwrap()
                .get(template_id)
                .cloned()
                .ok_or(NumberingError::TemplateNotFound)
        }

        async fn compare_and_swap_last_number(
            &self,
            template_id: &str,
            expected: i64,
            next: i64,
        ) -> NumberingResult<bool> {
            let mut templates = self.templates.lock().unwrap();
            let template = templates
                .get_mut(template_id)
                .ok_or(NumberingError::TemplateNotFound)?;

            if template.last_number != expected {
                return Ok(false);
            }

            template.last_number = next;
            template.updated_at = Utc::now();
            Ok(true)
        }

        async fn reset_last_number(&self, template_id: &str) -> NumberingResult<()> {
            let mut templates = self.templates.lock().unwrap();
            let template = templates
                .get_mut(template_id)
                .ok_or(NumberingError::TemplateNotFound)?;

            template.last_number = 0;
            template.updated_at = Utc::now();
            Ok(())
        }
    }

    fn march_7() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 10, 0, 0).unwrap()
    }

    fn template(id: &str, last_number: i64, reset_policy: ResetPolicy) -> DocumentTemplate {
        DocumentTemplate {
            id: id.to_string(),
            company_id: "acme".to_string(),
            document_type: DocumentType::Invoice,
            format: "{COMP}-{TYPE}-{YYYY}-{MM}-{####}".to_string(),
            last_number,
            reset_policy,
            created_at: march_7(),
            updated_at: march_7(),
        }
    }

    fn context() -> GenerationContext {
        GenerationContext {
            company_code: "ACME".to_string(),
            branch_code: String::new(),
            issued_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_preview_renders_candidate_number() {
        let store = MemoryTemplateStore::with(vec![template("t1", 41, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store);

        let generated = generator.preview("t1", &context()).await.unwrap();

        assert_eq!(generated.document_number, "ACME-INVOICE-2025-03-0042");
        assert_eq!(generated.next_sequence, 42);
    }

    #[tokio::test]
    async fn test_preview_is_side_effect_free() {
        let store = MemoryTemplateStore::with(vec![template("t1", 41, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store.clone());

        let first = generator.preview("t1", &context()).await.unwrap();
        let second = generator.preview("t1", &context()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.last_number("t1"), 41);
    }

    #[tokio::test]
    async fn test_preview_unknown_template() {
        let store = MemoryTemplateStore::with(vec![]);
        let generator = NumberGenerator::new(store);

        let err = generator.preview("missing", &context()).await.unwrap_err();
        assert!(matches!(err, NumberingError::TemplateNotFound));
    }

    #[tokio::test]
    async fn test_preview_rejects_stored_invalid_format() {
        let mut bad = template("t1", 0, ResetPolicy::None);
        bad.format = "{COMP}-{BOGUS}".to_string();
        let store = MemoryTemplateStore::with(vec![bad]);
        let generator = NumberGenerator::new(store);

        let err = generator.preview("t1", &context()).await.unwrap_err();
        assert!(matches!(err, NumberingError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn test_preview_requires_company_code() {
        let store = MemoryTemplateStore::with(vec![template("t1", 0, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store);

        let mut ctx = context();
        ctx.company_code = "  ".to_string();

        let err = generator.preview("t1", &ctx).await.unwrap_err();
        assert!(matches!(err, NumberingError::Validation { ref field, .. } if field == "company_code"));
    }

    #[tokio::test]
    async fn test_preview_requires_branch_code_only_when_used() {
        let mut with_branch = template("t1", 0, ResetPolicy::None);
        with_branch.format = "{BRANCH}-{SEQ}".to_string();
        let store = MemoryTemplateStore::with(vec![with_branch]);
        let generator = NumberGenerator::new(store);

        let err = generator.preview("t1", &context()).await.unwrap_err();
        assert!(matches!(err, NumberingError::Validation { ref field, .. } if field == "branch_code"));
    }

    #[tokio::test]
    async fn test_increment_is_strictly_increasing() {
        let store = MemoryTemplateStore::with(vec![template("t1", 3, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store);
        let issued = Some(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());

        for expected in 4..=8 {
            let value = generator.increment("t1", issued).await.unwrap();
            assert_eq!(value, expected);
        }
    }

    #[tokio::test]
    async fn test_increment_daily_policy_resets_on_new_day() {
        let store = MemoryTemplateStore::with(vec![template("t1", 5, ResetPolicy::Daily)]);
        let generator = NumberGenerator::new(store);

        let next_day = Some(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        let value = generator.increment("t1", next_day).await.unwrap();

        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_increment_none_policy_continues_across_days() {
        let store = MemoryTemplateStore::with(vec![template("t1", 5, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store);

        let next_day = Some(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        let value = generator.increment("t1", next_day).await.unwrap();

        assert_eq!(value, 6);
    }

    #[tokio::test]
    async fn test_increment_monthly_policy_resets_on_new_month() {
        let store = MemoryTemplateStore::with(vec![template("t1", 17, ResetPolicy::Monthly)]);
        let generator = NumberGenerator::new(store);

        let same_month = Some(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(generator.increment("t1", same_month).await.unwrap(), 18);

        let next_month = Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(generator.increment("t1", next_month).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let store = MemoryTemplateStore::with(vec![template("t1", 99, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store.clone());

        assert_eq!(generator.reset("t1").await.unwrap(), 0);
        assert_eq!(generator.reset("t1").await.unwrap(), 0);
        assert_eq!(store.last_number("t1"), 0);
    }

    #[tokio::test]
    async fn test_reserve_then_commit() {
        let store = MemoryTemplateStore::with(vec![template("t1", 41, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store.clone());

        let reservation = generator.reserve("t1", &context()).await.unwrap();
        assert_eq!(reservation.document_number, "ACME-INVOICE-2025-03-0042");
        assert_eq!(reservation.sequence, 42);

        // Reserving does not move the counter
        assert_eq!(store.last_number("t1"), 41);

        let committed = generator.commit(&reservation).await.unwrap();
        assert_eq!(committed, 42);
        assert_eq!(store.last_number("t1"), 42);
    }

    #[tokio::test]
    async fn test_commit_stale_reservation_fails() {
        let store = MemoryTemplateStore::with(vec![template("t1", 41, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store);

        let reservation = generator.reserve("t1", &context()).await.unwrap();

        // Another caller advances the counter first
        let issued = Some(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
        generator.increment("t1", issued).await.unwrap();

        let err = generator.commit(&reservation).await.unwrap_err();
        assert!(matches!(err, NumberingError::StaleReservation(42)));
    }

    #[tokio::test]
    async fn test_commit_twice_fails_second_time() {
        let store = MemoryTemplateStore::with(vec![template("t1", 0, ResetPolicy::None)]);
        let generator = NumberGenerator::new(store);

        let reservation = generator.reserve("t1", &context()).await.unwrap();
        generator.commit(&reservation).await.unwrap();

        let err = generator.commit(&reservation).await.unwrap_err();
        assert!(matches!(err, NumberingError::StaleReservation(1)));
    }
}
