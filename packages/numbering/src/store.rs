// ABOUTME: Persistence port the generator depends on
// ABOUTME: Linearizability of concurrent increments is the store's contract

use async_trait::async_trait;

use kiln_core::DocumentTemplate;

use crate::error::NumberingResult;

/// Store abstraction for template records.
///
/// The generator holds no state of its own; all mutable state lives behind
/// this trait. Implementations must make `compare_and_swap_last_number`
/// atomic per template (a conditional update or equivalent) so that two
/// concurrent increments can never both observe the same `last_number`.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Loads a template by id.
    async fn load(&self, template_id: &str) -> NumberingResult<DocumentTemplate>;

    /// Atomically sets `last_number = next` if it still equals `expected`,
    /// stamping `updated_at`. Returns whether the swap was applied.
    async fn compare_and_swap_last_number(
        &self,
        template_id: &str,
        expected: i64,
        next: i64,
    ) -> NumberingResult<bool>;

    /// Unconditionally sets `last_number = 0`, stamping `updated_at`.
    async fn reset_last_number(&self, template_id: &str) -> NumberingResult<()>;
}
