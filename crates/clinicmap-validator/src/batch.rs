//! Whole-collection validation in bounded, sequential chunks.

use clinicmap_core::LocationRecord;
use clinicmap_geocoder::Geocoder;
use futures::future::join_all;

use crate::types::ValidationResult;
use crate::validator::LocationValidator;

const PROGRESS_EVERY: usize = 100;

impl<G: Geocoder> LocationValidator<G> {
    /// Validates `records` in chunks of `batch_size`.
    ///
    /// Records within a chunk run concurrently; the next chunk starts only
    /// after the current one settles, so at most `batch_size` validations are
    /// outstanding at once. The output has one result per input record, in
    /// input order. A `batch_size` of zero is treated as one.
    pub async fn validate_all(
        &self,
        records: &[LocationRecord],
        batch_size: usize,
    ) -> Vec<ValidationResult> {
        let batch_size = batch_size.max(1);
        let total = records.len();
        let batches = total.div_ceil(batch_size);
        let mut results = Vec::with_capacity(total);

        tracing::info!(total, batch_size, batches, "starting location validation");

        for (index, chunk) in records.chunks(batch_size).enumerate() {
            tracing::debug!(batch = index + 1, batches, "processing batch");

            let before = results.len();
            results.extend(join_all(chunk.iter().map(|record| self.validate(record))).await);
            let completed = results.len();

            if completed / PROGRESS_EVERY > before / PROGRESS_EVERY || completed == total {
                let needs_correction = results.iter().filter(|r| r.correction_needed).count();
                tracing::info!(completed, total, needs_correction, "validation progress");
            }
        }

        results
    }
}
