use std::collections::HashSet;

use tracing::{debug, warn};

use crate::engine::records::JobFormDescriptor;
use crate::models::posting::JobPostingRow;

/// Splits a raw form field on newlines and commas, trimming each piece and
/// dropping empties.
pub fn split_forms(raw: &str) -> Vec<String> {
    raw.lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|form| !form.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expands raw postings into one descriptor per listed form.
///
/// Duplicate `(organization, form)` pairs keep the first posting seen.
/// Postings whose form field yields nothing are skipped.
pub fn expand_postings(postings: &[JobPostingRow]) -> Vec<JobFormDescriptor> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut descriptors = Vec::new();

    for posting in postings {
        let forms = split_forms(&posting.forms);
        if forms.is_empty() {
            warn!(posting_id = posting.id, "Posting has no usable form label, skipping");
            continue;
        }

        for form in forms {
            let Ok(descriptor) = JobFormDescriptor::new(&posting.organization, &form) else {
                continue;
            };
            let identity = (descriptor.organization.clone(), descriptor.form.clone());
            if !seen.insert(identity) {
                continue;
            }
            descriptors.push(descriptor.with_posting(posting.id, posting.title.as_deref()));
        }
    }

    debug!(
        postings = postings.len(),
        descriptors = descriptors.len(),
        "Expanded postings into job-form descriptors"
    );
    descriptors
}
