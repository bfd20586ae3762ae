use assessor_core::assessment::{AssessmentRequest, Content, TaskKind};
use proptest::prelude::*;

/// Strategy for text-like task kinds (content is hashed verbatim)
pub fn text_task_kind_strategy() -> impl Strategy<Value = TaskKind> {
    prop_oneof![Just(TaskKind::Text), Just(TaskKind::Table)]
}

/// Strategy for free-form submission text, including whitespace and unicode
pub fn submission_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,;:!?\\n\\téü中]{0,80}"
}

/// Strategy for content fields as either text or raw bytes
pub fn content_strategy() -> impl Strategy<Value = Content> {
    prop_oneof![
        submission_text_strategy().prop_map(Content::Text),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Content::Bytes),
    ]
}

/// Strategy for complete text or table assessment requests
pub fn text_request_strategy() -> impl Strategy<Value = AssessmentRequest> {
    (
        text_task_kind_strategy(),
        content_strategy(),
        content_strategy(),
        content_strategy(),
    )
        .prop_map(|(task_kind, reference, template, student_response)| {
            AssessmentRequest::new(task_kind, reference, template, student_response)
        })
}

/// Strategy for fingerprint secrets
pub fn secret_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,32}"
}

/// Strategy for (key, size) insertion sequences against a small byte budget
pub fn insertion_sequence_strategy() -> impl Strategy<Value = Vec<(u8, usize)>> {
    prop::collection::vec((0u8..16, 1usize..400), 1..60)
}
