use fissales_core::{
    ensure_prompt_content, ensure_prompt_name, validate_prompt_name, FisSalesError,
    MAX_CONTENT_CHARS,
};

#[test]
fn accepts_letters_digits_hyphen_underscore() {
    assert!(validate_prompt_name("greeting"));
    assert!(validate_prompt_name("system_prompt-v2"));
    assert!(validate_prompt_name("A1"));
    assert!(validate_prompt_name("_"));
}

#[test]
fn rejects_space_and_punctuation() {
    assert!(!validate_prompt_name("bad name!"));
    assert!(!validate_prompt_name("bad name"));
    assert!(!validate_prompt_name("bad!"));
    assert!(!validate_prompt_name("a/b"));
    assert!(!validate_prompt_name("über"));
}

#[test]
fn rejects_empty_name() {
    assert!(!validate_prompt_name(""));
}

#[test]
fn name_length_boundary() {
    assert!(validate_prompt_name(&"a".repeat(100)));
    assert!(!validate_prompt_name(&"a".repeat(101)));
}

#[test]
fn ensure_prompt_name_produces_validation_error() {
    let err = ensure_prompt_name("bad name!").unwrap_err();
    assert!(matches!(err, FisSalesError::Validation(_)));
    assert!(err.message().contains("bad name!"));
}

#[test]
fn content_at_limit_is_accepted() {
    let content = "x".repeat(MAX_CONTENT_CHARS);
    assert!(ensure_prompt_content(&content).is_ok());
}

#[test]
fn content_over_limit_mentions_limit() {
    let content = "x".repeat(MAX_CONTENT_CHARS + 1);
    let err = ensure_prompt_content(&content).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("50,000"));
}

#[test]
fn content_limit_counts_characters_not_bytes() {
    // 50,000 two-byte characters is 100,000 bytes but still within the limit.
    let content = "é".repeat(MAX_CONTENT_CHARS);
    assert!(ensure_prompt_content(&content).is_ok());
}

#[test]
fn empty_content_is_rejected() {
    let err = ensure_prompt_content("").unwrap_err();
    assert_eq!(err.message(), "Content must be a non-empty string");
}
