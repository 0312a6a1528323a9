use super::*;

#[test]
fn normalize_maps_editor_ids() {
    let ctx = LanguageContext::default();
    let cases = [
        ("java", CompletionLanguage::Java),
        ("python", CompletionLanguage::Python),
        ("javascriptreact", CompletionLanguage::Jsx),
        ("javascript", CompletionLanguage::JavaScript),
        ("typescript", CompletionLanguage::TypeScript),
        ("typescriptreact", CompletionLanguage::Tsx),
        ("csharp", CompletionLanguage::CSharp),
        ("cpp", CompletionLanguage::Cpp),
        ("shellscript", CompletionLanguage::Shell),
        ("sql", CompletionLanguage::Sql),
    ];
    for (id, expected) in cases {
        assert_eq!(ctx.normalize(id), expected, "editor id {id}");
    }
    assert_eq!(ctx.len(), 17);
}

#[test]
fn unknown_id_falls_back_to_plaintext() {
    let ctx = LanguageContext::default();
    assert_eq!(ctx.normalize("markdown"), CompletionLanguage::Plaintext);
    assert_eq!(ctx.map("markdown"), None);
    assert!(!ctx.is_supported("markdown"));
    assert!(!ctx.is_supported("plaintext"));
}

#[test]
fn is_supported_accepts_both_naming_schemes() {
    let ctx = LanguageContext::default();
    assert!(ctx.is_supported("typescriptreact"));
    assert!(ctx.is_supported("tsx"));
    assert!(ctx.is_supported("shellscript"));
    assert!(ctx.is_supported("shell"));
    assert!(!ctx.is_supported("TypeScript"));
}

#[test]
fn collapse_dialect_only_folds_jsx_variants() {
    let ctx = LanguageContext::default();
    assert_eq!(ctx.normalize("typescriptreact"), CompletionLanguage::Tsx);
    assert_eq!(
        ctx.collapse_dialect(CompletionLanguage::Tsx),
        CompletionLanguage::TypeScript
    );
    assert_eq!(
        ctx.collapse_dialect(CompletionLanguage::Jsx),
        CompletionLanguage::JavaScript
    );
    assert_eq!(
        ctx.collapse_dialect(CompletionLanguage::Python),
        CompletionLanguage::Python
    );
    assert_eq!(
        ctx.collapse_dialect(CompletionLanguage::Plaintext),
        CompletionLanguage::Plaintext
    );
}

#[test]
fn request_language_never_carries_raw_editor_id() {
    let ctx = LanguageContext::default();
    assert_eq!(
        ctx.request_language("javascriptreact"),
        CompletionLanguage::JavaScript
    );
    assert_eq!(ctx.request_language("typescriptreact").as_str(), "typescript");
}

#[test]
fn wire_names_round_trip() {
    for (_, lang) in DEFAULT_MAPPINGS {
        assert_eq!(CompletionLanguage::from_name(lang.as_str()), Some(*lang));
    }
    assert_eq!(CompletionLanguage::from_name("cobol"), None);
    assert_eq!(
        serde_json::to_string(&CompletionLanguage::CSharp).unwrap(),
        "\"csharp\""
    );
}

#[test]
fn custom_table_only_supports_its_entries() {
    let ctx = LanguageContext::with_mappings([("rust", CompletionLanguage::Rust)]);
    assert!(ctx.is_supported("rust"));
    assert!(!ctx.is_supported("python"));
    assert_eq!(ctx.normalize("python"), CompletionLanguage::Plaintext);
}

#[test]
fn parse_rejects_editor_ids() {
    assert_eq!("tsx".parse::<CompletionLanguage>(), Ok(CompletionLanguage::Tsx));
    let err = "typescriptreact".parse::<CompletionLanguage>().unwrap_err();
    assert_eq!(err, UnknownLanguage("typescriptreact".to_string()));
}
