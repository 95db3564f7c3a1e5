use super::*;

#[test]
fn slug_folds_accents_and_collapses_separators() {
    assert_eq!(slug("Año Nuevo: ¡Fiesta!"), "ano-nuevo-fiesta");
    assert_eq!(slug("  --Hello   World--  "), "hello-world");
}

#[test]
fn slug_has_a_fallback_and_a_length_cap() {
    assert_eq!(slug(""), "reel");
    assert_eq!(slug("!!!"), "reel");
    let long = slug(&"a".repeat(200));
    assert_eq!(long.len(), SLUG_MAX_LEN);
}

#[test]
fn run_ids_differ_for_the_same_title() {
    let a = run_id("Same title");
    let b = run_id("Same title");
    assert_ne!(a, b);
    assert!(a.starts_with("same-title-"));
}
