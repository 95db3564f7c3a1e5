use super::*;

fn images(names: &[&str]) -> Vec<ImageAsset> {
    names.iter().map(|n| ImageAsset::fetched(*n)).collect()
}

fn pairs(items: &[WorkItem]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|w| {
            (
                w.text.text.clone(),
                w.image.path().to_string_lossy().into_owned(),
            )
        })
        .collect()
}

#[test]
fn shorter_image_list_cycles_from_the_start() {
    let texts = TextSegment::from_texts(&["a", "b", "c"]);
    let out = pair(&texts, &images(&["i1", "i2"]));
    assert_eq!(
        pairs(&out),
        vec![
            ("a".into(), "i1".into()),
            ("b".into(), "i2".into()),
            ("c".into(), "i1".into()),
        ]
    );
    assert_eq!(out.iter().map(|w| w.index).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn shorter_text_list_cycles_too() {
    let texts = TextSegment::from_texts(&["a", "b"]);
    let out = pair(&texts, &images(&["i1", "i2", "i3", "i4", "i5"]));
    assert_eq!(out.len(), 5);
    let t: Vec<_> = out.iter().map(|w| w.text.index).collect();
    assert_eq!(t, vec![0, 1, 0, 1, 0]);
}

#[test]
fn equal_lengths_pair_one_to_one() {
    let texts = TextSegment::from_texts(&["a", "b"]);
    let out = pair(&texts, &images(&["i1", "i2"]));
    assert_eq!(
        pairs(&out),
        vec![("a".into(), "i1".into()), ("b".into(), "i2".into())]
    );
}

#[test]
fn empty_side_yields_nothing() {
    let texts = TextSegment::from_texts(&["a"]);
    assert!(pair(&texts, &[]).is_empty());
    assert!(pair(&[], &images(&["i1"])).is_empty());
}
