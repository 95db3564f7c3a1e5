use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target")
        .join("unit-scratch")
        .join("assets-font")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn unreadable_preferred_font_never_fails_the_caller() {
    let dir = scratch_dir("unreadable");
    let resolver = FontResolver::new(dir.join("cache"));

    let asset = resolver.resolve(Some(Path::new("no/such/font.ttf")));
    match &asset {
        FontAsset::File(p) => {
            assert_ne!(p, Path::new("no/such/font.ttf"));
            assert!(load_font_bytes(p).is_ok());
        }
        FontAsset::Builtin => assert!(asset.path().is_none()),
    }
}

#[test]
fn garbage_font_file_is_rejected() {
    let dir = scratch_dir("garbage");
    let bogus = dir.join("bogus.ttf");
    std::fs::write(&bogus, b"not a font at all").unwrap();

    let err = load_font_bytes(&bogus).unwrap_err();
    assert!(matches!(err, ReelError::Asset { .. }));

    let resolved = FontResolver::new(dir.join("cache")).resolve(Some(&bogus));
    assert_ne!(resolved, FontAsset::File(bogus));
}

#[test]
fn fallback_materialization_is_idempotent() {
    let dir = scratch_dir("idempotent");
    let resolver = FontResolver::new(dir.join("cache"));

    let first = resolver.resolve(None);
    let second = resolver.resolve(None);
    assert_eq!(first, second);

    if let FontAsset::File(p) = &first {
        assert_eq!(p, &resolver.fallback_path());
        let entries = std::fs::read_dir(resolver.cache_dir()).unwrap().count();
        assert_eq!(entries, 1);
    }
}

#[test]
fn materialized_fallback_is_usable_as_preferred_font() {
    let dir = scratch_dir("reuse");
    let resolver = FontResolver::new(dir.join("cache"));
    if let FontAsset::File(p) = resolver.resolve(None) {
        assert_eq!(resolver.resolve(Some(&p)), FontAsset::File(p));
    }
}
