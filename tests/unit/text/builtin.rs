use super::*;

#[test]
fn fold_strips_accents_and_keeps_ascii() {
    assert_eq!(fold('a'), 'a');
    assert_eq!(fold('é'), 'e');
    assert_eq!(fold('Ñ'), 'N');
    assert_eq!(fold('¿'), '?');
    assert_eq!(fold('\u{2014}'), '-');
    assert_eq!(fold('漢'), '?');
}

#[test]
fn advance_scales_with_size_and_char_count() {
    assert_eq!(advance("", 16.0), 0.0);
    // One glyph is five columns wide at 2px per column.
    assert_eq!(advance("A", 16.0), 10.0);
    // Two glyphs: 6 + 5 columns.
    assert_eq!(advance("AB", 16.0), 22.0);
    assert_eq!(advance("AB", 32.0), 44.0);
    assert_eq!(line_height(16.0), 20.0);
}

#[test]
fn space_emits_nothing_and_bar_is_one_merged_run_per_row() {
    let mut n = 0;
    for_each_run(" ", 8.0, |_| n += 1);
    assert_eq!(n, 0);

    let mut rects = Vec::new();
    for_each_run("_", 8.0, |r| rects.push(r));
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0].width(), 5.0);
    assert_eq!(rects[0].height(), 1.0);
}

#[test]
fn glyph_rects_stay_inside_the_line_box() {
    let size = 24.0;
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    for_each_run("Hola, mundo!", size, |r| {
        assert!(r.x0 >= 0.0 && r.y0 >= 0.0);
        max_x = max_x.max(r.x1);
        max_y = max_y.max(r.y1);
    });
    assert!(max_x <= f64::from(advance("Hola, mundo!", size)) + 1e-9);
    assert!(max_y <= f64::from(line_height(size)));
}
