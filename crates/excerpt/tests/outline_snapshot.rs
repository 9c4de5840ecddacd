use excerpt::FragmentSet;
use excerpt::app::outline::{Outline, OutlineStyle};
use excerpt::app::slice::QuotaState;
use insta::assert_snapshot;

fn set(text: &str) -> FragmentSet {
    text.parse().expect("valid fragment list")
}

#[test]
fn outline_default_renders() {
    let state = QuotaState::new(set("1-10,31-35"), 60, 25);
    let report = state.evaluate(&set("8-16"));
    assert_eq!(report.used, 21);
    let outline = Outline::new(30, OutlineStyle::default());
    let rendered = outline.render(&report.quota, &report.excerpt, report.segments, report.exceeded);
    assert_snapshot!(rendered, @"qqq**###.......qqq............");
}

#[test]
fn outline_exceeded_renders() {
    let state = QuotaState::new(set("1-10"), 60, 12);
    let report = state.evaluate(&set("41-60"));
    assert!(report.exceeded);
    let outline = Outline::new(30, OutlineStyle::default());
    let rendered = outline.render(&report.quota, &report.excerpt, report.segments, report.exceeded);
    assert_snapshot!(rendered, @"qqqqq...............!!!!!!!!!!");
}
