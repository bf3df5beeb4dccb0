use eventdex_core::{Gender, Record};
use eventdex_engine::{
    extract_page, ids_in_page, LinePatternExtractor, RecordExtractor, StaticCatalog,
};
use pretty_assertions::assert_eq;

fn catalog() -> StaticCatalog {
    StaticCatalog::with_species(["Pikachu", "Eevee", "Vulpix"])
}

#[test]
fn reference_line_yields_full_record() {
    let extractor = LinePatternExtractor::new();
    let page = "✨ Pikachu <:male:123> Lvl. 20 • 100.0% `123456`";

    let extracted = extract_page(&extractor, &catalog(), page);

    assert_eq!(extracted.candidate_lines, 1);
    assert_eq!(
        extracted.records,
        vec![Record::new(123456, "Pikachu", Gender::Male)
            .with_level(20)
            .with_iv_percent(100.0)]
    );
}

#[test]
fn lines_without_sentinel_never_produce_records() {
    let extractor = LinePatternExtractor::new();
    let page = "\
Your pokémon
`1` Pikachu <:male:1> Lvl. 5 • 10.0%
`2` ✨ Eevee <:female:2> Lvl. 6 • 20.0%
Showing entries 1-2";

    let records = extractor.extract(page);
    assert_eq!(extractor.candidate_lines(page), 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identifier(), 2);
}

#[test]
fn line_without_identifier_is_skipped_but_page_continues() {
    let extractor = LinePatternExtractor::new();
    let page = "\
✨ Pikachu <:male:1> Lvl. 5 • 10.0%
`31` ✨ Eevee <:female:2> Lvl. 6 • 20.0%
`32` ✨ Vulpix <:unknown:3>";

    let extracted = extract_page(&extractor, &catalog(), page);

    assert_eq!(extracted.candidate_lines, 3);
    let ids: Vec<u64> = extracted.records.iter().map(Record::identifier).collect();
    assert_eq!(ids, vec![31, 32]);
    let vulpix = &extracted.records[1];
    assert_eq!(vulpix.gender(), Gender::Unknown);
    assert_eq!(vulpix.level(), 1);
    assert_eq!(vulpix.iv_percent(), 0.0);
}

#[test]
fn ineligible_species_are_filtered_but_still_counted() {
    let extractor = LinePatternExtractor::new();
    let page = "\
`1` ✨ Mew <:unknown:1> Lvl. 70 • 88.17%
`2` ✨ Eevee <:female:2> Lvl. 6 • 20.5%";

    let extracted = extract_page(&extractor, &catalog(), page);

    assert_eq!(extracted.candidate_lines, 2);
    assert_eq!(extracted.records.len(), 1);
    assert_eq!(extracted.records[0].species_name(), "Eevee");
    assert_eq!(extracted.records[0].iv_percent(), 20.5);
}

#[test]
fn listing_layout_with_leading_icon_and_wide_spaces() {
    let extractor = LinePatternExtractor::new();
    let page = "**`  77 `**　<:_:1242455099213877248> ✨ Pikachu<:female:1207734081585152101>　•　Lvl. 35　•　64.52%";

    let records = extractor.extract(page);

    assert_eq!(
        records,
        vec![Record::new(77, "Pikachu", Gender::Female)
            .with_level(35)
            .with_iv_percent(64.52)]
    );
}

#[test]
fn removal_ids_come_from_every_styled_line() {
    let page = "\
`10` ✨ Pikachu <:male:1>
`11` Eevee <:female:2>
no identifier here
`12` `13` Vulpix";

    assert_eq!(ids_in_page(page), vec![10, 11, 12]);
}
