use kontoauszug_core::{EngineConfig, PageBuffer, Side, Token, TransactionRecord};
use kontoauszug_ingest::Engine;

/// Lay out one table line the way the statement prints it: dates, text, amount.
fn line(y: f64, words: &[&str]) -> Vec<Token> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| Token::new(*w, 40.0 + i as f64 * 60.0, y))
        .collect()
}

fn page(lines: Vec<Vec<Token>>) -> Vec<Token> {
    // Extractors do not promise any order; feed tokens bottom-up to prove it does not matter.
    let mut tokens: Vec<Token> = lines.into_iter().flatten().collect();
    tokens.reverse();
    tokens
}

fn engine() -> Engine {
    Engine::new(&EngineConfig::default()).unwrap()
}

fn statement() -> Vec<Vec<Token>> {
    vec![
        page(vec![
            line(40.0, &["Auszug", "Nr.", "3", "2025"]),
            line(60.0, &["Kontoinhaber", "Max", "Mustermann"]),
            line(80.0, &["Buchung", "Valuta", "Vorgang", "IBAN", "Soll", "Haben"]),
            line(100.0, &["01.03.", "01.03.", "SEPA", "Lastschrift", "-650,00"]),
            line(112.2, &["Miete", "Wohnung", "2025"]),
            line(124.0, &["03.03.", "03.03.", "Gehalt", "ACME", "+2.100,00"]),
            line(800.0, &["Verwendungszweck", "Lohn", "Maerz", "202012345678901234"]),
        ]),
        page(vec![
            line(40.0, &["Auszug", "Nr.", "3", "Seite", "2"]),
            line(100.0, &["Ueberweisung", "folgt"]),
            line(112.0, &["05.03.", "06.03.", "Kartenzahlung", "REWE", "-1.234,56", "865,44"]),
        ]),
    ]
}

#[test]
fn test_full_statement() {
    let out = engine().extract(PageBuffer::new(statement())).unwrap();

    assert_eq!(
        out.records,
        vec![
            TransactionRecord::new("01.03.", "01.03.", "SEPA Lastschrift Miete Wohnung", Side::Debit, "650,00"),
            TransactionRecord::new(
                "03.03.",
                "03.03.",
                "Gehalt ACME Verwendungszweck Lohn Maerz Ueberweisung folgt",
                Side::Credit,
                "2.100,00"
            ),
            TransactionRecord::new("05.03.", "06.03.", "Kartenzahlung REWE 865,44", Side::Debit, "1.234,56"),
        ]
    );

    assert_eq!(out.stats.pages, 2);
    assert_eq!(out.stats.header_footer_rows, 3);
    assert_eq!(out.stats.transaction_starts, 3);
    assert_eq!(out.stats.discarded_rows, 1);
}

#[test]
fn test_description_continues_across_page_break() {
    let pages = vec![
        page(vec![
            line(700.0, &["28.03.", "28.03.", "Dauerauftrag", "-50,00"]),
            line(712.0, &["Sparplan"]),
        ]),
        page(vec![line(60.0, &["Depot", "4711"])]),
    ];
    let out = engine().extract(PageBuffer::new(pages)).unwrap();

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].description, "Dauerauftrag Sparplan Depot 4711");
}

#[test]
fn test_order_exclusivity_and_idempotence() {
    let engine = engine();
    let first = engine.extract(PageBuffer::new(statement())).unwrap();
    let second = engine.extract(PageBuffer::new(statement())).unwrap();
    assert_eq!(first, second);

    let booking_dates: Vec<&str> = first.records.iter().map(|r| r.booking_date.as_str()).collect();
    assert_eq!(booking_dates, vec!["01.03.", "03.03.", "05.03."]);

    for r in &first.records {
        assert!(r.debit.is_empty() != r.credit.is_empty(), "exactly one amount column: {r:?}");
    }
}

#[test]
fn test_row_tolerance_is_configurable() {
    // Amount printed 3 units below the dates: one row at tolerance 6, two rows at 2.
    let tokens = vec![
        Token::new("01.03.", 40.0, 100.0),
        Token::new("01.03.", 100.0, 100.0),
        Token::new("Miete", 160.0, 100.0),
        Token::new("-650,00", 480.0, 103.0),
    ];

    let out = engine().extract(PageBuffer::new(vec![tokens.clone()])).unwrap();
    assert!(out.records.is_empty());

    let mut cfg = EngineConfig::default();
    cfg.layout.row_tolerance = 6.0;
    let wide = Engine::new(&cfg).unwrap();
    let out = wide.extract(PageBuffer::new(vec![tokens])).unwrap();
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].debit, "650,00");
}

#[test]
fn test_empty_document() {
    let out = engine().extract(PageBuffer::default()).unwrap();
    assert!(out.records.is_empty());
    assert_eq!(out.stats.pages, 0);
}
