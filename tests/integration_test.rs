//! End-to-end pipeline tests: raw records in, hierarchy or ranked list out.
//!
//! Covers the roll-up invariants, consolidation rules, screening order and
//! navigation self-correction across recomputations.

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use sectormap::domain::config::{Mode, NormalizeConfig, ScreenConfig, ViewConfig};
use sectormap::domain::instrument::{RatioField, RawInstrument};
use sectormap::domain::navigation::{select_ticker, Level, NavEvent, ViewState};
use sectormap::domain::node::HierarchyNode;
use sectormap::domain::normalizer::normalize;
use sectormap::domain::session::{run_pipeline, Session};
use sectormap::domain::taxonomy::{OTHER_COMPANIES, OTHER_SECTORS};
use sectormap::ports::catalogue_port::CataloguePort;

fn hierarchy(records: &[RawInstrument]) -> Vec<HierarchyNode> {
    run_pipeline(records, &NormalizeConfig::default(), &ViewConfig::default())
}

fn assert_sum_invariant(nodes: &[HierarchyNode]) {
    walk(nodes, &mut |node| {
        if node.is_leaf() {
            return;
        }
        let value: f64 = node.children().iter().map(|c| c.value).sum();
        let market_cap: f64 = node.children().iter().map(HierarchyNode::weight).sum();
        assert_relative_eq!(node.value, value, max_relative = 1e-9);
        assert_relative_eq!(node.market_cap, market_cap, max_relative = 1e-9);
    });
}

mod roll_up {
    use super::*;

    #[test]
    fn sum_invariant_on_a_mixed_catalogue() {
        let mut records = many("MI", "Mineração", "Minerais Metálicos", 20);
        records.extend(many("SA", "Serv.Méd.Hospit. Análises e Diagnósticos", "Hospitais", 4));
        records.extend(many("SM", "Saúde", "Medicamentos", 3));
        records.push(raw_with_ratios("VIVT3", "Telecomunicações", "Telecomunicações", 8e10, 14.0, 0.12, 0.09));
        records.push(raw("TIMS3", "Telecomunicações", "Telecomunicações", 4e10));
        assert_sum_invariant(&hierarchy(&records));
    }

    #[test]
    fn median_of_odd_and_even_child_counts() {
        let odd = vec![
            raw_with_ratios("LREN3", "Comércio", "Tecidos", 3e10, 5.0, 0.1, 0.1),
            raw_with_ratios("MGLU3", "Comércio", "Tecidos", 2e10, 10.0, 0.1, 0.1),
            raw_with_ratios("AMER3", "Comércio", "Tecidos", 1e10, 15.0, 0.1, 0.1),
        ];
        let tree = hierarchy(&odd);
        assert_eq!(find(&tree, "Varejo").unwrap().p_l, 10.0);

        // Saúde is exempt, so two instruments still form a sector.
        let even = vec![
            raw_with_ratios("RDOR3", "Saúde", "Hospitais", 3e10, 5.0, 0.1, 0.1),
            raw_with_ratios("HAPV3", "Saúde", "Hospitais", 2e10, 10.0, 0.1, 0.1),
        ];
        let tree = hierarchy(&even);
        assert_eq!(find(&tree, "Saúde").unwrap().p_l, 7.5);
    }

    #[test]
    fn financial_leaf_with_zero_margin_contributes_roe() {
        let banks = vec![
            raw_with_ratios("BBAS3", "Intermediários Financeiros", "Bancos", 1.5e11, 8.0, 0.0, 0.18),
            raw_with_ratios("ITUB4", "Intermediários Financeiros", "Bancos", 3.0e11, 9.0, 0.10, 0.2),
            raw_with_ratios("BBDC4", "Intermediários Financeiros", "Bancos", 1.6e11, 7.0, 0.20, 0.1),
        ];
        let tree = hierarchy(&banks);
        let sector = find(&tree, "Financeiro").unwrap();
        assert_relative_eq!(sector.net_margin, 0.18);

        let retail = vec![
            raw_with_ratios("LREN3", "Varejo", "Lojas", 1.5e11, 8.0, 0.0, 0.18),
            raw_with_ratios("MGLU3", "Varejo", "Lojas", 3.0e11, 9.0, 0.10, 0.2),
            raw_with_ratios("AMER3", "Varejo", "Lojas", 1.6e11, 7.0, 0.20, 0.1),
        ];
        let tree = hierarchy(&retail);
        assert_relative_eq!(find(&tree, "Varejo").unwrap().net_margin, 0.10);
    }

    #[test]
    fn profitability_is_cap_weighted() {
        let records = vec![
            raw_with_ratios("RDOR3", "Saúde", "Hospitais", 100.0, 10.0, 0.1, 0.1),
            raw_with_ratios("HAPV3", "Saúde", "Hospitais", 300.0, 10.0, 0.1, 0.2),
        ];
        let tree = hierarchy(&records);
        assert_relative_eq!(find(&tree, "Saúde").unwrap().roe, 0.175);
    }
}

mod consolidation {
    use super::*;

    #[test]
    fn small_sector_moves_under_other_sectors() {
        let mut records = many("MI", "Mineração", "Minerais Metálicos", 5);
        records.push(raw("GRND3", "Tecidos, Vestuário e Calçados", "Calçados", 5e9));
        records.push(raw("ALPA4", "Tecidos, Vestuário e Calçados", "Calçados", 7e9));
        let tree = hierarchy(&records);

        assert!(find(&tree, "Vestuário").is_none());
        let other = find(&tree, OTHER_SECTORS).unwrap();
        assert!(other.is_consolidated);
        assert!(other.contains_ticker("GRND3"));
        assert!(other.contains_ticker("ALPA4"));
        assert!(find(&tree, "Mineração").is_some());
    }

    #[test]
    fn twenty_instruments_cap_at_fifteen_siblings() {
        let tree = hierarchy(&many("MI", "Mineração", "Minerais Metálicos", 20));
        let sector = find(&tree, "Mineração").unwrap();
        assert!(sector.is_promoted);

        let children = sector.children();
        assert_eq!(children.len(), 15);
        let bucket = children.last().unwrap();
        assert_eq!(bucket.name, OTHER_COMPANIES);
        assert!(bucket.is_consolidated);
        assert_eq!(bucket.children().len(), 6);

        let kept: Vec<String> = children[..14].iter().map(|c| c.name.clone()).collect();
        let expected: Vec<String> = (0..14).map(|i| format!("MI{:02}3", i)).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn nothing_is_lost_by_consolidation() {
        let mut records = Vec::new();
        for (i, sector) in ["Varejo", "Mineração", "Siderurgia", "Telecom", "Saúde"].iter().enumerate() {
            records.extend(many(&format!("{}X", (b'A' + i as u8) as char), sector, "Geral", i + 1));
        }
        let instruments = normalize(&records, &NormalizeConfig::default());
        let tree = hierarchy(&records);
        let leaves: usize = tree.iter().map(HierarchyNode::leaf_count).sum();
        assert_eq!(leaves, instruments.len());
    }
}

mod determinism {
    use super::*;

    #[test]
    fn pipeline_is_idempotent() {
        let mut records = many("MI", "Mineração", "Minerais Metálicos", 17);
        records.extend(many("SA", "Saúde", "Hospitais", 2));
        records.push(raw("PETR3", "Petróleo, Gás e Biocombustíveis", "Exploração, Refino e Distribuição", 4e11));
        records.push(raw("PETR4", "Petróleo, Gás e Biocombustíveis", "Exploração, Refino e Distribuição", 3e11));
        assert_eq!(hierarchy(&records), hierarchy(&records));
    }

    #[test]
    fn preferred_share_class_represents_the_company() {
        let records = vec![
            raw("PETR3", "Petróleo, Gás e Biocombustíveis", "Exploração, Refino e Distribuição", 4e11),
            raw("PETR4", "Petróleo, Gás e Biocombustíveis", "Exploração, Refino e Distribuição", 3e11),
        ];
        let tree = hierarchy(&records);
        let sector = find(&tree, "Petróleo e Gás").unwrap();
        assert!(sector.contains_ticker("PETR4"));
        assert!(!sector.contains_ticker("PETR3"));
    }
}

mod screening {
    use super::*;

    fn screening_config(priority: RatioField) -> ViewConfig {
        ViewConfig {
            mode: Mode::Screening,
            screen: ScreenConfig {
                priority,
                ranges: Vec::new(),
                ..ScreenConfig::default()
            },
            ..ViewConfig::default()
        }
    }

    #[test]
    fn non_positive_pl_sorts_last() {
        let records = vec![
            raw_with_ratios("AAAA3", "Varejo", "Lojas", 1e9, -5.0, 0.1, 0.1),
            raw_with_ratios("BBBB3", "Varejo", "Lojas", 1e9, 8.0, 0.1, 0.1),
            raw_with_ratios("CCCC3", "Varejo", "Lojas", 1e9, 12.0, 0.1, 0.1),
        ];
        let ranked = run_pipeline(&records, &NormalizeConfig::default(), &screening_config(RatioField::PL));
        let names: Vec<&str> = ranked.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["BBBB3", "CCCC3", "AAAA3"]);
        assert!(ranked.iter().all(HierarchyNode::is_leaf));
    }

    #[test]
    fn default_ranges_and_top_n_apply() {
        let mut records = many("MI", "Mineração", "Minerais Metálicos", 20);
        records.push(raw_with_ratios("LOSS3", "Varejo", "Lojas", 1e9, -3.0, -0.2, -0.1));
        let config = ViewConfig {
            mode: Mode::Screening,
            ..ViewConfig::default()
        };
        let ranked = run_pipeline(&records, &NormalizeConfig::default(), &config);
        assert_eq!(ranked.len(), 15);
        assert!(ranked.iter().all(|n| n.name != "LOSS3"));
    }
}

mod navigation {
    use super::*;

    fn catalogue() -> Vec<RawInstrument> {
        let mut records = many("HO", "Saúde", "Hospitais", 4);
        records.extend(many("ME", "Saúde", "Medicamentos", 3));
        records.extend(many("VA", "Varejo", "Lojas", 5));
        records
    }

    #[test]
    fn removing_the_sector_resets_to_market() {
        let mut session = Session::new(&catalogue(), &NormalizeConfig::default(), ViewConfig::default());
        session.navigate(&NavEvent::Select("Saúde".into()));
        session.navigate(&NavEvent::Select("Hospitais".into()));
        assert_eq!(*session.view(), ViewState::subsector("Saúde", "Hospitais"));

        let changed = session.set_config(ViewConfig {
            sectors: vec!["Varejo".into()],
            ..ViewConfig::default()
        });
        assert!(changed);
        assert_eq!(*session.view(), ViewState::market());
        assert_eq!(session.view().level, Level::Market);
        assert!(session.view().parent.is_none());
        assert!(session.view().sub_parent.is_none());
    }

    #[test]
    fn ticker_search_lands_in_its_subsector() {
        let mut session = Session::new(&catalogue(), &NormalizeConfig::default(), ViewConfig::default());
        let view = session.navigate(&NavEvent::SelectTicker("ME013".into())).clone();
        assert_eq!(view, ViewState::subsector("Saúde", "Medicamentos"));
        assert!(session.visible().iter().any(|n| n.name == "ME013"));
    }

    #[test]
    fn ticker_search_finds_capped_companies() {
        let mut records = many("BA", "Intermediários Financeiros", "Bancos", 20);
        records.extend(many("SE", "Intermediários Financeiros", "Seguradoras", 4));
        let mut session = Session::new(&records, &NormalizeConfig::default(), ViewConfig::default());

        let financeiro = find(session.nodes(), "Financeiro").unwrap();
        assert!(!financeiro.is_promoted);
        assert!(financeiro.contains_ticker("BA193"));

        let view = session.navigate(&NavEvent::SelectTicker("BA193".into())).clone();
        assert_eq!(view, ViewState::subsector("Financeiro", "Bancos"));
        assert!(session.visible().iter().any(|n| n.name == OTHER_COMPANIES));
    }

    #[test]
    fn mock_port_feeds_a_session() {
        let port = MockCataloguePort::new(catalogue());
        let catalogue = port.fetch_catalogue().unwrap();
        let session = Session::new(&catalogue.records, &NormalizeConfig::default(), ViewConfig::default());
        assert_eq!(session.instruments().len(), 12);

        let failing = MockCataloguePort::failing("upstream timeout");
        assert!(failing.fetch_catalogue().is_err());
    }
}

mod properties {
    use super::*;

    const SECTORS: &[&str] = &[
        "Varejo",
        "Saúde",
        "Mineração",
        "Utilidade Pública",
        "Telecomunicações",
        "Intermediários Financeiros",
        "",
    ];
    const SUBSECTORS: &[&str] = &["Geral", "Bancos", "Energia", "Lojas", ""];

    fn record() -> impl Strategy<Value = (usize, usize, f64, f64, f64, f64, f64)> {
        (
            0..SECTORS.len(),
            0..SUBSECTORS.len(),
            0.0..1e12f64,
            0.0..1e8f64,
            -50.0..50.0f64,
            -1.0..1.0f64,
            -1.0..1.0f64,
        )
    }

    fn catalogue(rows: Vec<(usize, usize, f64, f64, f64, f64, f64)>) -> Vec<RawInstrument> {
        rows.into_iter()
            .enumerate()
            .map(|(i, (sector, sub, cap, liq, p_l, margin, roe))| RawInstrument {
                liq_2m: Some(liq),
                ..raw_with_ratios(&format!("{:04}X3", i), SECTORS[sector], SUBSECTORS[sub], cap, p_l, margin, roe)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn sum_invariant_holds(rows in prop::collection::vec(record(), 0..120)) {
            let tree = hierarchy(&catalogue(rows));
            assert_sum_invariant(&tree);
            prop_assert!(tree.len() <= 15);
        }

        #[test]
        fn every_normalized_instrument_appears_once(rows in prop::collection::vec(record(), 0..120)) {
            let records = catalogue(rows);
            let instruments = normalize(&records, &NormalizeConfig::default());
            let tree = hierarchy(&records);
            let leaves: usize = tree.iter().map(HierarchyNode::leaf_count).sum();
            prop_assert_eq!(leaves, instruments.len());
        }

        #[test]
        fn every_placed_ticker_is_searchable(rows in prop::collection::vec(record(), 0..120)) {
            let records = catalogue(rows);
            let tree = hierarchy(&records);
            for inst in normalize(&records, &NormalizeConfig::default()) {
                let state = select_ticker(&tree, &inst.ticker);
                prop_assert!(state.is_some(), "{} not reachable", inst.ticker);
            }
        }

        #[test]
        fn pipeline_is_deterministic(rows in prop::collection::vec(record(), 0..60)) {
            let records = catalogue(rows);
            prop_assert_eq!(hierarchy(&records), hierarchy(&records));
        }
    }
}
