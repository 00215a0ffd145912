//! Static taxonomy data.
//!
//! Lookup tables that drive normalization, classification and consolidation.
//! Bump [`TAXONOMY_VERSION`] whenever a table changes so downstream consumers can
//! tell snapshots built against different vocabularies apart.

pub const TAXONOMY_VERSION: u32 = 3;

/// Synthetic sector that diversified holdings are pulled into.
pub const HOLDINGS_SECTOR: &str = "Holdings e Investimentos";

/// Catch-all labels for missing taxonomy and for consolidated buckets.
pub const OTHER_SECTORS: &str = "Other sectors";
pub const OTHER_SUBSECTORS: &str = "Other subsectors";
pub const OTHER_COMPANIES: &str = "Other companies";

/// Verbose or legacy sector spellings (typos included) and their short labels.
pub const SECTOR_RENAMES: &[(&str, &str)] = &[
    ("Petróleo, Gás e Biocombustíveis", "Petróleo e Gás"),
    ("Serv. Méd. Hospit. Análises e Diagnósticos", "Saúde"),
    ("Serv.Méd.Hospit. Análises e Diagnósticos", "Saúde"),
    ("Serv.Med.Hospit. Anílises e Diagnosticos", "Saúde"),
    ("Serv.Med.Hospit. Análises e Diagnósticos", "Saúde"),
    ("Ser.Med.Hospit. Analise e Diagnosticos", "Saúde"),
    ("Ser.Med.Hospt. Analise e Diagnosticos", "Saúde"),
    ("Hospit. Análises e Diagnósticos", "Saúde"),
    ("Ser.Med.Hospit. Analises e Diagnosticos", "Saúde"),
    ("Ser.Med.Hospt. Analises e Diagnosticos", "Saúde"),
    ("Exploração de Imóveis", "Imóveis"),
    ("Máquinas e Equipamentos", "Máquinas"),
    ("Produtos de Uso Pessoal e de Limpeza", "Uso Pessoal"),
    ("Tecidos, Vestuário e Calçados", "Vestuário"),
    ("Previdência e Seguros", "Seguros"),
    ("Siderurgia e Metalurgia", "Siderurgia"),
    ("Intermediários Financeiros", "Financeiro"),
    ("Utilidade Pública", "Utilidade"),
    ("Telecomunicações", "Telecom"),
    ("Construção e Engenharia", "Construção"),
    ("Transporte", "Logística"),
    ("Comércio e Distribuição", "Varejo"),
    ("Comércio", "Varejo"),
    ("Automóveis e Motocicletas", "Automotivo"),
    ("Serviços Financeiros Diversos", "Serv. Financeiros"),
    ("Programas e Serviços", "TI"),
    ("Computadores e Equipamentos", "Hardware"),
    ("Holdings Diversificadas", "Holdings"),
];

/// Tickers always grouped under [`HOLDINGS_SECTOR`].
pub const HOLDING_TICKERS: &[&str] = &["ITSA3", "ITSA4", "BRAP3", "BRAP4", "SIMH3"];

/// Lower-cased sector fragments that also trigger the holdings reassignment.
pub const HOLDING_SECTOR_MARKERS: &[&str] = &["holdings diversificadas"];

/// Canonical sector labels that trigger the holdings reassignment.
pub const HOLDING_SECTOR_LABELS: &[&str] = &["Holdings"];

/// Lower-cased substrings marking financial or holding entities.
pub const FINANCIAL_MARKERS: &[&str] = &[
    "holding",
    "banco",
    "intermediários",
    "segur",
    "financeiro",
    "bank",
    "insurance",
    "financial",
];

/// Share classes preferred over their siblings, highest priority first.
pub const PREFERRED_TICKERS: &[&str] = &["PETR4"];

/// Sectors that stay at the top level no matter how few instruments they hold.
pub const EXEMPT_SECTORS: &[&str] = &[OTHER_SECTORS, HOLDINGS_SECTOR, "Saúde", "Petróleo e Gás"];

/// Sectors whose subsector tier collapses onto the subsector matching the pattern.
pub const PROMOTE_SECTORS: &[(&str, &str)] = &[("Petróleo e Gás", "Exploração")];

/// Map a raw sector or subsector string to its canonical label.
pub fn canonical_name(raw: &str) -> String {
    let trimmed = raw.trim();
    SECTOR_RENAMES
        .iter()
        .find(|(from, _)| *from == trimmed)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

pub fn is_exempt_sector(name: &str) -> bool {
    EXEMPT_SECTORS.contains(&name) || EXEMPT_SECTORS.contains(&canonical_name(name).as_str())
}

/// Subsector pattern for a promote sector, if `sector` is one.
pub fn promote_pattern(sector: &str) -> Option<&'static str> {
    let canonical = canonical_name(sector);
    PROMOTE_SECTORS
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, pattern)| *pattern)
}
