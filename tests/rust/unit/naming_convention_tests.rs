//! Physical naming conventions: generated names must be recognised again by
//! the matcher used for the resolver's convention fallback.

#[cfg(test)]
mod naming_convention_tests {
    use dra_resolver::table_catalog::{
        NamingConvention, TableType, DEFAULT_MAX_IDENTIFIER_LENGTH,
    };
    use test_case::test_case;

    #[test_case(TableType::MySql, "customers" ; "mysql")]
    #[test_case(TableType::PostgreSql, "order_items" ; "postgresql")]
    #[test_case(TableType::Excel, "Budget 2024" ; "excel sheet with spaces")]
    #[test_case(TableType::Pdf, "invoice_lines" ; "pdf")]
    #[test_case(TableType::GoogleAds, "campaign_performance" ; "google ads")]
    #[test_case(TableType::GoogleAdManager, "line_items" ; "google ad manager")]
    fn test_generated_names_match_their_convention(table_type: TableType, logical: &str) {
        let convention = NamingConvention::for_table_type(&table_type);
        let physical =
            convention.physical_table_name(logical, 42, 1, DEFAULT_MAX_IDENTIFIER_LENGTH);
        assert!(physical.len() <= DEFAULT_MAX_IDENTIFIER_LENGTH);
        assert!(convention.matches_convention(
            &physical,
            logical,
            42,
            DEFAULT_MAX_IDENTIFIER_LENGTH
        ));
        assert!(!convention.matches_convention(
            &physical,
            logical,
            43,
            DEFAULT_MAX_IDENTIFIER_LENGTH
        ));
    }

    #[test]
    fn test_short_alphanumeric_hash_matches() {
        assert!(NamingConvention::HashSuffixed.matches_convention(
            "customers_xyz999_22",
            "customers",
            22,
            DEFAULT_MAX_IDENTIFIER_LENGTH
        ));
    }

    #[test]
    fn test_conventions_do_not_cross_match() {
        // A Google-style name is not a hash-suffixed name for the same table
        assert!(!NamingConvention::HashSuffixed.matches_convention(
            "campaigns_42",
            "campaigns",
            42,
            DEFAULT_MAX_IDENTIFIER_LENGTH
        ));
        assert!(!NamingConvention::DataSourceIndexed.matches_convention(
            "campaigns_1a2b3c4d_42",
            "campaigns",
            42,
            DEFAULT_MAX_IDENTIFIER_LENGTH
        ));
    }
}
