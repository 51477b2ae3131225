//! Library-wide defaults.
//!
//! There is no global store: an app builds one [`TableKitConfig`] (usually from a JSON document),
//! keeps it next to its other state and passes it to the components it constructs. A component
//! that needs its own settings merges an instance config over the shared one with
//! [`TableKitConfig::merged_with`]. Fields left unset in both fall back to each component's
//! built-in default.

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableKitConfig {
    pub pagination: PaginationConfig,
    pub table: TableConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Rows per page.
    pub page_size: Option<usize>,
    /// Page numbers shown at once by pagers.
    pub visible_pages: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    pub show_header: Option<bool>,
    pub show_footer: Option<bool>,
    /// Width of columns whose schema has no `width` property.
    pub default_col_width: Option<u16>,
    pub col_gap: Option<u16>,
}

impl TableKitConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pagination.page_size == Some(0) {
            return Err(Error::Config("pagination.page_size must be at least 1".into()));
        }
        if self.pagination.visible_pages == Some(0) {
            return Err(Error::Config(
                "pagination.visible_pages must be at least 1".into(),
            ));
        }
        if self.table.default_col_width == Some(0) {
            return Err(Error::Config("table.default_col_width must be at least 1".into()));
        }
        Ok(())
    }

    /// `instance` layered over `self`: every field set in `instance` wins.
    pub fn merged_with(&self, instance: &TableKitConfig) -> TableKitConfig {
        TableKitConfig {
            pagination: PaginationConfig {
                page_size: instance.pagination.page_size.or(self.pagination.page_size),
                visible_pages: instance
                    .pagination
                    .visible_pages
                    .or(self.pagination.visible_pages),
            },
            table: TableConfig {
                show_header: instance.table.show_header.or(self.table.show_header),
                show_footer: instance.table.show_footer.or(self.table.show_footer),
                default_col_width: instance
                    .table
                    .default_col_width
                    .or(self.table.default_col_width),
                col_gap: instance.table.col_gap.or(self.table.col_gap),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_deserialize_to_unset() {
        let config = TableKitConfig::from_json_str(r#"{ "pagination": { "page_size": 20 } }"#)
            .expect("valid config");
        assert_eq!(config.pagination.page_size, Some(20));
        assert_eq!(config.table, TableConfig::default());
    }

    #[test]
    fn instance_values_override_shared_ones() {
        let shared = TableKitConfig::from_json_str(
            r#"{ "pagination": { "page_size": 20, "visible_pages": 7 }, "table": { "col_gap": 2 } }"#,
        )
        .expect("valid config");
        let instance = TableKitConfig {
            pagination: PaginationConfig {
                page_size: Some(50),
                ..Default::default()
            },
            ..Default::default()
        };
        let merged = shared.merged_with(&instance);
        assert_eq!(merged.pagination.page_size, Some(50));
        assert_eq!(merged.pagination.visible_pages, Some(7));
        assert_eq!(merged.table.col_gap, Some(2));
        assert_eq!(merged.table.show_header, None);
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = TableKitConfig::from_json_str(r#"{ "pagination": { "page_size": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = TableKitConfig::from_json_str(r#"{ "pagnation": {} }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
