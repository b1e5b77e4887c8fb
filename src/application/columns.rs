//! Declarative column-name synonyms.
//!
//! Exports come from different spreadsheet versions and languages, so a
//! logical column ("stay date", "price", ...) is located through a fixed list
//! of accepted header names rather than a single exact name.

/// Accepted header names for one logical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSynonyms {
    /// Name reported in errors.
    pub canonical: &'static str,
    /// Lowercase names, most specific first.
    pub names: &'static [&'static str],
    /// Whether a header containing a name also counts as a match.
    pub substring: bool,
}

pub const STAY_DATE: ColumnSynonyms = ColumnSynonyms {
    canonical: "fecha",
    names: &["fecha", "fecha_estancia", "date", "stay_date", "dia"],
    substring: true,
};

pub const PRICE: ColumnSynonyms = ColumnSynonyms {
    canonical: "precio",
    names: &["precio", "adr", "price"],
    substring: true,
};

pub const OCCUPANCY: ColumnSynonyms = ColumnSynonyms {
    canonical: "ocupacion",
    names: &["% ocupacion", "ocupacion", "ocupación", "occupancy", "occ"],
    substring: true,
};

pub const YEAR: ColumnSynonyms = ColumnSynonyms {
    canonical: "anio",
    names: &["anio", "año", "ano", "year"],
    substring: false,
};

pub const MONTH: ColumnSynonyms = ColumnSynonyms {
    canonical: "mes",
    names: &["mes", "month"],
    substring: false,
};

pub const REVENUE: ColumnSynonyms = ColumnSynonyms {
    canonical: "Total_Dep",
    names: &["total_dep", "total dep", "revenue"],
    substring: false,
};

pub const RESERVATIONS: ColumnSynonyms = ColumnSynonyms {
    canonical: "Reservas",
    names: &["reservas", "reservations", "bookings"],
    substring: false,
};

impl ColumnSynonyms {
    /// Index of the first header matching this column.
    ///
    /// Exact matches (trimmed, lowercase) win over substring matches, so a
    /// `fecha` column is preferred to a `fecha_snapshot` column.
    #[must_use]
    pub fn locate(&self, headers: &[String]) -> Option<usize> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let exact = self
            .names
            .iter()
            .find_map(|name| normalized.iter().position(|h| h == name));
        if exact.is_some() || !self.substring {
            return exact;
        }

        self.names
            .iter()
            .find_map(|name| normalized.iter().position(|h| h.contains(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn exact_match_beats_substring() {
        let h = headers(&["Fecha_snapshot", " FECHA ", "N-4"]);
        assert_eq!(STAY_DATE.locate(&h), Some(1));
    }

    #[test]
    fn substring_match_when_enabled() {
        let h = headers(&["Fecha de estancia", "ADR medio", "% Ocupacion total"]);
        assert_eq!(STAY_DATE.locate(&h), Some(0));
        assert_eq!(PRICE.locate(&h), Some(1));
        assert_eq!(OCCUPANCY.locate(&h), Some(2));
    }

    #[test]
    fn exact_only_columns_ignore_substrings() {
        let h = headers(&["mesa", "anio"]);
        assert_eq!(MONTH.locate(&h), None);
        assert_eq!(YEAR.locate(&h), Some(1));
    }
}
