//! CSS-style font family chains resolved against the font database.
//!
//! `"Montserrat, Helvetica, sans-serif"` is tried left to right: the first
//! concrete family the database knows wins, a generic keyword wins as soon
//! as it is reached, and an exhausted chain falls back to sans-serif.

use cosmic_text::{fontdb, Family};

/// Generic CSS families cosmic-text resolves itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Monospace,
    Cursive,
    Fantasy,
}

impl GenericFamily {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sans-serif" => Some(Self::SansSerif),
            "serif" => Some(Self::Serif),
            "monospace" => Some(Self::Monospace),
            "cursive" => Some(Self::Cursive),
            "fantasy" => Some(Self::Fantasy),
            _ => None,
        }
    }
}

/// Outcome of resolving a chain; owns the name so it outlives the request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedFamily {
    Named(String),
    Generic(GenericFamily),
}

impl ResolvedFamily {
    pub fn as_family(&self) -> Family<'_> {
        match self {
            Self::Named(name) => Family::Name(name),
            Self::Generic(GenericFamily::SansSerif) => Family::SansSerif,
            Self::Generic(GenericFamily::Serif) => Family::Serif,
            Self::Generic(GenericFamily::Monospace) => Family::Monospace,
            Self::Generic(GenericFamily::Cursive) => Family::Cursive,
            Self::Generic(GenericFamily::Fantasy) => Family::Fantasy,
        }
    }
}

/// Split a CSS family list into trimmed, unquoted entries.
///
/// Case is preserved because `Family::Name` matching in fontdb is exact.
pub fn parse_chain(chain: &str) -> Vec<&str> {
    chain
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\''))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Exact family name as the database spells it, matched case-insensitively.
fn installed_name(db: &fontdb::Database, name: &str) -> Option<String> {
    db.faces()
        .flat_map(|face| face.families.iter())
        .find(|(family, _)| family.eq_ignore_ascii_case(name))
        .map(|(family, _)| family.clone())
}

pub fn resolve(chain: &str, db: &fontdb::Database) -> ResolvedFamily {
    for entry in parse_chain(chain) {
        if let Some(generic) = GenericFamily::parse(&entry.to_ascii_lowercase()) {
            return ResolvedFamily::Generic(generic);
        }
        if let Some(name) = installed_name(db, entry) {
            return ResolvedFamily::Named(name);
        }
        log::debug!("Font family {entry:?} not installed, trying next");
    }
    ResolvedFamily::Generic(GenericFamily::SansSerif)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain() {
        assert_eq!(
            parse_chain(r#" "Open Sans", 'Helvetica' ,sans-serif,, "#),
            vec!["Open Sans", "Helvetica", "sans-serif"]
        );
        assert!(parse_chain("").is_empty());
    }

    #[test]
    fn test_generic_parse() {
        assert_eq!(GenericFamily::parse("serif"), Some(GenericFamily::Serif));
        assert_eq!(GenericFamily::parse("Montserrat"), None);
    }

    #[test]
    fn test_empty_database_falls_back() {
        let db = fontdb::Database::new();
        assert_eq!(
            resolve("Montserrat", &db),
            ResolvedFamily::Generic(GenericFamily::SansSerif)
        );
    }

    #[test]
    fn test_generic_keyword_short_circuits() {
        let db = fontdb::Database::new();
        assert_eq!(
            resolve("NoSuchFace, MONOSPACE, serif", &db),
            ResolvedFamily::Generic(GenericFamily::Monospace)
        );
    }

    #[test]
    fn test_installed_family_wins() {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let Some(first) = db
            .faces()
            .find_map(|f| f.families.first().map(|(name, _)| name.clone()))
        else {
            return; // no system fonts
        };
        let chain = format!("NoSuchFace, {}, serif", first.to_ascii_uppercase());
        assert_eq!(resolve(&chain, &db), ResolvedFamily::Named(first));
    }

    #[test]
    fn test_as_family() {
        let named = ResolvedFamily::Named("Inter".into());
        assert_eq!(named.as_family(), Family::Name("Inter"));
        assert_eq!(
            ResolvedFamily::Generic(GenericFamily::Serif).as_family(),
            Family::Serif
        );
    }
}
