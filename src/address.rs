use core::fmt;

use serde::{Deserialize, Serialize};

/// What the user typed: either one free-text line or the four structured
/// fields. No validation beyond emptiness; the geocoder sorts out the rest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Address {
    Free(String),
    Structured {
        street: String,
        number: String,
        zip: String,
        city: String,
    },
}

impl Address {
    /// The query string sent to the geocoder.
    pub fn query(&self) -> String {
        match self {
            Self::Free(text) => text.trim().to_string(),
            Self::Structured {
                street,
                number,
                zip,
                city,
            } => format!(
                "{} {}, {} {}",
                street.trim(),
                number.trim(),
                zip.trim(),
                city.trim()
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Free(text) => text.trim().is_empty(),
            Self::Structured {
                street,
                number,
                zip,
                city,
            } => [street, number, zip, city]
                .iter()
                .all(|field| field.trim().is_empty()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_query_assembly() {
        let address = Address::Structured {
            street: "Teufener Strasse".into(),
            number: "19".into(),
            zip: " 9000 ".into(),
            city: "St. Gallen".into(),
        };
        assert_eq!(address.query(), "Teufener Strasse 19, 9000 St. Gallen");
        assert!(!address.is_empty());
    }

    #[test]
    fn emptiness() {
        assert!(Address::Free("   ".into()).is_empty());
        assert!(!Address::Free("Bahnhofplatz 1".into()).is_empty());
        assert!(Address::Structured {
            street: String::new(),
            number: String::new(),
            zip: " ".into(),
            city: String::new(),
        }
        .is_empty());
    }
}
